//! Configuration access port trait.

pub trait ConfigPort {
    /// Value for `key` in `section`, or `None` when unset or blank.
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
}
