//! Output tree port trait.
//!
//! Per-ticker files are addressed by their lower-cased file stem, per-date
//! files by their `YYYYMMDD` key.

use crate::domain::error::ShortsheetError;

pub trait StorePort {
    /// Contents of the previously written file for `stem`, or `None` if there
    /// is no history for it yet.
    fn read_ticker_history(&self, stem: &str) -> Result<Option<String>, ShortsheetError>;

    fn write_ticker(&self, stem: &str, contents: &str) -> Result<(), ShortsheetError>;

    fn write_date(&self, date_key: &str, contents: &str) -> Result<(), ShortsheetError>;
}
