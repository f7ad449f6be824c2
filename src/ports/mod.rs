//! Port traits at the filesystem and configuration seams.

pub mod config_port;
pub mod snapshot_port;
pub mod store_port;
