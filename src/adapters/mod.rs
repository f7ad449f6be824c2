//! Filesystem and configuration adapters for the ports.

pub mod csv_store_adapter;
pub mod file_config_adapter;
pub mod snapshot_dir_adapter;
