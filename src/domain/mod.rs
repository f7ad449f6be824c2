//! Core domain types and logic.

pub mod aggregator;
pub mod date_snapshot;
pub mod error;
pub mod feed_format;
pub mod layout;
pub mod parser;
pub mod record;
pub mod run_config;
pub mod ticker;
pub mod ticker_history;
