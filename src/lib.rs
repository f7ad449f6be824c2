//! shortsheet — daily short-availability snapshot converter.
//!
//! Pure parsing and merge logic lives in [`domain`], trait seams in [`ports`],
//! filesystem and config implementations in [`adapters`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
