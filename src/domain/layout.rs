//! Header-derived column positions.
//!
//! A layout is discovered once, from the first header line that names both
//! the symbol and availability columns, and is immutable from then on.

use crate::domain::feed_format::{
    AVAILABLE_COLUMN, FEE_COLUMN, FeedFormat, REBATE_COLUMN, SYMBOL_COLUMN,
};

pub const COMMENT_MARKER: char = '#';
pub const FIELD_DELIMITER: char = '|';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub symbol: usize,
    pub available: usize,
    pub rebate: Option<usize>,
    pub fee: Option<usize>,
}

impl ColumnLayout {
    /// Try to read a layout from a header line. Returns `None` unless both
    /// the symbol and availability columns are present. Rate columns are
    /// only looked up for feeds that carry them.
    pub fn discover(line: &str, format: FeedFormat) -> Option<ColumnLayout> {
        let body = line.trim_start();
        let body = body.strip_prefix(COMMENT_MARKER).unwrap_or(body);
        let columns: Vec<&str> = body.split(FIELD_DELIMITER).map(str::trim).collect();
        let position = |name: &str| columns.iter().position(|c| *c == name);

        let symbol = position(SYMBOL_COLUMN)?;
        let available = position(AVAILABLE_COLUMN)?;
        let (rebate, fee) = if format.has_rates() {
            (position(REBATE_COLUMN), position(FEE_COLUMN))
        } else {
            (None, None)
        };

        Some(ColumnLayout {
            symbol,
            available,
            rebate,
            fee,
        })
    }

    /// Smallest field count a data line needs for the required columns.
    pub fn min_fields(&self) -> usize {
        self.symbol.max(self.available) + 1
    }
}

/// Comment-prefixed and blank lines never carry data.
pub fn is_header_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with(COMMENT_MARKER)
}
