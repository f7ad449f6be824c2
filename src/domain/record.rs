//! Parsed snapshot records and their normalized availability fields.

/// Rate columns use this literal for "no rate published".
pub const NOT_AVAILABLE: &str = "NA";
pub const GREATER_THAN_MARKER: char = '>';

/// One data line of a snapshot after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub ticker: String,
    pub row: AvailabilityRow,
}

/// Availability fields for one ticker on one date.
///
/// `rates` is `None` for basic feeds. For extended feeds it is always
/// present, with empty strings standing in for unpublished rates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityRow {
    pub borrowable: String,
    pub rates: Option<Rates>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rates {
    pub rebate: String,
    pub fee: String,
}

impl AvailabilityRow {
    pub fn basic(borrowable: impl Into<String>) -> Self {
        Self {
            borrowable: borrowable.into(),
            rates: None,
        }
    }

    pub fn extended(
        borrowable: impl Into<String>,
        rebate: impl Into<String>,
        fee: impl Into<String>,
    ) -> Self {
        Self {
            borrowable: borrowable.into(),
            rates: Some(Rates {
                rebate: rebate.into(),
                fee: fee.into(),
            }),
        }
    }

    /// Output fields after the leading key column.
    pub fn fields(&self) -> Vec<&str> {
        let mut fields = vec![self.borrowable.as_str()];
        if let Some(rates) = &self.rates {
            fields.push(&rates.rebate);
            fields.push(&rates.fee);
        }
        fields
    }
}

/// `">500"` means "500 or more"; the marker is dropped and the number kept.
pub fn strip_marker(value: &str) -> String {
    value
        .trim()
        .trim_matches(GREATER_THAN_MARKER)
        .trim()
        .to_string()
}

pub fn normalize_rate(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed == NOT_AVAILABLE {
        String::new()
    } else {
        trimmed.to_string()
    }
}
