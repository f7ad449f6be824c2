//! Raw feed format variants.
//!
//! The basic feed carries only the symbol and availability columns. The
//! extended feed adds rebate and fee rates and uses space-separated class
//! suffixes in its symbols.

use std::fmt;
use std::str::FromStr;

pub const SYMBOL_COLUMN: &str = "SYM";
pub const AVAILABLE_COLUMN: &str = "AVAILABLE";
pub const REBATE_COLUMN: &str = "REBATERATE";
pub const FEE_COLUMN: &str = "FEERATE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedFormat {
    #[default]
    Basic,
    Extended,
}

impl FeedFormat {
    pub fn has_rates(self) -> bool {
        matches!(self, FeedFormat::Extended)
    }

    /// Header row of a per-ticker output file.
    pub fn ticker_header(self) -> &'static [&'static str] {
        match self {
            FeedFormat::Basic => &["Date", "BorrowableShares"],
            FeedFormat::Extended => &["Date", "BorrowableShares", "RebateRate", "FeeRate"],
        }
    }

    /// Header row of a per-date output file.
    pub fn date_header(self) -> &'static [&'static str] {
        match self {
            FeedFormat::Basic => &["Ticker", "BorrowableShares"],
            FeedFormat::Extended => &["Ticker", "BorrowableShares", "RebateRate", "FeeRate"],
        }
    }
}

impl fmt::Display for FeedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedFormat::Basic => write!(f, "basic"),
            FeedFormat::Extended => write!(f, "extended"),
        }
    }
}

impl FromStr for FeedFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(FeedFormat::Basic),
            "extended" => Ok(FeedFormat::Extended),
            other => Err(format!(
                "unknown feed format '{other}' (expected basic or extended)"
            )),
        }
    }
}
