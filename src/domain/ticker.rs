//! Ticker normalization.
//!
//! Extended feeds write share classes as `BRK B`; these become `BRK.B`. Only
//! common-stock classes survive, so preferred shares and warrants
//! (`EPR PRE`, `XYZ WS`) never reach the output tree.

use crate::domain::feed_format::FeedFormat;

pub const CLASS_SEPARATOR: char = '.';
pub const ALLOWED_CLASSES: [&str; 3] = ["A", "B", "C"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TickerRejection {
    #[error("empty ticker")]
    Empty,

    #[error("class suffix '{suffix}' of {ticker} is not a common-stock class")]
    UnsupportedClass { ticker: String, suffix: String },

    #[error("ticker {ticker} cannot be used as a file name")]
    UnsafePath { ticker: String },
}

/// Tickers name output files, so they must stay a single path component.
fn check_file_safe(ticker: String) -> Result<String, TickerRejection> {
    let unsafe_name = ticker.contains(['/', '\\', '\0']) || ticker == "." || ticker == "..";
    if unsafe_name {
        Err(TickerRejection::UnsafePath { ticker })
    } else {
        Ok(ticker)
    }
}

pub fn normalize_ticker(raw: &str, format: FeedFormat) -> Result<String, TickerRejection> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TickerRejection::Empty);
    }

    match format {
        FeedFormat::Basic => check_file_safe(trimmed.to_string()),
        FeedFormat::Extended => {
            let joined = trimmed
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(&CLASS_SEPARATOR.to_string())
                .to_uppercase();
            // A dangling separator carries no class.
            let ticker = joined.trim_end_matches(CLASS_SEPARATOR).to_string();
            if ticker.is_empty() {
                return Err(TickerRejection::Empty);
            }
            let ticker = check_file_safe(ticker)?;
            let suffix = ticker
                .split_once(CLASS_SEPARATOR)
                .map(|(_, suffix)| suffix.to_string());
            match suffix {
                None => Ok(ticker),
                Some(s) if ALLOWED_CLASSES.contains(&s.as_str()) => Ok(ticker),
                Some(suffix) => Err(TickerRejection::UnsupportedClass { ticker, suffix }),
            }
        }
    }
}

/// Per-ticker output files are named after the lower-cased symbol.
pub fn file_stem(ticker: &str) -> String {
    ticker.to_lowercase()
}
