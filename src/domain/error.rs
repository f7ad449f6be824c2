//! Domain error types.

/// Top-level error type for shortsheet.
#[derive(Debug, thiserror::Error)]
pub enum ShortsheetError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no snapshot for {date} under {path}: {reason}")]
    SnapshotMissing {
        date: String,
        path: String,
        reason: String,
    },

    #[error("csv error: {reason}")]
    Csv { reason: String },

    #[error("failed to write tickers [{}] and dates [{}]", .tickers.join(", "), .dates.join(", "))]
    PartialFailure {
        tickers: Vec<String>,
        dates: Vec<String>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for ShortsheetError {
    fn from(err: csv::Error) -> Self {
        ShortsheetError::Csv {
            reason: err.to_string(),
        }
    }
}

impl From<&ShortsheetError> for std::process::ExitCode {
    fn from(err: &ShortsheetError) -> Self {
        let code: u8 = match err {
            ShortsheetError::Io(_) => 1,
            ShortsheetError::ConfigParse { .. }
            | ShortsheetError::ConfigMissing { .. }
            | ShortsheetError::ConfigInvalid { .. } => 2,
            ShortsheetError::SnapshotMissing { .. } => 3,
            ShortsheetError::Csv { .. } => 4,
            ShortsheetError::PartialFailure { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
