//! Run configuration: resolution and validation.
//!
//! Everything a conversion needs is resolved up front; any missing or invalid
//! key aborts the run before a single line is read.

use crate::domain::error::ShortsheetError;
use crate::domain::feed_format::FeedFormat;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::path::PathBuf;

/// Processing dates and per-date file names use `YYYYMMDD`.
pub const DATE_FORMAT: &str = "%Y%m%d";
pub const TICKER_DIR: &str = "by-ticker";
pub const DATE_DIR: &str = "by-date";

/// Where the day's raw snapshot comes from and how to read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub date: NaiveDate,
    pub format: FeedFormat,
    pub raw_root: PathBuf,
    pub snapshot_file: Option<String>,
}

impl SourceConfig {
    pub fn date_key(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    pub fn snapshot_dir(&self) -> PathBuf {
        self.raw_root.join(self.date_key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub source: SourceConfig,
    pub output_root: PathBuf,
    pub history_root: PathBuf,
}

impl RunConfig {
    pub fn ticker_dir(&self) -> PathBuf {
        self.output_root.join(TICKER_DIR)
    }

    pub fn date_dir(&self) -> PathBuf {
        self.output_root.join(DATE_DIR)
    }
}

/// Parse an exact eight-digit `YYYYMMDD` date.
pub fn parse_date_key(value: &str) -> Result<NaiveDate, String> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{value}' is not an 8-digit YYYYMMDD date"));
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| format!("'{value}' is not a calendar date: {e}"))
}

pub fn build_source_config(config: &dyn ConfigPort) -> Result<SourceConfig, ShortsheetError> {
    let date_str = require(config, "run", "date")?;
    let date = parse_date_key(date_str.trim()).map_err(|reason| ShortsheetError::ConfigInvalid {
        section: "run".into(),
        key: "date".into(),
        reason,
    })?;

    let format = match config.get_string("run", "format") {
        Some(s) => s
            .parse::<FeedFormat>()
            .map_err(|reason| ShortsheetError::ConfigInvalid {
                section: "run".into(),
                key: "format".into(),
                reason,
            })?,
        None => FeedFormat::default(),
    };

    let raw_root = PathBuf::from(require(config, "paths", "raw_root")?);

    let snapshot_file = config.get_string("paths", "snapshot_file");
    if let Some(name) = &snapshot_file {
        if name.contains(['/', '\\']) {
            return Err(ShortsheetError::ConfigInvalid {
                section: "paths".into(),
                key: "snapshot_file".into(),
                reason: "must be a file name, not a path".into(),
            });
        }
    }

    Ok(SourceConfig {
        date,
        format,
        raw_root,
        snapshot_file,
    })
}

pub fn build_run_config(config: &dyn ConfigPort) -> Result<RunConfig, ShortsheetError> {
    let source = build_source_config(config)?;
    let output_root = PathBuf::from(require(config, "paths", "output_root")?);
    let history_root = config
        .get_string("paths", "history_root")
        .map(PathBuf::from)
        .unwrap_or_else(|| output_root.join(TICKER_DIR));

    Ok(RunConfig {
        source,
        output_root,
        history_root,
    })
}

fn require(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, ShortsheetError> {
    config
        .get_string(section, key)
        .ok_or_else(|| ShortsheetError::ConfigMissing {
            section: section.into(),
            key: key.into(),
        })
}
