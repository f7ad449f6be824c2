//! Raw snapshot directory adapter.
//!
//! The fetch step deposits one flat file per processing date under
//! `<raw_root>/<YYYYMMDD>/`. The file is either named in configuration or is
//! the only regular file in that directory.

use crate::domain::error::ShortsheetError;
use crate::domain::run_config::{DATE_FORMAT, SourceConfig};
use crate::ports::snapshot_port::SnapshotPort;
use chrono::NaiveDate;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

pub struct SnapshotDirAdapter {
    raw_root: PathBuf,
    file_name: Option<String>,
}

impl SnapshotDirAdapter {
    pub fn new(raw_root: PathBuf, file_name: Option<String>) -> Self {
        Self { raw_root, file_name }
    }

    pub fn from_config(source: &SourceConfig) -> Self {
        Self::new(source.raw_root.clone(), source.snapshot_file.clone())
    }

    /// Path of the snapshot file for `date`.
    pub fn locate(&self, date: NaiveDate) -> Result<PathBuf, ShortsheetError> {
        let dir = self.raw_root.join(date.format(DATE_FORMAT).to_string());
        let missing = |reason: String| ShortsheetError::SnapshotMissing {
            date: date.format(DATE_FORMAT).to_string(),
            path: dir.display().to_string(),
            reason,
        };

        if let Some(name) = &self.file_name {
            let path = dir.join(name);
            return if path.is_file() {
                Ok(path)
            } else {
                Err(missing(format!("{name} not found")))
            };
        }

        let entries = fs::read_dir(&dir).map_err(|e| missing(e.to_string()))?;
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| missing(e.to_string()))?;
            if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                files.push(entry.path());
            }
        }
        files.sort();

        match files.len() {
            0 => Err(missing("directory holds no files".to_string())),
            1 => Ok(files.remove(0)),
            n => {
                tracing::warn!(
                    dir = %dir.display(),
                    count = n,
                    "several snapshot candidates, using the first by name"
                );
                Ok(files.remove(0))
            }
        }
    }
}

impl SnapshotPort for SnapshotDirAdapter {
    fn read_lines(&self, date: NaiveDate) -> Result<Vec<String>, ShortsheetError> {
        let path = self.locate(date)?;
        tracing::info!(path = %path.display(), "reading snapshot");
        let reader = BufReader::new(fs::File::open(&path)?);
        let mut lines = Vec::new();
        let mut lossy = 0usize;
        for raw in reader.split(b'\n') {
            let mut raw = raw?;
            if raw.last() == Some(&b'\r') {
                raw.pop();
            }
            let line = match String::from_utf8(raw) {
                Ok(line) => line,
                Err(e) => {
                    lossy += 1;
                    String::from_utf8_lossy(e.as_bytes()).into_owned()
                }
            };
            lines.push(line);
        }
        if lossy > 0 {
            tracing::warn!(
                path = %path.display(),
                lines = lossy,
                "replaced invalid UTF-8 bytes in snapshot"
            );
        }
        Ok(lines)
    }
}
