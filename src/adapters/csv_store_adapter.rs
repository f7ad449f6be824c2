//! Filesystem output adapter.
//!
//! Per-ticker files live in one directory, per-date files in another, and
//! prior per-ticker history is read from a third (usually the same as the
//! per-ticker directory of the previous run).

use crate::domain::error::ShortsheetError;
use crate::domain::run_config::RunConfig;
use crate::ports::store_port::StorePort;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub struct CsvStoreAdapter {
    ticker_dir: PathBuf,
    date_dir: PathBuf,
    history_dir: PathBuf,
}

impl CsvStoreAdapter {
    pub fn new(ticker_dir: PathBuf, date_dir: PathBuf, history_dir: PathBuf) -> Self {
        Self {
            ticker_dir,
            date_dir,
            history_dir,
        }
    }

    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(
            config.ticker_dir(),
            config.date_dir(),
            config.history_root.clone(),
        )
    }

    /// Create the output directories. The history directory is read-only
    /// and may not exist yet on a first run.
    pub fn prepare(&self) -> Result<(), ShortsheetError> {
        fs::create_dir_all(&self.ticker_dir)?;
        fs::create_dir_all(&self.date_dir)?;
        Ok(())
    }

    fn csv_path(dir: &Path, stem: &str) -> PathBuf {
        dir.join(format!("{}.csv", stem))
    }

    /// Write through a sibling temp file and rename it into place, so a
    /// failed write leaves the previous file intact.
    fn write(path: PathBuf, contents: &str) -> Result<(), ShortsheetError> {
        let staging = path.with_extension("csv.tmp");
        let result = fs::write(&staging, contents).and_then(|()| fs::rename(&staging, &path));
        result.map_err(|e| {
            let _ = fs::remove_file(&staging);
            ShortsheetError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to write {}: {}", path.display(), e),
            ))
        })
    }
}

impl StorePort for CsvStoreAdapter {
    fn read_ticker_history(&self, stem: &str) -> Result<Option<String>, ShortsheetError> {
        let path = Self::csv_path(&self.history_dir, stem);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ShortsheetError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to read {}: {}", path.display(), e),
            ))),
        }
    }

    fn write_ticker(&self, stem: &str, contents: &str) -> Result<(), ShortsheetError> {
        Self::write(Self::csv_path(&self.ticker_dir, stem), contents)
    }

    fn write_date(&self, date_key: &str, contents: &str) -> Result<(), ShortsheetError> {
        Self::write(Self::csv_path(&self.date_dir, date_key), contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, CsvStoreAdapter) {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let store = CsvStoreAdapter::new(
            root.join("out/by-ticker"),
            root.join("out/by-date"),
            root.join("prev"),
        );
        (dir, store)
    }

    #[test]
    fn prepare_creates_output_dirs() {
        let (dir, store) = setup();
        store.prepare().unwrap();
        assert!(dir.path().join("out/by-ticker").is_dir());
        assert!(dir.path().join("out/by-date").is_dir());
        assert!(!dir.path().join("prev").exists());
    }

    #[test]
    fn missing_history_is_none() {
        let (_dir, store) = setup();
        assert_eq!(store.read_ticker_history("aapl").unwrap(), None);
    }

    #[test]
    fn reads_existing_history() {
        let (dir, store) = setup();
        fs::create_dir_all(dir.path().join("prev")).unwrap();
        fs::write(
            dir.path().join("prev/aapl.csv"),
            "Date,BorrowableShares\n20231229,700\n",
        )
        .unwrap();
        assert_eq!(
            store.read_ticker_history("aapl").unwrap().as_deref(),
            Some("Date,BorrowableShares\n20231229,700\n")
        );
    }

    #[test]
    fn unreadable_history_is_an_error() {
        let (dir, store) = setup();
        fs::create_dir_all(dir.path().join("prev/aapl.csv")).unwrap();
        assert!(store.read_ticker_history("aapl").is_err());
    }

    #[test]
    fn writes_ticker_and_date_files() {
        let (dir, store) = setup();
        store.prepare().unwrap();
        store.write_ticker("brk.b", "Date,BorrowableShares\n").unwrap();
        store.write_date("20240102", "Ticker,BorrowableShares\n").unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("out/by-ticker/brk.b.csv")).unwrap(),
            "Date,BorrowableShares\n"
        );
        assert!(dir.path().join("out/by-date/20240102.csv").is_file());
    }

    #[test]
    fn rewrite_replaces_whole_file_without_leftovers() {
        let (dir, store) = setup();
        store.prepare().unwrap();
        store.write_ticker("aapl", "Date,BorrowableShares\n20240102,1000\n").unwrap();
        store.write_ticker("aapl", "Date,BorrowableShares\n20240102,9\n").unwrap();
        let ticker_dir = dir.path().join("out/by-ticker");
        assert_eq!(
            fs::read_to_string(ticker_dir.join("aapl.csv")).unwrap(),
            "Date,BorrowableShares\n20240102,9\n"
        );
        assert_eq!(fs::read_dir(&ticker_dir).unwrap().count(), 1);
    }

    #[test]
    fn failed_write_keeps_previous_content() {
        let (dir, store) = setup();
        store.prepare().unwrap();
        store.write_ticker("aapl", "Date,BorrowableShares\n20240102,1000\n").unwrap();
        // Staging path occupied by a directory: the temp write fails.
        let ticker_dir = dir.path().join("out/by-ticker");
        fs::create_dir_all(ticker_dir.join("aapl.csv.tmp")).unwrap();

        assert!(store.write_ticker("aapl", "truncated").is_err());
        assert_eq!(
            fs::read_to_string(ticker_dir.join("aapl.csv")).unwrap(),
            "Date,BorrowableShares\n20240102,1000\n"
        );
    }

    #[test]
    fn write_failure_names_the_path() {
        let (dir, store) = setup();
        store.prepare().unwrap();
        fs::create_dir_all(dir.path().join("out/by-ticker/bad.csv")).unwrap();
        let err = store.write_ticker("bad", "x").unwrap_err();
        assert!(err.to_string().contains("bad.csv"));
    }
}
