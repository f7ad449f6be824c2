#![allow(dead_code)]

use chrono::NaiveDate;
use shortsheet::domain::error::ShortsheetError;
use shortsheet::domain::feed_format::FeedFormat;
use shortsheet::domain::run_config::SourceConfig;
use shortsheet::ports::snapshot_port::SnapshotPort;
use shortsheet::ports::store_port::StorePort;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

pub struct MockSnapshotPort {
    pub snapshots: HashMap<NaiveDate, Vec<String>>,
}

impl MockSnapshotPort {
    pub fn new() -> Self {
        Self {
            snapshots: HashMap::new(),
        }
    }

    pub fn with_snapshot(mut self, date: NaiveDate, content: &str) -> Self {
        self.snapshots
            .insert(date, content.lines().map(str::to_string).collect());
        self
    }
}

impl SnapshotPort for MockSnapshotPort {
    fn read_lines(&self, date: NaiveDate) -> Result<Vec<String>, ShortsheetError> {
        self.snapshots
            .get(&date)
            .cloned()
            .ok_or_else(|| ShortsheetError::SnapshotMissing {
                date: date.format("%Y%m%d").to_string(),
                path: "memory".to_string(),
                reason: "not loaded".to_string(),
            })
    }
}

/// In-memory output tree. Writes land in `tickers`/`dates`; a stem or date
/// key listed in `broken` fails to write.
pub struct MockStorePort {
    pub history: RefCell<HashMap<String, String>>,
    pub tickers: RefCell<HashMap<String, String>>,
    pub dates: RefCell<HashMap<String, String>>,
    pub broken: HashSet<String>,
}

impl MockStorePort {
    pub fn new() -> Self {
        Self {
            history: RefCell::new(HashMap::new()),
            tickers: RefCell::new(HashMap::new()),
            dates: RefCell::new(HashMap::new()),
            broken: HashSet::new(),
        }
    }

    pub fn with_history(self, stem: &str, content: &str) -> Self {
        self.history
            .borrow_mut()
            .insert(stem.to_string(), content.to_string());
        self
    }

    pub fn with_broken(mut self, key: &str) -> Self {
        self.broken.insert(key.to_string());
        self
    }

    /// Make this run's ticker output the next run's history.
    pub fn roll_forward(&self) {
        let written = self.tickers.borrow().clone();
        self.history.borrow_mut().extend(written);
    }

    pub fn ticker(&self, stem: &str) -> Option<String> {
        self.tickers.borrow().get(stem).cloned()
    }

    pub fn date(&self, key: &str) -> Option<String> {
        self.dates.borrow().get(key).cloned()
    }
}

impl StorePort for MockStorePort {
    fn read_ticker_history(&self, stem: &str) -> Result<Option<String>, ShortsheetError> {
        Ok(self.history.borrow().get(stem).cloned())
    }

    fn write_ticker(&self, stem: &str, contents: &str) -> Result<(), ShortsheetError> {
        if self.broken.contains(stem) {
            return Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into());
        }
        self.tickers
            .borrow_mut()
            .insert(stem.to_string(), contents.to_string());
        Ok(())
    }

    fn write_date(&self, date_key: &str, contents: &str) -> Result<(), ShortsheetError> {
        if self.broken.contains(date_key) {
            return Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into());
        }
        self.dates
            .borrow_mut()
            .insert(date_key.to_string(), contents.to_string());
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn source(date: NaiveDate, format: FeedFormat) -> SourceConfig {
    SourceConfig {
        date,
        format,
        raw_root: PathBuf::from("/unused"),
        snapshot_file: None,
    }
}

pub const EXTENDED_HEADER: &str = "#SYM|CUR|NAME|CON|ISIN|REBATERATE|FEERATE|AVAILABLE|";

/// A realistic extended snapshot with begin/end marker lines.
pub fn extended_snapshot(rows: &[(&str, &str, &str, &str)]) -> String {
    let mut out = String::from("#BOF|2024.01.02|09:15:03\n");
    out.push_str(EXTENDED_HEADER);
    out.push('\n');
    for (i, (sym, rebate, fee, available)) in rows.iter().enumerate() {
        out.push_str(&format!(
            "{sym}|USD|{sym} INC|{con}|US000000000{i}|{rebate}|{fee}|{available}|\n",
            con = 1000 + i
        ));
    }
    out.push_str(&format!("#EOF|{}\n", rows.len()));
    out
}
