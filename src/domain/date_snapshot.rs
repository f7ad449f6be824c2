//! Cross-section of every ticker seen on one processing date.

use crate::domain::error::ShortsheetError;
use crate::domain::feed_format::FeedFormat;
use crate::domain::record::AvailabilityRow;
use crate::domain::ticker_history::finish_csv;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Rows keyed by ticker, so a ticker repeated within a pass keeps only its
/// last row and serialization is ordered by ticker string comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateSnapshot {
    date: NaiveDate,
    rows: BTreeMap<String, AvailabilityRow>,
}

impl DateSnapshot {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            rows: BTreeMap::new(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push(&mut self, ticker: impl Into<String>, row: AvailabilityRow) {
        self.rows.insert(ticker.into(), row);
    }

    /// Serialize as `Ticker,BorrowableShares[,RebateRate,FeeRate]`, ascending by ticker.
    pub fn to_csv(&self, format: FeedFormat) -> Result<String, ShortsheetError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(format.date_header())?;
        for (ticker, row) in &self.rows {
            let mut record = vec![ticker.as_str()];
            record.extend(row.fields());
            writer.write_record(&record)?;
        }
        finish_csv(writer)
    }
}
