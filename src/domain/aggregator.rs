//! Ingest parsed records for one processing date, then drain both output
//! shapes through a [`StorePort`].
//!
//! A failed file never stops the run: the ticker or date is recorded in the
//! [`RunReport`] and the drain moves on.

use crate::domain::date_snapshot::DateSnapshot;
use crate::domain::error::ShortsheetError;
use crate::domain::feed_format::FeedFormat;
use crate::domain::record::RawRecord;
use crate::domain::run_config::DATE_FORMAT;
use crate::domain::ticker::file_stem;
use crate::domain::ticker_history::{TickerHistory, parse_history};
use crate::ports::store_port::StorePort;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

pub struct Aggregator {
    date: NaiveDate,
    format: FeedFormat,
    by_ticker: BTreeMap<String, TickerHistory>,
    by_date: BTreeMap<NaiveDate, DateSnapshot>,
    records: usize,
    started: Instant,
}

/// Outcome of a drained run. Failures are data, not errors; use
/// [`RunReport::into_result`] to turn them into one.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub date: NaiveDate,
    pub records: usize,
    pub tickers_written: usize,
    pub dates_written: usize,
    pub history_rows_merged: usize,
    pub failed_tickers: Vec<String>,
    pub failed_dates: Vec<String>,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failed_tickers.is_empty() && self.failed_dates.is_empty()
    }

    /// Records ingested per second of wall time.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.records as f64 / secs
        } else {
            self.records as f64
        }
    }

    pub fn into_result(self) -> Result<RunReport, ShortsheetError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ShortsheetError::PartialFailure {
                tickers: self.failed_tickers,
                dates: self.failed_dates,
            })
        }
    }
}

impl Aggregator {
    pub fn new(date: NaiveDate, format: FeedFormat) -> Self {
        Self {
            date,
            format,
            by_ticker: BTreeMap::new(),
            by_date: BTreeMap::new(),
            records: 0,
            started: Instant::now(),
        }
    }

    pub fn records(&self) -> usize {
        self.records
    }

    pub fn ticker_count(&self) -> usize {
        self.by_ticker.len()
    }

    pub fn history(&self, ticker: &str) -> Option<&TickerHistory> {
        self.by_ticker.get(&ticker.to_uppercase())
    }

    pub fn snapshot(&self, date: NaiveDate) -> Option<&DateSnapshot> {
        self.by_date.get(&date)
    }

    /// Add one record under the processing date. A ticker seen twice keeps
    /// the later row in both groupings.
    pub fn ingest(&mut self, record: RawRecord) {
        self.records += 1;
        let ticker = record.ticker.to_uppercase();

        let history = self
            .by_ticker
            .entry(ticker.clone())
            .or_insert_with(|| TickerHistory::new(ticker.clone()));
        if history.insert(self.date, record.row.clone()).is_some() {
            tracing::debug!(%ticker, "ticker repeated in snapshot, keeping later row");
        }

        self.by_date
            .entry(self.date)
            .or_insert_with(|| DateSnapshot::new(self.date))
            .push(ticker, record.row);
    }

    pub fn ingest_all<I: IntoIterator<Item = RawRecord>>(&mut self, records: I) {
        for record in records {
            self.ingest(record);
        }
    }

    /// Merge history and write every per-ticker file, then every per-date file.
    pub fn drain(self, store: &dyn StorePort) -> RunReport {
        let mut report = RunReport {
            date: self.date,
            records: self.records,
            tickers_written: 0,
            dates_written: 0,
            history_rows_merged: 0,
            failed_tickers: Vec::new(),
            failed_dates: Vec::new(),
            elapsed: Duration::ZERO,
        };

        for (ticker, mut history) in self.by_ticker {
            match drain_ticker(&mut history, self.format, store) {
                Ok(merged) => {
                    report.tickers_written += 1;
                    report.history_rows_merged += merged;
                }
                Err(e) => {
                    tracing::warn!(%ticker, "failed to write ticker file: {e}");
                    report.failed_tickers.push(ticker);
                }
            }
        }

        for (date, snapshot) in self.by_date {
            let key = date.format(DATE_FORMAT).to_string();
            match drain_date(&key, &snapshot, self.format, store) {
                Ok(()) => report.dates_written += 1,
                Err(e) => {
                    tracing::warn!(date = %key, "failed to write date file: {e}");
                    report.failed_dates.push(key);
                }
            }
        }

        report.elapsed = self.started.elapsed();
        report
    }
}

fn drain_ticker(
    history: &mut TickerHistory,
    format: FeedFormat,
    store: &dyn StorePort,
) -> Result<usize, ShortsheetError> {
    let stem = file_stem(history.ticker());
    let merged = match store.read_ticker_history(&stem)? {
        Some(content) => history.merge_history(parse_history(&content, format)?),
        None => 0,
    };
    let csv = history.to_csv(format)?;
    store.write_ticker(&stem, &csv)?;
    tracing::debug!(ticker = history.ticker(), rows = history.len(), merged, "wrote ticker file");
    Ok(merged)
}

fn drain_date(
    key: &str,
    snapshot: &DateSnapshot,
    format: FeedFormat,
    store: &dyn StorePort,
) -> Result<(), ShortsheetError> {
    let csv = snapshot.to_csv(format)?;
    store.write_date(key, &csv)?;
    tracing::debug!(date = key, rows = snapshot.len(), "wrote date file");
    Ok(())
}
