//! Per-ticker time series.
//!
//! Holds at most one row per date. Rows from the current pass are inserted
//! first; previously persisted rows only fill dates the pass did not produce.

use crate::domain::error::ShortsheetError;
use crate::domain::feed_format::FeedFormat;
use crate::domain::record::AvailabilityRow;
use crate::domain::run_config::{DATE_FORMAT, parse_date_key};
use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerHistory {
    ticker: String,
    rows: BTreeMap<NaiveDate, AvailabilityRow>,
}

impl TickerHistory {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            rows: BTreeMap::new(),
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&AvailabilityRow> {
        self.rows.get(&date)
    }

    /// Insert a row from the current pass. Returns the row it replaced.
    pub fn insert(&mut self, date: NaiveDate, row: AvailabilityRow) -> Option<AvailabilityRow> {
        self.rows.insert(date, row)
    }

    /// Fill in persisted rows for dates not already present. Returns how many
    /// rows were added.
    pub fn merge_history<I>(&mut self, history: I) -> usize
    where
        I: IntoIterator<Item = (NaiveDate, AvailabilityRow)>,
    {
        let mut added = 0;
        for (date, row) in history {
            if let std::collections::btree_map::Entry::Vacant(slot) = self.rows.entry(date) {
                slot.insert(row);
                added += 1;
            }
        }
        added
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.rows.keys().copied()
    }

    /// Serialize as `Date,BorrowableShares[,RebateRate,FeeRate]`, ascending by date.
    pub fn to_csv(&self, format: FeedFormat) -> Result<String, ShortsheetError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(format.ticker_header())?;
        for (date, row) in &self.rows {
            let date = date.format(DATE_FORMAT).to_string();
            let mut record = vec![date.as_str()];
            record.extend(row.fields());
            writer.write_record(&record)?;
        }
        finish_csv(writer)
    }
}

/// Read a previously written per-ticker file. Rows with an unreadable date
/// or no availability field are skipped.
pub fn parse_history(
    content: &str,
    format: FeedFormat,
) -> Result<Vec<(NaiveDate, AvailabilityRow)>, ShortsheetError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let Some(date) = record.get(0).and_then(|d| parse_date_key(d).ok()) else {
            tracing::warn!(row = ?record, "skipping history row with invalid date");
            continue;
        };
        let Some(borrowable) = record.get(1) else {
            tracing::warn!(%date, "skipping history row without availability");
            continue;
        };
        let row = if format.has_rates() {
            AvailabilityRow::extended(
                borrowable,
                record.get(2).unwrap_or_default(),
                record.get(3).unwrap_or_default(),
            )
        } else {
            AvailabilityRow::basic(borrowable)
        };
        rows.push((date, row));
    }
    Ok(rows)
}

pub(crate) fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<String, ShortsheetError> {
    let bytes = writer.into_inner().map_err(|e| ShortsheetError::Csv {
        reason: e.to_string(),
    })?;
    String::from_utf8(bytes).map_err(|e| ShortsheetError::Csv {
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn serializes_header_and_single_row() {
        let mut history = TickerHistory::new("AAPL");
        history.insert(date(2024, 1, 2), AvailabilityRow::basic("1000"));
        assert_eq!(
            history.to_csv(FeedFormat::Basic).unwrap(),
            "Date,BorrowableShares\n20240102,1000\n"
        );
    }

    #[test]
    fn rows_are_ascending_by_date() {
        let mut history = TickerHistory::new("AAPL");
        history.insert(date(2024, 3, 1), AvailabilityRow::basic("3"));
        history.insert(date(2023, 12, 29), AvailabilityRow::basic("1"));
        history.insert(date(2024, 1, 2), AvailabilityRow::basic("2"));
        assert_eq!(
            history.to_csv(FeedFormat::Basic).unwrap(),
            "Date,BorrowableShares\n20231229,1\n20240102,2\n20240301,3\n"
        );
    }

    #[test]
    fn later_insert_wins() {
        let mut history = TickerHistory::new("AAPL");
        history.insert(date(2024, 1, 2), AvailabilityRow::basic("100"));
        let replaced = history.insert(date(2024, 1, 2), AvailabilityRow::basic("200"));
        assert_eq!(replaced, Some(AvailabilityRow::basic("100")));
        assert_eq!(history.get(date(2024, 1, 2)).unwrap().borrowable, "200");
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn merge_never_overwrites_current_rows() {
        let mut history = TickerHistory::new("AAPL");
        history.insert(date(2024, 1, 2), AvailabilityRow::basic("current"));
        let added = history.merge_history(vec![
            (date(2024, 1, 2), AvailabilityRow::basic("stale")),
            (date(2023, 12, 29), AvailabilityRow::basic("old")),
        ]);
        assert_eq!(added, 1);
        assert_eq!(history.get(date(2024, 1, 2)).unwrap().borrowable, "current");
        assert_eq!(history.get(date(2023, 12, 29)).unwrap().borrowable, "old");
    }

    #[test]
    fn extended_rows_keep_empty_rates() {
        let mut history = TickerHistory::new("BRK.B");
        history.insert(date(2024, 1, 2), AvailabilityRow::extended("500", "", "0.25"));
        assert_eq!(
            history.to_csv(FeedFormat::Extended).unwrap(),
            "Date,BorrowableShares,RebateRate,FeeRate\n20240102,500,,0.25\n"
        );
    }

    #[test]
    fn parses_history_skipping_bad_rows() {
        let content = "Date,BorrowableShares\n20231229,700\nnot-a-date,5\n2024010,9\n20231228\n20231227,600\n";
        let rows = parse_history(content, FeedFormat::Basic).unwrap();
        assert_eq!(
            rows,
            vec![
                (date(2023, 12, 29), AvailabilityRow::basic("700")),
                (date(2023, 12, 27), AvailabilityRow::basic("600")),
            ]
        );
    }

    #[test]
    fn parses_extended_history() {
        let content = "Date,BorrowableShares,RebateRate,FeeRate\n20231229,700,4.9,\n";
        let rows = parse_history(content, FeedFormat::Extended).unwrap();
        assert_eq!(
            rows,
            vec![(date(2023, 12, 29), AvailabilityRow::extended("700", "4.9", ""))]
        );
    }

    #[test]
    fn empty_history_file_has_no_rows() {
        assert!(parse_history("", FeedFormat::Basic).unwrap().is_empty());
        assert!(
            parse_history("Date,BorrowableShares\n", FeedFormat::Basic)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn written_history_reads_back_for_merge() {
        let mut history = TickerHistory::new("MSFT");
        history.insert(date(2024, 1, 2), AvailabilityRow::extended("10", "1.5", ""));
        let text = history.to_csv(FeedFormat::Extended).unwrap();

        let mut next = TickerHistory::new("MSFT");
        next.insert(date(2024, 1, 3), AvailabilityRow::extended("20", "", "0.3"));
        next.merge_history(parse_history(&text, FeedFormat::Extended).unwrap());
        assert_eq!(next.dates().collect::<Vec<_>>(), vec![date(2024, 1, 2), date(2024, 1, 3)]);
    }
}
