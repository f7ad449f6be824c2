//! Snapshot line parser.
//!
//! Every line of a raw snapshot is classified exactly once. Header and blank
//! lines feed column discovery; everything else is a data line read against
//! the discovered [`ColumnLayout`].

use crate::domain::feed_format::FeedFormat;
use crate::domain::layout::{ColumnLayout, FIELD_DELIMITER, is_header_line};
use crate::domain::record::{AvailabilityRow, RawRecord, normalize_rate, strip_marker};
use crate::domain::ticker::{TickerRejection, normalize_ticker};

/// Outcome of feeding one line to the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    /// Header line that fixed the column layout.
    Layout(ColumnLayout),
    /// Header, marker or blank line with nothing to contribute.
    Filler,
    Record(RawRecord),
    Rejected(TickerRejection),
    Malformed(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub lines: usize,
    pub records: usize,
    pub rejected: usize,
    pub malformed: usize,
}

pub struct SnapshotParser {
    format: FeedFormat,
    layout: Option<ColumnLayout>,
    stats: ParseStats,
}

impl SnapshotParser {
    pub fn new(format: FeedFormat) -> Self {
        Self {
            format,
            layout: None,
            stats: ParseStats::default(),
        }
    }

    pub fn format(&self) -> FeedFormat {
        self.format
    }

    pub fn layout(&self) -> Option<ColumnLayout> {
        self.layout
    }

    pub fn stats(&self) -> ParseStats {
        self.stats
    }

    pub fn parse_line(&mut self, line: &str) -> ParsedLine {
        self.stats.lines += 1;

        if is_header_line(line) {
            if self.layout.is_some() {
                return ParsedLine::Filler;
            }
            return match ColumnLayout::discover(line, self.format) {
                Some(layout) => {
                    tracing::debug!(?layout, "discovered column layout");
                    self.layout = Some(layout);
                    ParsedLine::Layout(layout)
                }
                None => ParsedLine::Filler,
            };
        }

        let parsed = match self.layout {
            Some(layout) => parse_data_line(line, &layout, self.format),
            None => ParsedLine::Malformed("data line before column header".to_string()),
        };
        match &parsed {
            ParsedLine::Record(_) => self.stats.records += 1,
            ParsedLine::Rejected(reason) => {
                tracing::debug!(line = self.stats.lines, "dropping row: {reason}");
                self.stats.rejected += 1;
            }
            ParsedLine::Malformed(reason) => {
                tracing::warn!(line = self.stats.lines, "skipping malformed row: {reason}");
                self.stats.malformed += 1;
            }
            ParsedLine::Layout(_) | ParsedLine::Filler => {}
        }
        parsed
    }
}

fn parse_data_line(line: &str, layout: &ColumnLayout, format: FeedFormat) -> ParsedLine {
    let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
    if fields.len() < layout.min_fields() {
        return ParsedLine::Malformed(format!(
            "expected at least {} fields, found {}",
            layout.min_fields(),
            fields.len()
        ));
    }

    let ticker = match normalize_ticker(fields[layout.symbol], format) {
        Ok(t) => t,
        Err(TickerRejection::Empty) => {
            return ParsedLine::Malformed("empty ticker".to_string());
        }
        Err(unsafe_path @ TickerRejection::UnsafePath { .. }) => {
            return ParsedLine::Malformed(unsafe_path.to_string());
        }
        Err(rejection) => return ParsedLine::Rejected(rejection),
    };

    let borrowable = strip_marker(fields[layout.available]);
    let row = if format.has_rates() {
        AvailabilityRow::extended(
            borrowable,
            rate_field(&fields, layout.rebate),
            rate_field(&fields, layout.fee),
        )
    } else {
        AvailabilityRow::basic(borrowable)
    };

    ParsedLine::Record(RawRecord { ticker, row })
}

/// A rate is read only when its column was discovered and the line reaches
/// it; `NA` and absent values both become the empty string.
fn rate_field(fields: &[&str], index: Option<usize>) -> String {
    index
        .and_then(|i| fields.get(i))
        .map(|value| normalize_rate(value))
        .unwrap_or_default()
}

/// Parse a whole snapshot, returning the records in input order.
pub fn parse_snapshot<I, S>(lines: I, format: FeedFormat) -> (Vec<RawRecord>, SnapshotParser)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parser = SnapshotParser::new(format);
    let records = lines
        .into_iter()
        .filter_map(|line| match parser.parse_line(line.as_ref()) {
            ParsedLine::Record(record) => Some(record),
            _ => None,
        })
        .collect();
    (records, parser)
}
