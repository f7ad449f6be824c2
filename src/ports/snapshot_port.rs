//! Raw snapshot source port trait.

use crate::domain::error::ShortsheetError;
use chrono::NaiveDate;

pub trait SnapshotPort {
    /// All lines of the snapshot deposited for `date`, in file order.
    fn read_lines(&self, date: NaiveDate) -> Result<Vec<String>, ShortsheetError>;
}
