//! Backtest history persistence ports.

use crate::domain::error::FoliobackError;
use crate::domain::history::{HistoryRecord, NewHistoryRecord};

pub trait HistorySink {
    /// Persists a record and returns its id.
    fn save(&self, record: &NewHistoryRecord) -> Result<i64, FoliobackError>;
}

pub trait HistoryReader {
    /// Records for `user`, most recent first.
    fn list_by_user(&self, user: &str) -> Result<Vec<HistoryRecord>, FoliobackError>;
}
