//! Historical price access port.

use crate::domain::candle::Candle;
use crate::domain::error::FoliobackError;

pub trait CandleSource {
    /// The most recent `lookback` daily candles for `code`, oldest first.
    ///
    /// An unknown code yields an empty vector, not an error.
    fn recent_candles(&self, code: &str, lookback: usize) -> Result<Vec<Candle>, FoliobackError>;
}
