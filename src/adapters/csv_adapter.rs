//! CSV file candle source.
//!
//! One file per code, `<base>/<CODE>.csv`, with a header row naming at least
//! `date` and `close` columns. Dates may be `YYYYMMDD` or `YYYY-MM-DD`.

use crate::domain::candle::{parse_date, Candle};
use crate::domain::error::FoliobackError;
use crate::ports::candle_port::CandleSource;
use std::path::{Path, PathBuf};

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, code: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", code))
    }
}

/// Reads every candle in `path`, sorted ascending with duplicate dates dropped.
pub fn read_candles(path: &Path) -> Result<Vec<Candle>, FoliobackError> {
    let mut rdr = csv::Reader::from_path(path).map_err(|e| FoliobackError::Database {
        reason: format!("failed to read {}: {}", path.display(), e),
    })?;

    let headers = rdr.headers().map_err(|e| FoliobackError::Database {
        reason: format!("CSV header error: {}", e),
    })?;
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| FoliobackError::Database {
                reason: format!("missing {} column in {}", name, path.display()),
            })
    };
    let date_col = column("date")?;
    let close_col = column("close")?;

    let mut candles = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| FoliobackError::Database {
            reason: format!("CSV parse error: {}", e),
        })?;

        let date_str = record.get(date_col).unwrap_or_default();
        let date = parse_date(date_str).map_err(|e| FoliobackError::Database {
            reason: format!("invalid date '{}': {}", date_str, e),
        })?;

        let close_str = record.get(close_col).unwrap_or_default();
        let close: f64 = close_str.trim().parse().map_err(|e| FoliobackError::Database {
            reason: format!("invalid close value '{}': {}", close_str, e),
        })?;
        if !(close.is_finite() && close > 0.0) {
            return Err(FoliobackError::Database {
                reason: format!("close on {} must be a positive price, got {}", date_str, close),
            });
        }

        candles.push(Candle::new(date, close));
    }

    candles.sort_by_key(|c| c.date);
    candles.dedup_by_key(|c| c.date);
    Ok(candles)
}

impl CandleSource for CsvAdapter {
    fn recent_candles(&self, code: &str, lookback: usize) -> Result<Vec<Candle>, FoliobackError> {
        let path = self.csv_path(code);
        if !path.exists() {
            tracing::debug!(code, path = %path.display(), "no CSV file for code");
            return Ok(Vec::new());
        }

        let mut candles = read_candles(&path)?;
        let skip = candles.len().saturating_sub(lookback);
        candles.drain(..skip);
        Ok(candles)
    }
}
