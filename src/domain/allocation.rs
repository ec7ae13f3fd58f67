//! Static share allocation made once at the common start date.

use crate::domain::basket::Asset;
use crate::domain::series::AssetSeries;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Share quantities per asset code. Built once, never revised.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SharePositions {
    shares: HashMap<String, f64>,
}

impl SharePositions {
    /// Buys `seed * weight / 100` worth of each asset at its close on `start`.
    ///
    /// An asset without a positive close on exactly `start` gets no position.
    pub fn allocate(
        assets: &[Asset],
        series: &HashMap<String, AssetSeries>,
        start: NaiveDate,
        seed_money: i64,
    ) -> Self {
        let mut shares = HashMap::new();
        for asset in assets {
            let first = series.get(&asset.code).and_then(|s| s.candle_on(start));
            match first {
                Some(candle) if candle.close.is_finite() && candle.close > 0.0 => {
                    let allocated = seed_money as f64 * (asset.weight / 100.0);
                    shares.insert(asset.code.clone(), allocated / candle.close);
                }
                Some(candle) => {
                    tracing::warn!(code = %asset.code, %start, close = candle.close, "non-positive start close, asset left unallocated");
                }
                None => {
                    tracing::debug!(code = %asset.code, %start, "no candle on start date, asset left unallocated");
                }
            }
        }
        Self { shares }
    }

    /// Share count for `code`; unallocated assets hold zero.
    pub fn get(&self, code: &str) -> f64 {
        self.shares.get(code).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.shares.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.shares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }
}
