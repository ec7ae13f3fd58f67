//! Daily valuation walk over the simulation timeline.
//!
//! The timeline is the date sequence of the first basket asset, filtered to
//! dates on or after the start date. Days on which any basket asset lacks a
//! close are dropped. Peak, drawdown and previous value are threaded through
//! the walk as local accumulator state.

use crate::domain::allocation::SharePositions;
use crate::domain::basket::Asset;
use crate::domain::candle::chart_date;
use crate::domain::error::FoliobackError;
use crate::domain::series::AssetSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// `YYYY-MM-DD`
    pub date: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Valuation {
    pub curve: Vec<ChartPoint>,
    pub daily_returns: Vec<f64>,
    /// Percent, 0 to 100.
    pub max_drawdown: f64,
    pub final_value: i64,
}

#[derive(Debug, Clone)]
struct WalkState {
    peak: f64,
    max_drawdown: f64,
    prev_value: i64,
    final_value: i64,
    curve: Vec<ChartPoint>,
    daily_returns: Vec<f64>,
}

impl WalkState {
    fn seeded(seed_money: i64) -> Self {
        Self {
            peak: seed_money as f64,
            max_drawdown: 0.0,
            prev_value: seed_money,
            final_value: seed_money,
            curve: Vec::new(),
            daily_returns: Vec::new(),
        }
    }

    fn step(mut self, date: NaiveDate, value: i64, start: NaiveDate) -> Self {
        let v = value as f64;
        if v > self.peak {
            self.peak = v;
        }
        let drawdown = (self.peak - v) / self.peak * 100.0;
        if drawdown > self.max_drawdown {
            self.max_drawdown = drawdown;
        }

        self.curve.push(ChartPoint {
            date: chart_date(date),
            value,
        });

        if self.prev_value > 0 && date != start {
            let prev = self.prev_value as f64;
            self.daily_returns.push((v - prev) / prev);
        }
        self.prev_value = value;
        self.final_value = value;
        self
    }

    fn finish(self) -> Valuation {
        Valuation {
            curve: self.curve,
            daily_returns: self.daily_returns,
            max_drawdown: self.max_drawdown,
            final_value: self.final_value,
        }
    }
}

/// Portfolio value on `date`, or `None` if any basket asset has no close that day.
///
/// Each `shares * close` term is truncated to whole currency units before summing.
/// A value that does not fit in `i64` is an `InvalidRequest`.
pub fn value_on(
    assets: &[Asset],
    series: &HashMap<String, AssetSeries>,
    positions: &SharePositions,
    date: NaiveDate,
) -> Result<Option<i64>, FoliobackError> {
    let mut total = 0i64;
    for asset in assets {
        let Some(close) = series.get(&asset.code).and_then(|s| s.close_on(date)) else {
            return Ok(None);
        };
        let term = positions.get(&asset.code) * close;
        if !term.is_finite() || term >= i64::MAX as f64 {
            return Err(value_overflow(date));
        }
        total = total
            .checked_add(term as i64)
            .ok_or_else(|| value_overflow(date))?;
    }
    Ok(Some(total))
}

fn value_overflow(date: NaiveDate) -> FoliobackError {
    FoliobackError::InvalidRequest {
        reason: format!("portfolio value on {} exceeds the supported range", date),
    }
}

pub fn walk(
    assets: &[Asset],
    series: &HashMap<String, AssetSeries>,
    positions: &SharePositions,
    start: NaiveDate,
    seed_money: i64,
) -> Result<Valuation, FoliobackError> {
    let mut state = WalkState::seeded(seed_money);
    let Some(anchor) = assets.first().and_then(|a| series.get(&a.code)) else {
        return Ok(state.finish());
    };

    for date in anchor.dates_from(start) {
        if let Some(value) = value_on(assets, series, positions, date)?.filter(|&v| v > 0) {
            state = state.step(date, value, start);
        }
    }
    Ok(state.finish())
}
