//! Per-asset candle series with an exact-date index.

use crate::domain::candle::Candle;
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct AssetSeries {
    pub code: String,
    pub candles: Vec<Candle>,
    date_index: HashMap<NaiveDate, usize>,
}

impl AssetSeries {
    /// `candles` must be ascending by date with no duplicates.
    pub fn new(code: impl Into<String>, candles: Vec<Candle>) -> Self {
        let date_index = candles
            .iter()
            .enumerate()
            .map(|(i, c)| (c.date, i))
            .collect();
        Self {
            code: code.into(),
            candles,
            date_index,
        }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.candles.first().map(|c| c.date)
    }

    pub fn candle_on(&self, date: NaiveDate) -> Option<&Candle> {
        self.date_index.get(&date).map(|&i| &self.candles[i])
    }

    pub fn close_on(&self, date: NaiveDate) -> Option<f64> {
        self.candle_on(date).map(|c| c.close)
    }

    /// Dates of this series on or after `start`, in order.
    pub fn dates_from(&self, start: NaiveDate) -> impl Iterator<Item = NaiveDate> + '_ {
        self.candles
            .iter()
            .map(|c| c.date)
            .filter(move |&d| d >= start)
    }
}
