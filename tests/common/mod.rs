#![allow(dead_code)]

use chrono::NaiveDate;
use folioback::domain::basket::{AnalysisRequest, Asset};
use folioback::domain::candle::Candle;
use folioback::domain::error::FoliobackError;
use folioback::domain::history::{HistoryRecord, NewHistoryRecord};
use folioback::ports::candle_port::CandleSource;
use folioback::ports::history_port::{HistoryReader, HistorySink};
use std::cell::RefCell;
use std::collections::HashMap;

pub struct MockCandleSource {
    pub data: HashMap<String, Vec<Candle>>,
    pub errors: HashMap<String, String>,
    pub requests: RefCell<Vec<(String, usize)>>,
}

impl MockCandleSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_candles(mut self, code: &str, candles: Vec<Candle>) -> Self {
        self.data.insert(code.to_string(), candles);
        self
    }

    /// Consecutive daily closes starting 2024-01-02.
    pub fn with_closes(self, code: &str, closes: &[f64]) -> Self {
        self.with_candles(code, make_candles("2024-01-02", closes))
    }

    pub fn with_error(mut self, code: &str, reason: &str) -> Self {
        self.errors.insert(code.to_string(), reason.to_string());
        self
    }
}

impl CandleSource for MockCandleSource {
    fn recent_candles(&self, code: &str, lookback: usize) -> Result<Vec<Candle>, FoliobackError> {
        self.requests.borrow_mut().push((code.to_string(), lookback));
        if let Some(reason) = self.errors.get(code) {
            return Err(FoliobackError::Database {
                reason: reason.clone(),
            });
        }
        let candles = self.data.get(code).cloned().unwrap_or_default();
        let skip = candles.len().saturating_sub(lookback);
        Ok(candles[skip..].to_vec())
    }
}

/// In-memory history store; `failing()` rejects every save.
pub struct MockHistory {
    pub saved: RefCell<Vec<NewHistoryRecord>>,
    pub fail: bool,
}

impl MockHistory {
    pub fn new() -> Self {
        Self {
            saved: RefCell::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }
}

impl HistorySink for MockHistory {
    fn save(&self, record: &NewHistoryRecord) -> Result<i64, FoliobackError> {
        if self.fail {
            return Err(FoliobackError::Persistence {
                reason: "disk full".into(),
            });
        }
        let mut saved = self.saved.borrow_mut();
        saved.push(record.clone());
        Ok(saved.len() as i64)
    }
}

impl HistoryReader for MockHistory {
    fn list_by_user(&self, user: &str) -> Result<Vec<HistoryRecord>, FoliobackError> {
        Ok(self
            .saved
            .borrow()
            .iter()
            .enumerate()
            .filter(|(_, r)| r.user == user)
            .rev()
            .map(|(i, r)| HistoryRecord {
                id: i as i64 + 1,
                user: r.user.clone(),
                test_type: r.test_type.clone(),
                seed_money: r.seed_money,
                period_months: r.period_months,
                assets_json: Some(r.assets_json.clone()),
                final_balance: r.final_balance,
                total_return: r.total_return,
                cagr: r.cagr,
                mdd: r.mdd,
                created_at: Some(r.created_at),
            })
            .collect())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_candles(start_date: &str, closes: &[f64]) -> Vec<Candle> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Candle::new(start + chrono::Duration::days(i as i64), close))
        .collect()
}

pub fn request(seed_money: f64, period_months: u32, assets: &[(&str, f64)]) -> AnalysisRequest {
    AnalysisRequest {
        seed_money,
        period_months,
        benchmark_code: None,
        assets: assets
            .iter()
            .map(|(code, weight)| Asset::new(*code, *code, *weight))
            .collect(),
    }
}
