//! Backtest orchestration.
//!
//! Runs fetch → align → allocate → walk → metrics for the requested basket,
//! then once more for an optional single-asset benchmark. Benchmark and
//! history failures are logged and never fail the request.

use crate::domain::alignment::common_start_date;
use crate::domain::allocation::SharePositions;
use crate::domain::basket::{AnalysisRequest, Asset};
use crate::domain::error::FoliobackError;
use crate::domain::history::NewHistoryRecord;
use crate::domain::metrics::AnalysisResult;
use crate::domain::series::AssetSeries;
use crate::domain::valuation::walk;
use crate::ports::candle_port::CandleSource;
use crate::ports::history_port::HistorySink;
use serde::Serialize;
use std::collections::HashMap;

/// Identity reported for unauthenticated callers; never gets history.
pub const ANONYMOUS_USER: &str = "anonymousUser";

/// Extra candles fetched beyond the nominal period.
pub const LOOKBACK_BUFFER: usize = 60;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResponse {
    pub portfolio: AnalysisResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark: Option<AnalysisResult>,
}

/// `period_months * 30 + 60`
pub fn lookback_for(period_months: u32) -> usize {
    period_months as usize * 30 + LOOKBACK_BUFFER
}

/// Fetches one series per asset; an empty series is `InsufficientData`.
pub fn fetch_series(
    source: &dyn CandleSource,
    assets: &[Asset],
    lookback: usize,
) -> Result<HashMap<String, AssetSeries>, FoliobackError> {
    let mut series = HashMap::with_capacity(assets.len());
    for asset in assets {
        let candles = source.recent_candles(&asset.code, lookback)?;
        if candles.is_empty() {
            return Err(FoliobackError::InsufficientData {
                code: asset.code.clone(),
            });
        }
        tracing::debug!(code = %asset.code, candles = candles.len(), "fetched candles");
        series.insert(asset.code.clone(), AssetSeries::new(&asset.code, candles));
    }
    Ok(series)
}

/// One full simulation run for `assets`.
pub fn simulate(
    source: &dyn CandleSource,
    assets: &[Asset],
    seed_money: i64,
    period_months: u32,
) -> Result<AnalysisResult, FoliobackError> {
    let series = fetch_series(source, assets, lookback_for(period_months))?;

    let ordered: Vec<AssetSeries> = assets
        .iter()
        .filter_map(|a| series.get(&a.code).cloned())
        .collect();
    let start = common_start_date(&ordered)?;
    tracing::debug!(%start, assets = assets.len(), "common start date");

    let positions = SharePositions::allocate(assets, &series, start, seed_money);
    let valuation = walk(assets, &series, &positions, start, seed_money)?;

    Ok(AnalysisResult::compute(valuation, seed_money, period_months))
}

/// Runs the portfolio and optional benchmark, then records history for
/// identified callers when a sink is supplied.
pub fn analyze(
    source: &dyn CandleSource,
    sink: Option<&dyn HistorySink>,
    request: &AnalysisRequest,
    identity: Option<&str>,
) -> Result<BacktestResponse, FoliobackError> {
    request.validate()?;
    let seed_money = request.seed_units();

    let portfolio = simulate(source, &request.assets, seed_money, request.period_months)?;

    let benchmark = request.benchmark().and_then(|code| {
        let basket = [Asset::benchmark(code)];
        match simulate(source, &basket, seed_money, request.period_months) {
            Ok(result) => Some(result),
            Err(e) => {
                tracing::warn!(benchmark = code, error = %e, "benchmark analysis failed");
                None
            }
        }
    });

    let response = BacktestResponse {
        portfolio,
        benchmark,
    };

    if let (Some(sink), Some(user)) = (sink, identified(identity)) {
        save_history(sink, user, request, &response);
    }

    Ok(response)
}

fn identified(identity: Option<&str>) -> Option<&str> {
    identity
        .map(str::trim)
        .filter(|u| !u.is_empty() && *u != ANONYMOUS_USER)
}

fn save_history(
    sink: &dyn HistorySink,
    user: &str,
    request: &AnalysisRequest,
    response: &BacktestResponse,
) {
    let outcome = NewHistoryRecord::from_result(
        user,
        &request.assets,
        request.seed_units(),
        request.period_months,
        &response.portfolio,
        chrono::Local::now().naive_local(),
    )
    .and_then(|record| sink.save(&record));

    match outcome {
        Ok(id) => tracing::info!(user, id, "backtest history saved"),
        Err(e) => tracing::error!(user, error = %e, "failed to save backtest history"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::candle::Candle;
    use chrono::NaiveDate;
    use std::cell::RefCell;

    struct StubSource {
        data: HashMap<String, Vec<Candle>>,
        requested: RefCell<Vec<(String, usize)>>,
    }

    impl StubSource {
        fn new(entries: Vec<(&str, Vec<f64>)>) -> Self {
            let data = entries
                .into_iter()
                .map(|(code, closes)| {
                    let candles = closes
                        .into_iter()
                        .enumerate()
                        .map(|(i, close)| {
                            let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                                + chrono::Duration::days(i as i64);
                            Candle::new(date, close)
                        })
                        .collect();
                    (code.to_string(), candles)
                })
                .collect();
            Self {
                data,
                requested: RefCell::new(Vec::new()),
            }
        }
    }

    impl CandleSource for StubSource {
        fn recent_candles(&self, code: &str, lookback: usize) -> Result<Vec<Candle>, FoliobackError> {
            self.requested.borrow_mut().push((code.to_string(), lookback));
            Ok(self.data.get(code).cloned().unwrap_or_default())
        }
    }

    struct FailingSink;

    impl HistorySink for FailingSink {
        fn save(&self, _record: &NewHistoryRecord) -> Result<i64, FoliobackError> {
            Err(FoliobackError::Persistence {
                reason: "disk full".into(),
            })
        }
    }

    fn request(assets: Vec<Asset>) -> AnalysisRequest {
        AnalysisRequest {
            seed_money: 1_000_000.0,
            period_months: 12,
            benchmark_code: None,
            assets,
        }
    }

    #[test]
    fn lookback_adds_buffer() {
        assert_eq!(lookback_for(12), 420);
        assert_eq!(lookback_for(1), 90);
    }

    #[test]
    fn simulate_requests_lookback_per_asset() {
        let source = StubSource::new(vec![("A", vec![10.0, 11.0])]);
        simulate(&source, &[Asset::new("A", "", 100.0)], 1_000, 3).unwrap();
        assert_eq!(*source.requested.borrow(), vec![("A".to_string(), 150)]);
    }

    #[test]
    fn missing_asset_data_is_insufficient() {
        let source = StubSource::new(vec![("A", vec![10.0])]);
        let err = simulate(
            &source,
            &[Asset::new("A", "", 50.0), Asset::new("B", "", 50.0)],
            1_000,
            12,
        )
        .unwrap_err();
        match err {
            FoliobackError::InsufficientData { code } => assert_eq!(code, "B"),
            other => panic!("expected InsufficientData, got {other}"),
        }
    }

    #[test]
    fn invalid_request_fails_before_fetching() {
        let source = StubSource::new(vec![]);
        let err = analyze(&source, None, &request(vec![]), None).unwrap_err();
        assert!(matches!(err, FoliobackError::InvalidRequest { .. }));
        assert!(source.requested.borrow().is_empty());
    }

    #[test]
    fn benchmark_failure_is_not_fatal() {
        let source = StubSource::new(vec![("A", vec![10.0, 12.0])]);
        let req = AnalysisRequest {
            benchmark_code: Some("MISSING".into()),
            ..request(vec![Asset::new("A", "", 100.0)])
        };
        let res = analyze(&source, None, &req, None).unwrap();
        assert_eq!(res.portfolio.final_balance, 1_200_000);
        assert!(res.benchmark.is_none());
    }

    #[test]
    fn persistence_failure_is_not_fatal() {
        let source = StubSource::new(vec![("A", vec![10.0, 12.0])]);
        let req = request(vec![Asset::new("A", "", 100.0)]);
        let res = analyze(&source, Some(&FailingSink), &req, Some("alice")).unwrap();
        assert_eq!(res.portfolio.final_balance, 1_200_000);
    }

    #[test]
    fn anonymous_and_blank_identities_are_not_identified() {
        assert_eq!(identified(None), None);
        assert_eq!(identified(Some(ANONYMOUS_USER)), None);
        assert_eq!(identified(Some("  ")), None);
        assert_eq!(identified(Some("alice")), Some("alice"));
    }
}
