//! Performance metrics derived from a valuation walk.

use super::valuation::{ChartPoint, Valuation};
use serde::{Deserialize, Serialize};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;
/// Annual risk-free rate in percent used for the Sharpe ratio.
pub const RISK_FREE_RATE_PCT: f64 = 3.5;

/// Summary of one simulation run. Percentages are rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub final_balance: i64,
    pub total_return: f64,
    pub cagr: f64,
    pub mdd: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    pub equity_curve: Vec<ChartPoint>,
}

impl AnalysisResult {
    pub fn compute(valuation: Valuation, seed_money: i64, period_months: u32) -> Self {
        let final_value = valuation.final_value as f64;
        let seed = seed_money as f64;

        let total_return = (final_value - seed) / seed * 100.0;

        let years = (period_months as f64 / 12.0).max(1.0);
        let cagr = ((final_value / seed).powf(1.0 / years) - 1.0) * 100.0;

        let (volatility, sharpe_ratio) = match annualized_volatility(&valuation.daily_returns) {
            Some(vol) if vol > 0.0 => (round2(vol), round2((cagr - RISK_FREE_RATE_PCT) / vol)),
            Some(vol) => (round2(vol), 0.0),
            None => (0.0, 0.0),
        };

        AnalysisResult {
            final_balance: valuation.final_value,
            total_return: round2(total_return),
            cagr: round2(cagr),
            mdd: round2(valuation.max_drawdown),
            volatility,
            sharpe_ratio,
            equity_curve: valuation.curve,
        }
    }
}

/// Population standard deviation of daily returns, annualized, in percent.
/// `None` for an empty series.
pub fn annualized_volatility(returns: &[f64]) -> Option<f64> {
    if returns.is_empty() {
        return None;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    Some(variance.sqrt() * TRADING_DAYS_PER_YEAR.sqrt() * 100.0)
}

/// Rounds half up to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}
