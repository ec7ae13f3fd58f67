//! Assets, baskets and the analysis request.
//!
//! A basket is an ordered list of assets with percentage weights. Weights are
//! not required to sum to 100; a mismatch is only logged.

use crate::domain::error::FoliobackError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const BENCHMARK_NAME: &str = "Benchmark";

/// Largest accepted seed, leaving room for portfolio growth within `i64`.
pub const MAX_SEED_MONEY: f64 = 1e15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub code: String,
    #[serde(default)]
    pub name: String,
    /// Percentage, 0 to 100.
    pub weight: f64,
}

impl Asset {
    pub fn new(code: impl Into<String>, name: impl Into<String>, weight: f64) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            weight,
        }
    }

    /// Synthetic single-asset basket member used for benchmark runs.
    pub fn benchmark(code: impl Into<String>) -> Self {
        Self::new(code, BENCHMARK_NAME, 100.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub seed_money: f64,
    pub period_months: u32,
    pub benchmark_code: Option<String>,
    pub assets: Vec<Asset>,
}

impl AnalysisRequest {
    pub fn validate(&self) -> Result<(), FoliobackError> {
        if !self.seed_money.is_finite() || self.seed_money < 1.0 {
            return Err(invalid("seed money must be at least one currency unit"));
        }
        if self.seed_money > MAX_SEED_MONEY {
            return Err(invalid(format!(
                "seed money must not exceed {}",
                MAX_SEED_MONEY
            )));
        }
        if self.period_months == 0 {
            return Err(invalid("period must be at least one month"));
        }
        if self.assets.is_empty() {
            return Err(invalid("at least one asset is required"));
        }
        let mut seen = HashSet::new();
        for asset in &self.assets {
            if asset.code.trim().is_empty() {
                return Err(invalid("asset code must not be empty"));
            }
            if !seen.insert(asset.code.as_str()) {
                return Err(invalid(format!("duplicate asset code: {}", asset.code)));
            }
            if !asset.weight.is_finite() || asset.weight < 0.0 {
                return Err(invalid(format!(
                    "weight for {} must be a non-negative number",
                    asset.code
                )));
            }
        }

        let total = total_weight(&self.assets);
        if (total - 100.0).abs() > 1e-9 {
            tracing::warn!(total, "basket weights do not sum to 100");
        }
        Ok(())
    }

    /// Seed money in whole currency units; fractional amounts are truncated.
    pub fn seed_units(&self) -> i64 {
        self.seed_money as i64
    }

    /// Benchmark code, ignoring blank values.
    pub fn benchmark(&self) -> Option<&str> {
        self.benchmark_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

pub fn total_weight(assets: &[Asset]) -> f64 {
    assets.iter().map(|a| a.weight).sum()
}

/// Parses `CODE:NAME:WEIGHT` (or `CODE:WEIGHT`) entries separated by commas.
pub fn parse_assets(input: &str) -> Result<Vec<Asset>, FoliobackError> {
    let mut assets = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(invalid("empty entry in asset list"));
        }

        let parts: Vec<&str> = trimmed.split(':').map(str::trim).collect();
        let (code, name, weight_str) = match parts.as_slice() {
            [code, weight] => (*code, "", *weight),
            [code, name, weight] => (*code, *name, *weight),
            _ => {
                return Err(invalid(format!(
                    "asset entry '{trimmed}' must be CODE:NAME:WEIGHT or CODE:WEIGHT"
                )));
            }
        };

        if code.is_empty() {
            return Err(invalid(format!("asset entry '{trimmed}' has no code")));
        }
        let weight: f64 = weight_str
            .parse()
            .map_err(|_| invalid(format!("invalid weight '{weight_str}' for {code}")))?;

        let code = code.to_uppercase();
        if !seen.insert(code.clone()) {
            return Err(invalid(format!("duplicate asset code: {code}")));
        }
        assets.push(Asset::new(code, name, weight));
    }

    Ok(assets)
}

/// Renders a weight without a trailing `.0` for whole numbers.
pub fn format_weight(weight: f64) -> String {
    if weight.fract() == 0.0 {
        format!("{}", weight as i64)
    } else {
        format!("{weight}")
    }
}

fn invalid(reason: impl Into<String>) -> FoliobackError {
    FoliobackError::InvalidRequest {
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> AnalysisRequest {
        AnalysisRequest {
            seed_money: 1_000_000.0,
            period_months: 12,
            benchmark_code: None,
            assets: vec![
                Asset::new("A", "Alpha", 60.0),
                Asset::new("B", "Beta", 40.0),
            ],
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(sample_request().validate().is_ok());
    }

    #[test]
    fn unbalanced_weights_are_permitted() {
        let req = AnalysisRequest {
            assets: vec![Asset::new("A", "Alpha", 30.0)],
            ..sample_request()
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_seed() {
        let req = AnalysisRequest {
            seed_money: 0.0,
            ..sample_request()
        };
        assert!(matches!(
            req.validate(),
            Err(FoliobackError::InvalidRequest { .. })
        ));
    }

    #[test]
    fn rejects_seed_beyond_supported_range() {
        let req = AnalysisRequest {
            seed_money: 1e19,
            ..sample_request()
        };
        assert!(matches!(
            req.validate(),
            Err(FoliobackError::InvalidRequest { .. })
        ));

        let at_limit = AnalysisRequest {
            seed_money: MAX_SEED_MONEY,
            ..sample_request()
        };
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn rejects_fractional_seed_below_one_unit() {
        let req = AnalysisRequest {
            seed_money: 0.5,
            ..sample_request()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn rejects_duplicate_codes() {
        let req = AnalysisRequest {
            assets: vec![Asset::new("A", "", 50.0), Asset::new("A", "", 50.0)],
            ..sample_request()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn rejects_zero_period() {
        let req = AnalysisRequest {
            period_months: 0,
            ..sample_request()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn rejects_empty_basket() {
        let req = AnalysisRequest {
            assets: vec![],
            ..sample_request()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn rejects_negative_weight() {
        let req = AnalysisRequest {
            assets: vec![Asset::new("A", "Alpha", -5.0)],
            ..sample_request()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn seed_units_truncates() {
        let req = AnalysisRequest {
            seed_money: 1_000_000.99,
            ..sample_request()
        };
        assert_eq!(req.seed_units(), 1_000_000);
    }

    #[test]
    fn blank_benchmark_is_none() {
        let req = AnalysisRequest {
            benchmark_code: Some("  ".into()),
            ..sample_request()
        };
        assert_eq!(req.benchmark(), None);

        let req = AnalysisRequest {
            benchmark_code: Some("SPY".into()),
            ..sample_request()
        };
        assert_eq!(req.benchmark(), Some("SPY"));
    }

    #[test]
    fn parse_assets_with_and_without_names() {
        let assets = parse_assets("spy:S&P 500:60, TLT:40").unwrap();
        assert_eq!(assets.len(), 2);
        assert_eq!(assets[0], Asset::new("SPY", "S&P 500", 60.0));
        assert_eq!(assets[1], Asset::new("TLT", "", 40.0));
    }

    #[test]
    fn parse_assets_rejects_bad_entries() {
        assert!(parse_assets("SPY").is_err());
        assert!(parse_assets("SPY:abc").is_err());
        assert!(parse_assets("SPY:60,,TLT:40").is_err());
        assert!(parse_assets("SPY:60,spy:40").is_err());
        assert!(parse_assets(":60").is_err());
    }

    #[test]
    fn benchmark_asset_is_full_weight() {
        let a = Asset::benchmark("SPY");
        assert_eq!(a.name, "Benchmark");
        assert!((a.weight - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn weight_formatting() {
        assert_eq!(format_weight(60.0), "60");
        assert_eq!(format_weight(33.5), "33.5");
    }
}
