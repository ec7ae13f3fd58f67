//! JSON report adapter implementing ReportPort.

use crate::domain::analysis::BacktestResponse;
use crate::domain::error::FoliobackError;
use crate::ports::report_port::ReportPort;
use std::fs;

#[derive(Debug, Default)]
pub struct JsonReportAdapter {
    pub pretty: bool,
}

impl JsonReportAdapter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    pub fn render(&self, response: &BacktestResponse) -> Result<String, FoliobackError> {
        let json = if self.pretty {
            serde_json::to_string_pretty(response)?
        } else {
            serde_json::to_string(response)?
        };
        Ok(json)
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(&self, response: &BacktestResponse, output_path: &str) -> Result<(), FoliobackError> {
        fs::write(output_path, self.render(response)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::AnalysisResult;
    use crate::domain::valuation::ChartPoint;

    fn sample_result() -> AnalysisResult {
        AnalysisResult {
            final_balance: 1_100_000,
            total_return: 10.0,
            cagr: 10.0,
            mdd: 4.55,
            volatility: 12.3,
            sharpe_ratio: 0.53,
            equity_curve: vec![ChartPoint {
                date: "2024-01-02".into(),
                value: 1_000_000,
            }],
        }
    }

    #[test]
    fn uses_camel_case_keys_and_omits_missing_benchmark() {
        let response = BacktestResponse {
            portfolio: sample_result(),
            benchmark: None,
        };
        let json: serde_json::Value =
            serde_json::from_str(&JsonReportAdapter::new(false).render(&response).unwrap())
                .unwrap();

        assert_eq!(json["portfolio"]["finalBalance"], 1_100_000);
        assert_eq!(json["portfolio"]["sharpeRatio"], 0.53);
        assert_eq!(json["portfolio"]["equityCurve"][0]["date"], "2024-01-02");
        assert!(json.get("benchmark").is_none());
    }

    #[test]
    fn writes_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        let response = BacktestResponse {
            portfolio: sample_result(),
            benchmark: Some(sample_result()),
        };

        JsonReportAdapter::new(true)
            .write(&response, path.to_str().unwrap())
            .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"benchmark\""));
        assert!(written.contains("\"mdd\": 4.55"));
    }
}
