//! Saved backtest history and its display summaries.

use crate::domain::basket::{format_weight, Asset};
use crate::domain::error::FoliobackError;
use crate::domain::metrics::AnalysisResult;
use chrono::NaiveDateTime;
use serde::Serialize;

pub const TEST_TYPE_ALLOCATION: &str = "ALLOCATION";
pub const NO_ASSET_INFO: &str = "no asset info";
pub const DATA_ERROR: &str = "data error";

/// Summary record handed to a history sink.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHistoryRecord {
    pub user: String,
    pub test_type: String,
    pub seed_money: i64,
    pub period_months: u32,
    /// JSON array snapshot of the basket.
    pub assets_json: String,
    pub final_balance: i64,
    pub total_return: f64,
    pub cagr: f64,
    pub mdd: f64,
    pub created_at: NaiveDateTime,
}

impl NewHistoryRecord {
    pub fn from_result(
        user: &str,
        assets: &[Asset],
        seed_money: i64,
        period_months: u32,
        result: &AnalysisResult,
        created_at: NaiveDateTime,
    ) -> Result<Self, FoliobackError> {
        Ok(Self {
            user: user.to_string(),
            test_type: TEST_TYPE_ALLOCATION.to_string(),
            seed_money,
            period_months,
            assets_json: serde_json::to_string(assets)?,
            final_balance: result.final_balance,
            total_return: result.total_return,
            cagr: result.cagr,
            mdd: result.mdd,
            created_at,
        })
    }
}

/// A record as read back from storage.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    pub id: i64,
    pub user: String,
    pub test_type: String,
    pub seed_money: i64,
    pub period_months: u32,
    pub assets_json: Option<String>,
    pub final_balance: i64,
    pub total_return: f64,
    pub cagr: f64,
    pub mdd: f64,
    pub created_at: Option<NaiveDateTime>,
}

/// Outcome of reading a basket snapshot back for display.
#[derive(Debug, Clone, PartialEq)]
pub enum BasketSummary {
    Summary(String),
    Empty,
    Degraded,
}

impl BasketSummary {
    pub fn parse(assets_json: Option<&str>) -> Self {
        let Some(json) = assets_json.filter(|s| !s.trim().is_empty()) else {
            return BasketSummary::Empty;
        };
        match serde_json::from_str::<Vec<Asset>>(json) {
            Ok(assets) => match assets.split_first() {
                None => BasketSummary::Empty,
                Some((first, rest)) => {
                    let label = if first.name.trim().is_empty() {
                        &first.code
                    } else {
                        &first.name
                    };
                    let mut text = format!("{} ({}%)", label, format_weight(first.weight));
                    if !rest.is_empty() {
                        text.push_str(&format!(" and {} more", rest.len()));
                    }
                    BasketSummary::Summary(text)
                }
            },
            Err(e) => {
                tracing::debug!(error = %e, "unreadable basket snapshot");
                BasketSummary::Degraded
            }
        }
    }

    pub fn text(&self) -> &str {
        match self {
            BasketSummary::Summary(text) => text,
            BasketSummary::Empty => NO_ASSET_INFO,
            BasketSummary::Degraded => DATA_ERROR,
        }
    }
}

/// Display row for a history listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: i64,
    pub date: String,
    pub assets_summary: String,
    pub assets_json: Option<String>,
    pub seed_money: i64,
    pub period_months: u32,
    pub total_return: f64,
    pub final_balance: i64,
}

impl From<&HistoryRecord> for HistoryEntry {
    fn from(record: &HistoryRecord) -> Self {
        let summary = BasketSummary::parse(record.assets_json.as_deref());
        if summary == BasketSummary::Degraded {
            tracing::warn!(id = record.id, "history record has a malformed basket snapshot");
        }
        HistoryEntry {
            id: record.id,
            date: record
                .created_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
            assets_summary: summary.text().to_string(),
            assets_json: record.assets_json.clone(),
            seed_money: record.seed_money,
            period_months: record.period_months,
            total_return: record.total_return,
            final_balance: record.final_balance,
        }
    }
}
