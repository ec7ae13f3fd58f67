//! Daily closing-price candle.

use chrono::NaiveDate;

/// Compact storage form, sortable lexicographically.
pub const RAW_DATE_FORMAT: &str = "%Y%m%d";
/// Display form used on chart points.
pub const CHART_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub date: NaiveDate,
    pub close: f64,
}

impl Candle {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }

    /// Date in `YYYYMMDD` form.
    pub fn raw_date(&self) -> String {
        self.date.format(RAW_DATE_FORMAT).to_string()
    }
}

/// Parses either `YYYYMMDD` or `YYYY-MM-DD`.
pub fn parse_date(input: &str) -> Result<NaiveDate, chrono::ParseError> {
    let trimmed = input.trim();
    if trimmed.len() == 8 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        NaiveDate::parse_from_str(trimmed, RAW_DATE_FORMAT)
    } else {
        NaiveDate::parse_from_str(trimmed, CHART_DATE_FORMAT)
    }
}

pub fn chart_date(date: NaiveDate) -> String {
    date.format(CHART_DATE_FORMAT).to_string()
}
