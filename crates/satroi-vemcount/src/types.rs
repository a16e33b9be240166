//! Vemcount KPI report request types.
//!
//! The report endpoint takes a single JSON body describing which shops,
//! which KPIs, and which period to aggregate. The response is a nested
//! per-shop, per-day tree that [`crate::normalize`] flattens.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::VemcountError;

/// KPI fields requested from the report endpoint.
///
/// `sales_per_transaction` is the average transaction value the simulator
/// multiplies extra customers by.
pub const DATA_OUTPUT: [&str; 4] = [
    "count_in",
    "conversion_rate",
    "turnover",
    "sales_per_transaction",
];

/// Aggregation granularity of the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    #[default]
    Day,
    Week,
    Month,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Day => write!(f, "day"),
            Step::Week => write!(f, "week"),
            Step::Month => write!(f, "month"),
        }
    }
}

/// What the caller wants to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KpiQuery {
    pub shop_ids: Vec<i64>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub step: Step,
}

impl KpiQuery {
    /// Checks the query is answerable before any request is made.
    ///
    /// # Errors
    ///
    /// Returns [`VemcountError::InvalidQuery`] if no shops are selected or the
    /// period is inverted.
    pub fn validate(&self) -> Result<(), VemcountError> {
        if self.shop_ids.is_empty() {
            return Err(VemcountError::InvalidQuery(
                "at least one shop id is required".to_string(),
            ));
        }
        if self.start > self.end {
            return Err(VemcountError::InvalidQuery(format!(
                "start date {} is after end date {}",
                self.start, self.end
            )));
        }
        Ok(())
    }
}

/// Wire body for the report endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct KpiRequest {
    pub data: Vec<i64>,
    pub data_output: Vec<&'static str>,
    pub source: &'static str,
    pub period: &'static str,
    pub start_date: String,
    pub end_date: String,
    pub step: Step,
}

impl From<&KpiQuery> for KpiRequest {
    fn from(query: &KpiQuery) -> Self {
        Self {
            data: query.shop_ids.clone(),
            data_output: DATA_OUTPUT.to_vec(),
            source: "shops",
            period: "date",
            start_date: query.start.format("%Y-%m-%d").to_string(),
            end_date: query.end.format("%Y-%m-%d").to_string(),
            step: query.step,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(shop_ids: Vec<i64>, start: (i32, u32, u32), end: (i32, u32, u32)) -> KpiQuery {
        KpiQuery {
            shop_ids,
            start: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            end: NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
            step: Step::Day,
        }
    }

    #[test]
    fn request_body_matches_report_contract() {
        let q = query(vec![26304, 26560], (2024, 1, 1), (2024, 12, 31));
        let body = serde_json::to_value(KpiRequest::from(&q)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "data": [26304, 26560],
                "data_output": ["count_in", "conversion_rate", "turnover", "sales_per_transaction"],
                "source": "shops",
                "period": "date",
                "start_date": "2024-01-01",
                "end_date": "2024-12-31",
                "step": "day"
            })
        );
    }

    #[test]
    fn validate_rejects_empty_shop_list() {
        let q = query(vec![], (2024, 1, 1), (2024, 1, 31));
        assert!(matches!(q.validate(), Err(VemcountError::InvalidQuery(_))));
    }

    #[test]
    fn validate_rejects_inverted_period() {
        let q = query(vec![1], (2024, 2, 1), (2024, 1, 1));
        let err = q.validate().unwrap_err();
        assert!(err.to_string().contains("after end date"));
    }

    #[test]
    fn validate_accepts_single_day() {
        let q = query(vec![1], (2024, 1, 6), (2024, 1, 6));
        assert!(q.validate().is_ok());
    }

    #[test]
    fn step_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Step::Week).unwrap(), "week");
        assert_eq!(Step::Month.to_string(), "month");
    }
}
