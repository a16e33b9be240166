//! Resolving where a KPI report comes from: a saved file or the live API.

use std::path::Path;

use anyhow::Context;
use chrono::{Datelike, NaiveDate, Utc};
use satroi_vemcount::{KpiQuery, Step, VemcountClient};

use crate::PeriodArgs;

/// Jan 1 through Dec 31 of the year before `today`.
pub(crate) fn previous_calendar_year(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let year = today.year() - 1;
    // Jan 1 and Dec 31 exist in every year chrono can represent here.
    let start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(today);
    let end = NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(today);
    (start, end)
}

/// Builds the API query from CLI args, falling back to configured shops and
/// last calendar year.
pub(crate) fn build_query(
    config: &satroi_core::AppConfig,
    period: &PeriodArgs,
    step: Step,
) -> anyhow::Result<KpiQuery> {
    let (default_start, default_end) = previous_calendar_year(Utc::now().date_naive());
    let shop_ids = if period.shops.is_empty() {
        config.default_shop_ids.clone()
    } else {
        period.shops.clone()
    };

    let query = KpiQuery {
        shop_ids,
        start: period.from.unwrap_or(default_start),
        end: period.to.unwrap_or(default_end),
        step,
    };
    query.validate()?;
    Ok(query)
}

/// Reads a raw KPI report saved with `satroi fetch`.
pub(crate) fn read_report(path: &Path) -> anyhow::Result<serde_json::Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read KPI report {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("KPI report {} is not valid JSON", path.display()))
}

/// Fetches a raw KPI report from the configured API.
pub(crate) async fn fetch_report(
    config: &satroi_core::AppConfig,
    query: &KpiQuery,
) -> anyhow::Result<serde_json::Value> {
    config.require_api_url()?;
    let client = VemcountClient::from_config(config)?;
    client
        .fetch_kpis(query)
        .await
        .context("failed to fetch KPI data from the analytics API")
}
