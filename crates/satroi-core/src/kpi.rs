//! Canonical per-store daily KPI records.
//!
//! These are the flat rows produced by normalizing an analytics API response
//! and consumed by the simulator. Nothing here knows about the wire format.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The calendar day a record describes, or an explicit marker that no date
/// could be resolved from the source row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordDate {
    Resolved(NaiveDate),
    Unresolved,
}

impl RecordDate {
    #[must_use]
    pub fn as_date(self) -> Option<NaiveDate> {
        match self {
            RecordDate::Resolved(d) => Some(d),
            RecordDate::Unresolved => None,
        }
    }

    /// Returns `true` only for resolved dates that fall on `weekday`.
    #[must_use]
    pub fn falls_on(self, weekday: Weekday) -> bool {
        self.as_date().is_some_and(|d| d.weekday() == weekday)
    }
}

impl std::fmt::Display for RecordDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordDate::Resolved(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            RecordDate::Unresolved => write!(f, "unresolved"),
        }
    }
}

/// One store's metrics for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub store_id: i64,
    pub date: RecordDate,
    pub turnover: Decimal,
    /// Visitors counted entering the store.
    pub footfall: Decimal,
    /// Fraction of visitors who purchased.
    pub conversion_rate: Decimal,
    /// Average revenue per transaction. `None` means unknown: the source had
    /// no value, or reported zero.
    pub avg_transaction_value: Option<Decimal>,
}

impl DailyRecord {
    /// A record with every metric zeroed and ATV unknown, used when the
    /// source has a date key but no metrics object.
    #[must_use]
    pub fn empty(store_id: i64, date: RecordDate) -> Self {
        Self {
            store_id,
            date,
            turnover: Decimal::ZERO,
            footfall: Decimal::ZERO,
            conversion_rate: Decimal::ZERO,
            avg_transaction_value: None,
        }
    }
}

/// KPI columns a normalized table can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Turnover,
    Footfall,
    ConversionRate,
    AvgTransactionValue,
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::Turnover => write!(f, "turnover"),
            Metric::Footfall => write!(f, "footfall"),
            Metric::ConversionRate => write!(f, "conversion_rate"),
            Metric::AvgTransactionValue => write!(f, "avg_transaction_value"),
        }
    }
}

/// Flat table of daily records plus what the source schema looked like.
///
/// `columns` lists the metrics whose key appeared in at least one per-day
/// object, so "the feed never sends ATV" can be told apart from "ATV was
/// missing on some days".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiTable {
    pub records: Vec<DailyRecord>,
    pub columns: BTreeSet<Metric>,
    /// Per-metric count of rows where the value was absent or unparseable.
    pub missing: BTreeMap<Metric, usize>,
}

impl KpiTable {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn has_column(&self, metric: Metric) -> bool {
        self.columns.contains(&metric)
    }

    /// Number of distinct stores present in the table.
    #[must_use]
    pub fn store_count(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.store_id)
            .collect::<BTreeSet<_>>()
            .len()
    }
}
