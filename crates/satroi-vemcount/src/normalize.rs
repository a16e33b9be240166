//! Flattening of the nested Vemcount KPI tree into a [`KpiTable`].
//!
//! The report has shipped in several shapes over time: with or without an
//! outer `data` envelope, with or without a `last_year` period layer, and
//! with the day's date under different keys. [`detect_shape`] finds the
//! store map once; everything after that is a single code path.
//!
//! ```text
//! { "data": { "last_year": { "<shop_id>": { "dates": { "<key>": { "data": { "dt": ..., "turnover": ... } } } } } } }
//! ```

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use satroi_core::{DailyRecord, KpiTable, Metric, RecordDate};
use serde_json::{Map, Value};

use crate::error::SchemaError;

/// Key of the optional outer envelope around the whole report.
const ENVELOPE_KEY: &str = "data";
/// Key of the optional period layer between the envelope and the store map.
const PERIOD_KEY: &str = "last_year";
/// Per-store container of day entries.
const DATES_KEY: &str = "dates";
/// Per-day metrics object.
const METRICS_KEY: &str = "data";

/// Date candidates in priority order: explicit date, display label, generic
/// positional field.
const DATE_FIELDS: [&str; 3] = ["dt", "label", "date"];

const TURNOVER_FIELDS: &[&str] = &["turnover"];
const FOOTFALL_FIELDS: &[&str] = &["count_in", "footfall"];
const CONVERSION_FIELDS: &[&str] = &["conversion_rate"];
const ATV_FIELDS: &[&str] = &["sales_per_transaction", "avg_transaction_value", "atv"];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Which layer of the report the store map was found at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawShape<'a> {
    /// The object is keyed by store id directly.
    StoreMap(&'a Map<String, Value>),
    /// The store map sits under a `last_year` period layer.
    PeriodWrapped(&'a Map<String, Value>),
}

impl<'a> RawShape<'a> {
    #[must_use]
    pub fn stores(self) -> &'a Map<String, Value> {
        match self {
            RawShape::StoreMap(m) | RawShape::PeriodWrapped(m) => m,
        }
    }
}

/// Locates the store map inside a raw report.
///
/// Strips the outer `data` envelope if present, then descends into the
/// `last_year` layer if present.
///
/// # Errors
///
/// Returns [`SchemaError::NotAnObject`] if any level that must be an object
/// is not one.
pub fn detect_shape(raw: &Value) -> Result<RawShape<'_>, SchemaError> {
    let mut path = String::from("$");
    let mut level = expect_object(raw, &path)?;

    if let Some(inner) = level.get(ENVELOPE_KEY) {
        path.push('.');
        path.push_str(ENVELOPE_KEY);
        level = expect_object(inner, &path)?;
    }

    match level.get(PERIOD_KEY) {
        Some(period) => {
            path.push('.');
            path.push_str(PERIOD_KEY);
            Ok(RawShape::PeriodWrapped(expect_object(period, &path)?))
        }
        None => Ok(RawShape::StoreMap(level)),
    }
}

/// Flattens a raw KPI report into one [`DailyRecord`] per (store, day key).
///
/// Day entries without a metrics object still produce a record (all zeros,
/// ATV unknown), and days whose date cannot be resolved are kept with
/// [`RecordDate::Unresolved`] so the simulator can reject them explicitly.
///
/// # Errors
///
/// Returns [`SchemaError`] if the report structure is malformed: a level
/// that must be an object is not, a store key is not an integer, a store's
/// `dates` container or a day entry has the wrong type, or a metric holds a
/// number too large to represent.
pub fn normalize_kpi_response(raw: &Value) -> Result<KpiTable, SchemaError> {
    let shape = detect_shape(raw)?;
    let mut table = KpiTable::default();

    for (store_key, store_value) in shape.stores() {
        let store_id = parse_store_id(store_key)?;
        let store = expect_object(store_value, &format!("$..{store_key}"))?;

        let dates = match store.get(DATES_KEY) {
            None | Some(Value::Null) => {
                tracing::debug!(store_id, "store has no dates container; no records");
                continue;
            }
            Some(Value::Object(dates)) => dates,
            Some(other) => {
                return Err(SchemaError::MalformedDates {
                    store_id,
                    found: json_type(other),
                })
            }
        };

        for (day_key, day_value) in dates {
            let record = normalize_day(&mut table, store_id, day_key, day_value)?;
            table.records.push(record);
        }
    }

    let unresolved = table
        .records
        .iter()
        .filter(|r| r.date == RecordDate::Unresolved)
        .count();
    tracing::info!(
        shape = shape_name(shape),
        stores = table.store_count(),
        records = table.len(),
        unresolved_dates = unresolved,
        "normalized KPI report"
    );
    for (metric, count) in &table.missing {
        tracing::debug!(%metric, count, "metric missing on some days; substituted");
    }

    Ok(table)
}

fn normalize_day(
    table: &mut KpiTable,
    store_id: i64,
    day_key: &str,
    day_value: &Value,
) -> Result<DailyRecord, SchemaError> {
    let malformed = |found: &'static str| SchemaError::MalformedDay {
        store_id,
        day_key: day_key.to_owned(),
        found,
    };

    let day = match day_value {
        Value::Null => None,
        Value::Object(day) => Some(day),
        other => return Err(malformed(json_type(other))),
    };

    let metrics = match day.and_then(|d| d.get(METRICS_KEY)) {
        None | Some(Value::Null) => None,
        Some(Value::Object(metrics)) => Some(metrics),
        Some(other) => return Err(malformed(json_type(other))),
    };

    let date = resolve_date(metrics, day);
    if date == RecordDate::Unresolved {
        tracing::warn!(store_id, day_key, "could not resolve a date for day entry");
    }

    let Some(metrics) = metrics else {
        for metric in [
            Metric::Turnover,
            Metric::Footfall,
            Metric::ConversionRate,
            Metric::AvgTransactionValue,
        ] {
            *table.missing.entry(metric).or_insert(0) += 1;
        }
        return Ok(DailyRecord::empty(store_id, date));
    };

    let mut read = |metric: Metric, fields: &[&str]| {
        read_metric(table, metrics, metric, fields, store_id, day_key)
    };
    let turnover = read(Metric::Turnover, TURNOVER_FIELDS)?;
    let footfall = read(Metric::Footfall, FOOTFALL_FIELDS)?;
    let conversion_rate = read(Metric::ConversionRate, CONVERSION_FIELDS)?;
    // Zero ATV means unknown, not a real average.
    let avg_transaction_value =
        read(Metric::AvgTransactionValue, ATV_FIELDS)?.filter(|v| !v.is_zero());

    Ok(DailyRecord {
        store_id,
        date,
        turnover: turnover.unwrap_or(Decimal::ZERO),
        footfall: footfall.unwrap_or(Decimal::ZERO),
        conversion_rate: conversion_rate.unwrap_or(Decimal::ZERO),
        avg_transaction_value,
    })
}

/// Reads the first present key among `fields`, recording the column as seen
/// and counting a miss when the value is absent or unparseable.
///
/// A finite number too large for `Decimal` is an error, not a miss.
fn read_metric(
    table: &mut KpiTable,
    metrics: &Map<String, Value>,
    metric: Metric,
    fields: &[&str],
    store_id: i64,
    day_key: &str,
) -> Result<Option<Decimal>, SchemaError> {
    let value = fields.iter().find_map(|f| metrics.get(*f));
    if value.is_some() {
        table.columns.insert(metric);
    }
    let parsed = value.and_then(parse_decimal);
    if parsed.is_none() {
        if value.is_some_and(exceeds_decimal_range) {
            tracing::warn!(store_id, day_key, %metric, "metric value out of range");
            return Err(SchemaError::NumericOutOfRange {
                store_id,
                day_key: day_key.to_owned(),
                metric,
            });
        }
        *table.missing.entry(metric).or_insert(0) += 1;
    }
    Ok(parsed)
}

/// `true` for a finite number whose magnitude `Decimal` cannot hold.
///
/// Only meaningful after [`parse_decimal`] has rejected the value. Values
/// too small to represent are not flagged.
fn exceeds_decimal_range(value: &Value) -> bool {
    let magnitude = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    magnitude.is_some_and(|m| m.is_finite() && m.abs() >= 1.0)
}

/// Parses a JSON number or numeric string into a [`Decimal`].
///
/// Returns `None` for `null`, booleans, containers, blank strings, and
/// anything that is not a finite number.
#[must_use]
pub fn parse_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else if let Some(u) = n.as_u64() {
                Some(Decimal::from(u))
            } else {
                parse_decimal_str(&n.to_string())
            }
        }
        Value::String(s) => parse_decimal_str(s),
        _ => None,
    }
}

fn parse_decimal_str(raw: &str) -> Option<Decimal> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Picks the first populated date candidate and parses it.
///
/// Field priority wins over object: `dt` in the day wrapper beats `label` in
/// the metrics object.
fn resolve_date(
    metrics: Option<&Map<String, Value>>,
    day: Option<&Map<String, Value>>,
) -> RecordDate {
    let candidate = DATE_FIELDS.iter().find_map(|field| {
        [metrics, day].into_iter().flatten().find_map(|obj| {
            obj.get(*field)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
        })
    });

    match candidate {
        Some(raw) => parse_kpi_date(raw).map_or_else(
            || {
                tracing::warn!(raw, "unparseable date label");
                RecordDate::Unresolved
            },
            RecordDate::Resolved,
        ),
        None => RecordDate::Unresolved,
    }
}

/// Parses the date formats the report has been observed to use.
#[must_use]
pub fn parse_kpi_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

fn parse_store_id(key: &str) -> Result<i64, SchemaError> {
    key.trim()
        .parse::<i64>()
        .map_err(|_| SchemaError::InvalidStoreId(key.to_owned()))
}

fn expect_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, SchemaError> {
    value.as_object().ok_or_else(|| SchemaError::NotAnObject {
        path: path.to_owned(),
        found: json_type(value),
    })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn shape_name(shape: RawShape<'_>) -> &'static str {
    match shape {
        RawShape::StoreMap(_) => "store_map",
        RawShape::PeriodWrapped(_) => "period_wrapped",
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
