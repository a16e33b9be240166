use std::collections::BTreeMap;

use chrono::Weekday;
use rust_decimal::Decimal;
use satroi_core::{DailyRecord, KpiTable, Metric, RecordDate};

use crate::error::SimulationError;
use crate::names::StoreNames;
use crate::types::{
    growth_pct, AtvSource, SimulationOptions, SimulationReport, StoreSimulationResult,
};

#[derive(Debug, Default)]
struct StoreTotals {
    baseline: Decimal,
    extra: Decimal,
}

/// Projects the extra Saturday turnover each store would earn if its
/// conversion rate rose by `options.uplift_pct` percentage points.
///
/// Only records dated on a Saturday are used. For each one,
/// `extra = footfall × uplift_pct / 100 × ATV`; a record with unknown ATV
/// adds nothing to the extra turnover but still counts toward the baseline.
/// Results are ascending by store id.
///
/// An empty table, or one without Saturdays, yields a report with no results.
///
/// # Errors
///
/// - [`SimulationError::NegativeUplift`] if the uplift is below zero.
/// - [`SimulationError::MissingAtvColumn`] if the table has records but the
///   feed never carried an ATV column and `options.atv_source` is
///   [`AtvSource::Reported`].
/// - [`SimulationError::Overflow`] if a record's extra turnover or a store
///   total does not fit in a `Decimal`.
pub fn simulate(
    table: &KpiTable,
    options: SimulationOptions,
) -> Result<SimulationReport, SimulationError> {
    if options.uplift_pct.is_sign_negative() && !options.uplift_pct.is_zero() {
        return Err(SimulationError::NegativeUplift(options.uplift_pct));
    }

    let mut report = SimulationReport {
        uplift_pct: options.uplift_pct,
        atv_source: options.atv_source,
        saturday_records: 0,
        unresolved_dates: 0,
        unknown_atv_records: 0,
        results: Vec::new(),
    };

    if table.is_empty() {
        tracing::info!("KPI table is empty; nothing to simulate");
        return Ok(report);
    }

    if options.atv_source == AtvSource::Reported && !table.has_column(Metric::AvgTransactionValue) {
        return Err(SimulationError::MissingAtvColumn);
    }

    let extra_conversion = options.uplift_pct / Decimal::ONE_HUNDRED;
    let mut totals: BTreeMap<i64, StoreTotals> = BTreeMap::new();

    for record in &table.records {
        if record.date == RecordDate::Unresolved {
            report.unresolved_dates += 1;
            continue;
        }
        if !record.date.falls_on(Weekday::Sat) {
            continue;
        }
        report.saturday_records += 1;

        let overflow = || SimulationError::Overflow {
            store_id: record.store_id,
        };
        let extra = match record_atv(record, options.atv_source)? {
            Some(atv) => record
                .footfall
                .checked_mul(extra_conversion)
                .and_then(|customers| customers.checked_mul(atv))
                .ok_or_else(overflow)?,
            None => {
                report.unknown_atv_records += 1;
                Decimal::ZERO
            }
        };

        let entry = totals.entry(record.store_id).or_default();
        entry.baseline = entry
            .baseline
            .checked_add(record.turnover)
            .ok_or_else(overflow)?;
        entry.extra = entry.extra.checked_add(extra).ok_or_else(overflow)?;
    }

    report.results = totals
        .into_iter()
        .map(|(store_id, t)| {
            let total = t
                .baseline
                .checked_add(t.extra)
                .ok_or(SimulationError::Overflow { store_id })?;
            Ok(StoreSimulationResult {
                store_id,
                store_name: None,
                baseline_turnover: t.baseline,
                projected_extra_turnover: t.extra,
                projected_total_turnover: total,
                growth_pct: growth_pct(t.extra, t.baseline),
            })
        })
        .collect::<Result<Vec<_>, SimulationError>>()?;

    tracing::info!(
        uplift_pct = %report.uplift_pct,
        stores = report.results.len(),
        saturday_records = report.saturday_records,
        unresolved_dates = report.unresolved_dates,
        unknown_atv_records = report.unknown_atv_records,
        "simulated Saturday conversion uplift"
    );

    Ok(report)
}

/// [`simulate`], then label each result via `names`.
///
/// # Errors
///
/// Same as [`simulate`].
pub fn simulate_with_names<N: StoreNames + ?Sized>(
    table: &KpiTable,
    options: SimulationOptions,
    names: &N,
) -> Result<SimulationReport, SimulationError> {
    let mut report = simulate(table, options)?;
    for result in &mut report.results {
        result.store_name = names.store_name(result.store_id);
        if result.store_name.is_none() {
            tracing::debug!(store_id = result.store_id, "store not in directory");
        }
    }
    Ok(report)
}

/// ATV for one record, `None` when unknown or zero.
fn record_atv(record: &DailyRecord, source: AtvSource) -> Result<Option<Decimal>, SimulationError> {
    let overflow = || SimulationError::Overflow {
        store_id: record.store_id,
    };
    let atv = match source {
        AtvSource::Reported => record.avg_transaction_value,
        AtvSource::Derived => {
            let transactions = record
                .footfall
                .checked_mul(record.conversion_rate)
                .ok_or_else(overflow)?;
            if transactions.is_zero() {
                None
            } else {
                Some(record.turnover.checked_div(transactions).ok_or_else(overflow)?)
            }
        }
    };
    Ok(atv.filter(|v| !v.is_zero()))
}

#[cfg(test)]
#[path = "simulate_test.rs"]
mod tests;
