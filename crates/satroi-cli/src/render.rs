//! Plain-text rendering of normalized records and simulation reports.

use std::fmt::Write as _;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use satroi_core::KpiTable;
use satroi_simulator::SimulationReport;

const CHART_WIDTH: usize = 40;
const NAME_WIDTH: usize = 28;

/// Formats a money amount as whole euros with thousands separators, e.g.
/// `€12,345`.
pub(crate) fn fmt_money(amount: Decimal) -> String {
    let rounded = amount.round_dp(0);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let digits = rounded.abs().trunc().to_string();
    format!("{sign}\u{20ac}{}", group_thousands(&digits))
}

fn fmt_total(amount: Option<Decimal>) -> String {
    amount.map_or_else(|| "overflow".to_string(), fmt_money)
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        format!("{}...", s.chars().take(max - 3).collect::<String>())
    } else {
        s.to_string()
    }
}

/// One line per daily record.
pub(crate) fn records_table(table: &KpiTable) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<8}{:<12}{:>12}{:>10}{:>8}{:>10}",
        "STORE", "DATE", "TURNOVER", "FOOTFALL", "CONV", "ATV"
    );
    for r in &table.records {
        let atv = r
            .avg_transaction_value
            .map_or_else(|| "unknown".to_string(), |v| format!("{:.2}", v.round_dp(2)));
        let _ = writeln!(
            out,
            "{:<8}{:<12}{:>12}{:>10}{:>8}{:>10}",
            r.store_id,
            r.date.to_string(),
            format!("{:.2}", r.turnover.round_dp(2)),
            r.footfall.round_dp(0).to_string(),
            format!("{:.3}", r.conversion_rate.round_dp(3)),
            atv
        );
    }
    out
}

/// Per-store results plus a portfolio total line.
pub(crate) fn simulation_table(report: &SimulationReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Saturday conversion uplift: +{}% ({} Saturday records)",
        report.uplift_pct.normalize(),
        report.saturday_records
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:<8}{:<w$}{:>14}{:>12}{:>14}{:>9}",
        "STORE",
        "NAME",
        "BASELINE",
        "EXTRA",
        "TOTAL",
        "GROWTH",
        w = NAME_WIDTH
    );
    for r in &report.results {
        let name = r.store_name.as_deref().unwrap_or("-");
        let _ = writeln!(
            out,
            "{:<8}{:<w$}{:>14}{:>12}{:>14}{:>9}",
            r.store_id,
            truncate(name, NAME_WIDTH - 2),
            fmt_money(r.baseline_turnover),
            fmt_money(r.projected_extra_turnover),
            fmt_money(r.projected_total_turnover),
            r.growth_pct.to_string(),
            w = NAME_WIDTH
        );
    }
    let baseline = report.total_baseline_turnover();
    let extra = report.total_extra_turnover();
    let total = baseline.zip(extra).and_then(|(b, e)| b.checked_add(e));
    let _ = writeln!(
        out,
        "{:<8}{:<w$}{:>14}{:>12}{:>14}{:>9}",
        "ALL",
        "",
        fmt_total(baseline),
        fmt_total(extra),
        fmt_total(total),
        report.total_growth_pct().to_string(),
        w = NAME_WIDTH
    );

    if report.unresolved_dates > 0 || report.unknown_atv_records > 0 {
        let _ = writeln!(out);
        if report.unresolved_dates > 0 {
            let _ = writeln!(
                out,
                "note: {} records skipped (date could not be resolved)",
                report.unresolved_dates
            );
        }
        if report.unknown_atv_records > 0 {
            let _ = writeln!(
                out,
                "note: {} Saturday records had no transaction value; no extra turnover estimated for them",
                report.unknown_atv_records
            );
        }
    }
    out
}

/// Horizontal bar chart of extra turnover per store, scaled to the largest.
pub(crate) fn extra_turnover_chart(report: &SimulationReport) -> String {
    let max = report
        .results
        .iter()
        .map(|r| r.projected_extra_turnover)
        .max()
        .unwrap_or(Decimal::ZERO);

    let mut out = String::new();
    let _ = writeln!(out, "Extra Saturday turnover per store");
    for r in &report.results {
        let bar_len = if max > Decimal::ZERO {
            (r.projected_extra_turnover / max * Decimal::from(CHART_WIDTH))
                .round()
                .to_usize()
                .unwrap_or(0)
        } else {
            0
        };
        let _ = writeln!(
            out,
            "{:<8}{:<w$} {}",
            r.store_id,
            "\u{2588}".repeat(bar_len),
            fmt_money(r.projected_extra_turnover),
            w = CHART_WIDTH
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use satroi_simulator::{AtvSource, GrowthPct, StoreSimulationResult};

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn result(store_id: i64, baseline: &str, extra: &str) -> StoreSimulationResult {
        let baseline = dec(baseline);
        let extra = dec(extra);
        StoreSimulationResult {
            store_id,
            store_name: None,
            baseline_turnover: baseline,
            projected_extra_turnover: extra,
            projected_total_turnover: baseline + extra,
            growth_pct: satroi_simulator::types::growth_pct(extra, baseline),
        }
    }

    fn report(results: Vec<StoreSimulationResult>) -> SimulationReport {
        SimulationReport {
            uplift_pct: dec("2.0"),
            atv_source: AtvSource::Reported,
            saturday_records: 2,
            unresolved_dates: 0,
            unknown_atv_records: 0,
            results,
        }
    }

    #[test]
    fn fmt_money_groups_thousands() {
        assert_eq!(fmt_money(dec("0")), "\u{20ac}0");
        assert_eq!(fmt_money(dec("999.4")), "\u{20ac}999");
        assert_eq!(fmt_money(dec("1234.5")), "\u{20ac}1,234");
        assert_eq!(fmt_money(dec("1234567")), "\u{20ac}1,234,567");
        assert_eq!(fmt_money(dec("-2500")), "-\u{20ac}2,500");
    }

    #[test]
    fn simulation_table_shows_growth_and_na() {
        let mut zero = result(200, "0", "20");
        zero.store_name = Some("Noord".to_string());
        let text = simulation_table(&report(vec![result(100, "1500", "300"), zero]));
        assert!(text.contains("+2%"));
        assert!(text.contains("20.00%"));
        assert!(text.contains("n/a"));
        assert!(text.contains("Noord"));
        assert!(text.contains("\u{20ac}1,800"));
    }

    #[test]
    fn total_row_shows_overflow_instead_of_panicking() {
        let text = simulation_table(&report(vec![
            result(100, "79228162514264337593543950335", "0"),
            result(200, "79228162514264337593543950335", "0"),
        ]));
        let total = text.lines().find(|l| l.starts_with("ALL")).unwrap();
        assert!(total.contains("overflow"));
        assert!(total.contains("n/a"));
    }

    #[test]
    fn simulation_table_mentions_skipped_records() {
        let mut r = report(vec![result(100, "1500", "300")]);
        r.unresolved_dates = 3;
        let text = simulation_table(&r);
        assert!(text.contains("3 records skipped"));
    }

    #[test]
    fn chart_scales_to_largest_store() {
        let text = extra_turnover_chart(&report(vec![
            result(100, "1500", "300"),
            result(200, "1000", "150"),
        ]));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].matches('\u{2588}').count(), CHART_WIDTH);
        assert_eq!(lines[2].matches('\u{2588}').count(), CHART_WIDTH / 2);
    }

    #[test]
    fn chart_with_no_extra_has_no_bars() {
        let text = extra_turnover_chart(&report(vec![result(100, "1500", "0")]));
        assert_eq!(text.matches('\u{2588}').count(), 0);
    }

    #[test]
    fn growth_not_computable_renders_as_na() {
        assert_eq!(GrowthPct::NotComputable.to_string(), "n/a");
    }
}
