use std::path::PathBuf;

use anyhow::Context;
use rust_decimal::Decimal;
use satroi_core::{KpiTable, StoreDirectory};
use satroi_simulator::{AtvSource, SimulationOptions, SimulationReport};
use satroi_vemcount::Step;

use crate::{OutputFormat, PeriodArgs};

/// Printed when the simulation ran fine but there was nothing to aggregate.
pub(crate) const NO_DATA_MESSAGE: &str = "no Saturday data for the selected stores and period";

#[derive(Debug)]
pub(crate) struct SimulateArgs {
    pub period: PeriodArgs,
    pub input: Option<PathBuf>,
    pub uplift: Decimal,
    pub atv_source: AtvSource,
    pub format: OutputFormat,
    pub chart: bool,
}

/// Load KPI data, run the Saturday uplift simulation, and print the result.
///
/// An empty result is reported on stdout and is not an error.
///
/// # Errors
///
/// Returns an error if the KPI data cannot be loaded, the report structure
/// is malformed, or the simulation contract is violated (negative uplift,
/// no ATV column).
pub(crate) async fn run_simulate(
    config: &satroi_core::AppConfig,
    args: SimulateArgs,
) -> anyhow::Result<()> {
    let raw = match args.input.as_deref() {
        Some(path) => crate::input::read_report(path)?,
        None => {
            let query = crate::input::build_query(config, &args.period, Step::Day)?;
            crate::input::fetch_report(config, &query).await?
        }
    };

    let mut table = satroi_vemcount::normalize_kpi_response(&raw)
        .context("KPI report has an unexpected structure (API contract changed?)")?;
    if args.input.is_some() {
        restrict_to_shops(&mut table, &args.period.shops);
    }

    let directory = load_directory(config);
    let options = SimulationOptions::new(args.uplift).with_atv_source(args.atv_source);
    let report = satroi_simulator::simulate_with_names(&table, options, &directory)
        .context("simulation could not run")?;

    if report.is_empty() {
        println!("{NO_DATA_MESSAGE}");
        return Ok(());
    }

    print_report(&report, args.format, args.chart)
}

fn print_report(report: &SimulationReport, format: OutputFormat, chart: bool) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Table => {
            print!("{}", crate::render::simulation_table(report));
            if chart {
                println!();
                print!("{}", crate::render::extra_turnover_chart(report));
            }
        }
    }
    Ok(())
}

/// Keeps only the listed stores; an empty list keeps everything.
pub(crate) fn restrict_to_shops(table: &mut KpiTable, shops: &[i64]) {
    if shops.is_empty() {
        return;
    }
    let before = table.len();
    table.records.retain(|r| shops.contains(&r.store_id));
    tracing::debug!(before, after = table.len(), "restricted records to selected stores");
}

/// The store directory is optional: without it results are unnamed.
fn load_directory(config: &satroi_core::AppConfig) -> StoreDirectory {
    match satroi_core::load_stores(&config.stores_path) {
        Ok(directory) => directory,
        Err(e) => {
            tracing::warn!(
                path = %config.stores_path.display(),
                error = %e,
                "store directory unavailable; results will have no store names"
            );
            StoreDirectory::default()
        }
    }
}
