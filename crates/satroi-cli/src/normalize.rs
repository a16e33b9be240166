use std::path::Path;

use anyhow::Context;

use crate::OutputFormat;

/// Flatten a saved KPI report and print the daily records.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the report structure is
/// not one the normalizer understands.
pub(crate) fn run_normalize(input: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let raw = crate::input::read_report(input)?;
    let table = satroi_vemcount::normalize_kpi_response(&raw)
        .context("KPI report has an unexpected structure (API contract changed?)")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&table)?),
        OutputFormat::Table => {
            if table.is_empty() {
                println!("no daily records in {}", input.display());
                return Ok(());
            }
            print!("{}", crate::render::records_table(&table));
            println!();
            println!(
                "{} records across {} stores",
                table.len(),
                table.store_count()
            );
            for (metric, count) in &table.missing {
                println!("note: {metric} missing on {count} days (treated as zero/unknown)");
            }
        }
    }

    Ok(())
}
