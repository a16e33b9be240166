use std::path::Path;

use anyhow::Context;
use satroi_vemcount::KpiQuery;

/// Download the raw KPI report and write it to `output` or stdout.
///
/// # Errors
///
/// Returns an error if the API is not configured, the request fails, or the
/// output file cannot be written.
pub(crate) async fn run_fetch(
    config: &satroi_core::AppConfig,
    query: &KpiQuery,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let raw = crate::input::fetch_report(config, query).await?;
    let pretty = serde_json::to_string_pretty(&raw)?;

    match output {
        Some(path) => {
            std::fs::write(path, pretty)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "saved KPI report");
            println!(
                "saved KPI report for {} stores ({} to {}) to {}",
                query.shop_ids.len(),
                query.start,
                query.end,
                path.display()
            );
        }
        None => println!("{pretty}"),
    }

    Ok(())
}
