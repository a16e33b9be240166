mod fetch;
mod input;
mod normalize;
mod render;
mod simulate;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "satroi")]
#[command(about = "Estimate extra Saturday revenue from a conversion-rate uplift")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Download the raw KPI report from the analytics API
    Fetch {
        #[command(flatten)]
        period: PeriodArgs,
        /// Aggregation step requested from the API
        #[arg(long, value_enum, default_value_t = StepArg::Day)]
        step: StepArg,
        /// Write the report to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Flatten a saved KPI report into daily records
    Normalize {
        /// Raw KPI report (JSON) previously saved with `fetch`
        #[arg(long)]
        input: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Simulate a Saturday conversion uplift per store
    Simulate {
        #[command(flatten)]
        period: PeriodArgs,
        /// Use a saved KPI report instead of calling the API
        #[arg(long)]
        input: Option<PathBuf>,
        /// Conversion uplift in percentage points (defaults to SATROI_DEFAULT_UPLIFT_PCT)
        #[arg(long)]
        uplift: Option<Decimal>,
        /// Where average transaction value comes from
        #[arg(long, value_enum, default_value_t = AtvArg::Reported)]
        atv: AtvArg,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        /// Append a bar chart of extra turnover per store (table format only)
        #[arg(long)]
        chart: bool,
    },
}

/// Store selection and reporting period shared by `fetch` and `simulate`.
#[derive(Debug, Clone, clap::Args)]
struct PeriodArgs {
    /// Comma-separated store ids (defaults to SATROI_DEFAULT_SHOP_IDS)
    #[arg(long, value_delimiter = ',')]
    shops: Vec<i64>,
    /// First day of the period (defaults to Jan 1 of last year)
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Last day of the period (defaults to Dec 31 of last year)
    #[arg(long)]
    to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StepArg {
    Day,
    Week,
    Month,
}

impl From<StepArg> for satroi_vemcount::Step {
    fn from(step: StepArg) -> Self {
        match step {
            StepArg::Day => satroi_vemcount::Step::Day,
            StepArg::Week => satroi_vemcount::Step::Week,
            StepArg::Month => satroi_vemcount::Step::Month,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AtvArg {
    /// Use the feed's sales-per-transaction column
    Reported,
    /// Derive from turnover / (footfall × conversion rate)
    Derived,
}

impl From<AtvArg> for satroi_simulator::AtvSource {
    fn from(atv: AtvArg) -> Self {
        match atv {
            AtvArg::Reported => satroi_simulator::AtvSource::Reported,
            AtvArg::Derived => satroi_simulator::AtvSource::Derived,
        }
    }
}

/// Log level from config, or `info` when config failed to load.
fn log_level(config: &Result<satroi_core::AppConfig, satroi_core::ConfigError>) -> &str {
    config.as_ref().map_or("info", |c| c.log_level.as_str())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Loaded after parsing so `--help` and offline commands survive a bad env.
    let config = satroi_core::load_app_config();
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level(&config)))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Fetch {
            period,
            step,
            output,
        }) => {
            let config = config?;
            let query = input::build_query(&config, &period, step.into())?;
            fetch::run_fetch(&config, &query, output.as_deref()).await?;
        }
        Some(Commands::Normalize { input, format }) => {
            if let Err(e) = &config {
                tracing::warn!(error = %e, "ignoring invalid configuration for offline command");
            }
            normalize::run_normalize(&input, format)?;
        }
        Some(Commands::Simulate {
            period,
            input,
            uplift,
            atv,
            format,
            chart,
        }) => {
            let config = config?;
            let options = simulate::SimulateArgs {
                period,
                input,
                uplift: uplift.unwrap_or(config.default_uplift_pct),
                atv_source: atv.into(),
                format,
                chart,
            };
            simulate::run_simulate(&config, options).await?;
        }
        None => {
            println!("satroi: use `satroi --help` to list commands");
        }
    }

    Ok(())
}
