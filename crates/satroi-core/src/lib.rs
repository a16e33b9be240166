pub mod app_config;
pub mod config;
pub mod kpi;
pub mod stores;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env, parse_shop_ids};
pub use kpi::{DailyRecord, KpiTable, Metric, RecordDate};
pub use stores::{load_stores, StoreDirectory, StoreEntry, StoresFile};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read stores file {path}: {source}")]
    StoresFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse stores file: {0}")]
    StoresFileParse(#[source] serde_yaml::Error),

    #[error("stores validation failed: {0}")]
    Validation(String),
}
