use std::path::PathBuf;

use rust_decimal::Decimal;

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    /// Analytics endpoint. Only required by commands that hit the network.
    pub api_url: Option<String>,
    pub env: Environment,
    pub log_level: String,
    pub stores_path: PathBuf,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub default_shop_ids: Vec<i64>,
    pub default_uplift_pct: Decimal,
}

impl AppConfig {
    /// Returns the analytics endpoint, or an error naming the variable to set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `SATROI_API_URL` is unset.
    pub fn require_api_url(&self) -> Result<&str, ConfigError> {
        self.api_url
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("SATROI_API_URL".to_string()))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_url", &self.api_url.as_ref().map(|_| "[redacted]"))
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("stores_path", &self.stores_path)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("default_shop_ids", &self.default_shop_ids)
            .field("default_uplift_pct", &self.default_uplift_pct)
            .finish()
    }
}
