use std::str::FromStr;

use rust_decimal::Decimal;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_SHOP_IDS: &str = "26304,26560,26509,26480,26640,26359,26630,27038,26647,26646";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let api_url = lookup("SATROI_API_URL")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let env = parse_environment(&or_default("SATROI_ENV", "development"))?;
    let log_level = or_default("SATROI_LOG_LEVEL", "info");
    let stores_path = PathBuf::from(or_default("SATROI_STORES_PATH", "./config/stores.yaml"));

    let request_timeout_secs = parse_u64("SATROI_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("SATROI_USER_AGENT", "satroi/0.1 (retail-roi)");
    let max_retries = parse_u32("SATROI_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_u64("SATROI_RETRY_BACKOFF_BASE_MS", "1000")?;

    let default_shop_ids = parse_shop_ids(&or_default("SATROI_DEFAULT_SHOP_IDS", DEFAULT_SHOP_IDS))
        .map_err(|reason| invalid("SATROI_DEFAULT_SHOP_IDS", reason))?;

    let default_uplift_pct = Decimal::from_str(&or_default("SATROI_DEFAULT_UPLIFT_PCT", "1.0"))
        .map_err(|e| invalid("SATROI_DEFAULT_UPLIFT_PCT", e.to_string()))?;
    if default_uplift_pct.is_sign_negative() && !default_uplift_pct.is_zero() {
        return Err(invalid(
            "SATROI_DEFAULT_UPLIFT_PCT",
            "must not be negative".to_string(),
        ));
    }

    Ok(AppConfig {
        api_url,
        env,
        log_level,
        stores_path,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        default_shop_ids,
        default_uplift_pct,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SATROI_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

/// Parse a comma-separated list of store IDs, ignoring blank entries.
///
/// # Errors
///
/// Returns a human-readable reason if any entry is not an integer or the
/// list is empty.
pub fn parse_shop_ids(raw: &str) -> Result<Vec<i64>, String> {
    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|e| format!("'{s}' is not a store id: {e}"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if ids.is_empty() {
        return Err("at least one store id is required".to_string());
    }
    Ok(ids)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
