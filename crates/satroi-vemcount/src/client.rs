//! HTTP client for the Vemcount KPI report endpoint.
//!
//! Posts a [`KpiRequest`] and hands back the raw JSON tree. Flattening the
//! tree is [`crate::normalize`]'s job, not the client's.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::VemcountError;
use crate::retry::retry_with_backoff;
use crate::types::{KpiQuery, KpiRequest};

/// Longest response body excerpt carried in [`VemcountError::UnexpectedStatus`].
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Client for the Vemcount KPI report endpoint.
pub struct VemcountClient {
    client: Client,
    endpoint: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl VemcountClient {
    /// Creates a client posting to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`VemcountError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`VemcountError::InvalidQuery`] if
    /// `endpoint` is not a valid URL.
    pub fn new(
        endpoint: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, VemcountError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let endpoint = Url::parse(endpoint.trim()).map_err(|e| {
            VemcountError::InvalidQuery(format!("invalid KPI endpoint URL: {e}"))
        })?;

        Ok(Self {
            client,
            endpoint,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Builds a client from application config.
    ///
    /// # Errors
    ///
    /// Returns [`VemcountError::InvalidQuery`] when no endpoint is
    /// configured, otherwise the same errors as [`VemcountClient::new`].
    pub fn from_config(config: &satroi_core::AppConfig) -> Result<Self, VemcountError> {
        let endpoint = config
            .require_api_url()
            .map_err(|e| VemcountError::InvalidQuery(e.to_string()))?;
        Self::new(
            endpoint,
            config.request_timeout_secs,
            &config.user_agent,
            config.max_retries,
            config.retry_backoff_base_ms,
        )
    }

    /// Fetches the raw per-shop, per-day KPI tree for `query`.
    ///
    /// Transient failures are retried with back-off.
    ///
    /// # Errors
    ///
    /// - [`VemcountError::InvalidQuery`] if the query fails validation.
    /// - [`VemcountError::UnexpectedStatus`] on a non-2xx response.
    /// - [`VemcountError::Http`] on network failure.
    /// - [`VemcountError::Deserialize`] if the body is not JSON.
    pub async fn fetch_kpis(&self, query: &KpiQuery) -> Result<serde_json::Value, VemcountError> {
        query.validate()?;
        let body = KpiRequest::from(query);

        tracing::info!(
            shops = query.shop_ids.len(),
            start = %query.start,
            end = %query.end,
            step = %query.step,
            "fetching KPI report"
        );

        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.post_json(&body)
        })
        .await
    }

    async fn post_json(&self, body: &KpiRequest) -> Result<serde_json::Value, VemcountError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(VemcountError::UnexpectedStatus {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        tracing::debug!(status = status.as_u16(), bytes = text.len(), "KPI report received");

        serde_json::from_str(&text).map_err(|e| VemcountError::Deserialize {
            context: format!("KPI report from {}", self.endpoint.path()),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_invalid_endpoint() {
        let result = VemcountClient::new("not a url", 5, "satroi-test/0.1", 0, 0);
        assert!(matches!(result, Err(VemcountError::InvalidQuery(_))));
    }

    #[test]
    fn new_accepts_endpoint_with_whitespace() {
        let client = VemcountClient::new(" https://kpi.example.com/report ", 5, "t", 0, 0)
            .expect("client construction should not fail");
        assert_eq!(client.endpoint.as_str(), "https://kpi.example.com/report");
    }
}
