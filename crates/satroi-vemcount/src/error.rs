use satroi_core::Metric;
use thiserror::Error;

/// Errors returned by the Vemcount KPI client.
#[derive(Debug, Error)]
pub enum VemcountError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("unexpected HTTP status {status} from KPI API: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The response body was not valid JSON.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The query was rejected before any request was sent.
    #[error("invalid KPI query: {0}")]
    InvalidQuery(String),
}

/// The raw KPI response does not have the structure the normalizer relies on.
///
/// This means the upstream data contract changed; it is never recovered
/// locally.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("expected a JSON object at {path}, found {found}")]
    NotAnObject { path: String, found: &'static str },

    #[error("store key '{0}' is not an integer store id")]
    InvalidStoreId(String),

    #[error("store {store_id}: 'dates' must be an object, found {found}")]
    MalformedDates { store_id: i64, found: &'static str },

    #[error("store {store_id}, day '{day_key}': expected an object, found {found}")]
    MalformedDay {
        store_id: i64,
        day_key: String,
        found: &'static str,
    },

    #[error("store {store_id}, day '{day_key}': {metric} is too large to represent")]
    NumericOutOfRange {
        store_id: i64,
        day_key: String,
        metric: Metric,
    },
}
