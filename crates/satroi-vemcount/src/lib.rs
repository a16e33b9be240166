pub mod client;
pub mod error;
pub mod normalize;
pub(crate) mod retry;
pub mod types;

pub use client::VemcountClient;
pub use error::{SchemaError, VemcountError};
pub use normalize::{detect_shape, normalize_kpi_response, RawShape};
pub use types::{KpiQuery, KpiRequest, Step};
