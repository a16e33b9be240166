use rust_decimal::Decimal;
use thiserror::Error;

/// Contract violations that stop a simulation.
///
/// "No Saturday data" is not one of these: it comes back as a report with
/// no results.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimulationError {
    #[error(
        "KPI table has no average transaction value column; request \
         sales_per_transaction from the API or derive ATV from conversion"
    )]
    MissingAtvColumn,

    #[error("uplift percentage must not be negative, got {0}")]
    NegativeUplift(Decimal),

    /// A per-record or per-store amount left the range `Decimal` can hold.
    #[error("turnover for store {store_id} exceeds the representable range")]
    Overflow { store_id: i64 },
}
