//! Saturday conversion-uplift simulation over normalized KPI tables.

pub mod error;
pub mod names;
pub mod simulate;
pub mod types;

pub use error::SimulationError;
pub use names::StoreNames;
pub use simulate::{simulate, simulate_with_names};
pub use types::{AtvSource, GrowthPct, SimulationOptions, SimulationReport, StoreSimulationResult};
