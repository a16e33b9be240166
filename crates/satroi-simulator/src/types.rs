use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Where the simulator takes the average transaction value from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AtvSource {
    /// The ATV column reported by the KPI feed.
    #[default]
    Reported,
    /// `turnover / (footfall × conversion_rate)` per record.
    Derived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationOptions {
    /// Percentage points added to the Saturday conversion rate.
    pub uplift_pct: Decimal,
    pub atv_source: AtvSource,
}

impl SimulationOptions {
    #[must_use]
    pub fn new(uplift_pct: Decimal) -> Self {
        Self {
            uplift_pct,
            atv_source: AtvSource::default(),
        }
    }

    #[must_use]
    pub fn with_atv_source(mut self, atv_source: AtvSource) -> Self {
        self.atv_source = atv_source;
        self
    }
}

/// Growth of a store's Saturday turnover, or the explicit marker that it
/// cannot be computed because the baseline is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GrowthPct {
    Computed(Decimal),
    NotComputable,
}

impl GrowthPct {
    #[must_use]
    pub fn value(self) -> Option<Decimal> {
        match self {
            GrowthPct::Computed(v) => Some(v),
            GrowthPct::NotComputable => None,
        }
    }
}

impl std::fmt::Display for GrowthPct {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrowthPct::Computed(v) => write!(f, "{:.2}%", v.round_dp(2)),
            GrowthPct::NotComputable => write!(f, "n/a"),
        }
    }
}

/// Simulated Saturday outcome for one store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSimulationResult {
    pub store_id: i64,
    pub store_name: Option<String>,
    /// Actual Saturday turnover over the period.
    pub baseline_turnover: Decimal,
    pub projected_extra_turnover: Decimal,
    pub projected_total_turnover: Decimal,
    pub growth_pct: GrowthPct,
}

/// Output of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub uplift_pct: Decimal,
    pub atv_source: AtvSource,
    /// Records that fell on a Saturday and were aggregated.
    pub saturday_records: usize,
    /// Records dropped because their date could not be resolved.
    pub unresolved_dates: usize,
    /// Saturday records whose ATV was unknown and so added no extra turnover.
    pub unknown_atv_records: usize,
    /// One entry per store, ascending by `store_id`.
    pub results: Vec<StoreSimulationResult>,
}

impl SimulationReport {
    /// `true` when no Saturday data survived filtering.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Sum of every store's baseline, `None` if it does not fit in a
    /// `Decimal`.
    #[must_use]
    pub fn total_baseline_turnover(&self) -> Option<Decimal> {
        checked_sum(self.results.iter().map(|r| r.baseline_turnover))
    }

    /// Sum of every store's extra turnover, `None` on overflow.
    #[must_use]
    pub fn total_extra_turnover(&self) -> Option<Decimal> {
        checked_sum(self.results.iter().map(|r| r.projected_extra_turnover))
    }

    /// Portfolio-wide growth across every store in the report.
    #[must_use]
    pub fn total_growth_pct(&self) -> GrowthPct {
        match (self.total_extra_turnover(), self.total_baseline_turnover()) {
            (Some(extra), Some(baseline)) => growth_pct(extra, baseline),
            _ => GrowthPct::NotComputable,
        }
    }
}

fn checked_sum(mut values: impl Iterator<Item = Decimal>) -> Option<Decimal> {
    values.try_fold(Decimal::ZERO, Decimal::checked_add)
}

/// `extra / baseline × 100`, or [`GrowthPct::NotComputable`] when the
/// baseline is not positive or the ratio overflows.
#[must_use]
pub fn growth_pct(extra: Decimal, baseline: Decimal) -> GrowthPct {
    if baseline <= Decimal::ZERO {
        return GrowthPct::NotComputable;
    }
    extra
        .checked_div(baseline)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map_or(GrowthPct::NotComputable, GrowthPct::Computed)
}
