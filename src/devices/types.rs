//! Common types and traits for time-driven grid components.

use crate::sim::clock::SimTime;

/// Contextual information passed to devices during power calculations.
///
/// # Fields
/// * `time` - Current simulated time of day
/// * `dsm_pct` - Demand-side management reduction in percent (loads only)
#[derive(Debug, Clone, Copy)]
pub struct DeviceContext {
    pub time: SimTime,
    pub dsm_pct: f64,
}

impl DeviceContext {
    /// Creates a context at `time` with no DSM reduction.
    pub fn new(time: SimTime) -> Self {
        Self { time, dsm_pct: 0.0 }
    }

    /// Creates a context at `time` with the given DSM level.
    pub fn with_dsm(time: SimTime, dsm_pct: f64) -> Self {
        Self { time, dsm_pct }
    }

    /// The uniform demand multiplier `1 - dsm / 100`.
    pub fn dsm_factor(&self) -> f64 {
        1.0 - self.dsm_pct / 100.0
    }
}

/// A grid component whose output depends only on simulated time.
///
/// Implementations are deterministic: the same context always yields the
/// same power, which the optimizer relies on to compare candidates.
pub trait Device {
    /// Returns the power in MW for the given context.
    ///
    /// Generators return supply as positive values; loads return demand as
    /// positive values; the battery is signed (negative while charging).
    fn power_mw(&self, context: &DeviceContext) -> f64;
}
