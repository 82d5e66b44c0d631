//! Grid frequency models.
//!
//! Scoring only reads a frequency value; how that value is produced is kept
//! behind [`FrequencyModel`] so the tick driver can swap models without
//! touching the scoring function.

/// Nominal grid frequency (Hz).
pub const NOMINAL_FREQUENCY_HZ: f64 = 50.0;

/// Maximum excursion from nominal any model may report (Hz).
pub const MAX_DEVIATION_HZ: f64 = 2.5;

/// Produces a grid frequency from the current supply/demand balance.
pub trait FrequencyModel {
    /// Frequency in Hz for the given aggregate supply and demand (MW).
    fn frequency_hz(&self, supply_mw: f64, demand_mw: f64) -> f64;

    /// Short identifier for logs and reports.
    fn name(&self) -> &'static str;
}

/// Frequency held at nominal regardless of balance.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConstantFrequency;

impl FrequencyModel for ConstantFrequency {
    fn frequency_hz(&self, _supply_mw: f64, _demand_mw: f64) -> f64 {
        NOMINAL_FREQUENCY_HZ
    }

    fn name(&self) -> &'static str {
        "constant"
    }
}

/// Linear droop: frequency rises with oversupply and sags with undersupply.
///
/// `f = 50 + gain * (supply - demand) / max(demand, 1)`, clamped to
/// `50 ± MAX_DEVIATION_HZ`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DroopFrequency {
    /// Hz per unit of relative imbalance.
    pub gain_hz: f64,
}

impl DroopFrequency {
    pub const DEFAULT_GAIN_HZ: f64 = 1.0;

    pub fn new(gain_hz: f64) -> Self {
        let gain_hz = if gain_hz.is_finite() { gain_hz.max(0.0) } else { 0.0 };
        Self { gain_hz }
    }
}

impl Default for DroopFrequency {
    fn default() -> Self {
        Self::new(Self::DEFAULT_GAIN_HZ)
    }
}

impl FrequencyModel for DroopFrequency {
    fn frequency_hz(&self, supply_mw: f64, demand_mw: f64) -> f64 {
        let imbalance = (supply_mw - demand_mw) / demand_mw.max(1.0);
        let deviation = (self.gain_hz * imbalance).clamp(-MAX_DEVIATION_HZ, MAX_DEVIATION_HZ);
        if deviation.is_finite() {
            NOMINAL_FREQUENCY_HZ + deviation
        } else {
            NOMINAL_FREQUENCY_HZ
        }
    }

    fn name(&self) -> &'static str {
        "droop"
    }
}

/// Runtime-selected frequency model, for callers that pick the model from
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridFrequency {
    Constant(ConstantFrequency),
    Droop(DroopFrequency),
}

impl Default for GridFrequency {
    fn default() -> Self {
        Self::Constant(ConstantFrequency)
    }
}

impl FrequencyModel for GridFrequency {
    fn frequency_hz(&self, supply_mw: f64, demand_mw: f64) -> f64 {
        match self {
            Self::Constant(m) => m.frequency_hz(supply_mw, demand_mw),
            Self::Droop(m) => m.frequency_hz(supply_mw, demand_mw),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Constant(m) => m.name(),
            Self::Droop(m) => m.name(),
        }
    }
}
