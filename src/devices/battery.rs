use std::fmt;

use serde::Serialize;

use crate::devices::types::{Device, DeviceContext};

/// Battery operating direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryMode {
    /// Supplying power to the grid.
    #[default]
    Discharging,
    /// Drawing power from the grid.
    Charging,
}

impl BatteryMode {
    pub fn flipped(self) -> Self {
        match self {
            Self::Discharging => Self::Charging,
            Self::Charging => Self::Discharging,
        }
    }

    pub fn from_charging(charging: bool) -> Self {
        if charging {
            Self::Charging
        } else {
            Self::Discharging
        }
    }

    pub fn is_charging(self) -> bool {
        self == Self::Charging
    }
}

impl fmt::Display for BatteryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discharging => write!(f, "discharging"),
            Self::Charging => write!(f, "charging"),
        }
    }
}

/// Grid battery with a fixed power magnitude and direction.
///
/// No state of charge is tracked; output is the signed setpoint.
#[derive(Debug, Clone, Copy)]
pub struct Battery {
    /// Power magnitude in MW.
    pub power_mw: f64,
    pub mode: BatteryMode,
}

impl Battery {
    pub fn new(power_mw: f64, mode: BatteryMode) -> Self {
        Self {
            power_mw: power_mw.abs(),
            mode,
        }
    }
}

impl Device for Battery {
    /// Positive while discharging, negative while charging.
    fn power_mw(&self, _context: &DeviceContext) -> f64 {
        match self.mode {
            BatteryMode::Discharging => self.power_mw,
            BatteryMode::Charging => -self.power_mw,
        }
    }
}
