use serde::Serialize;

use crate::devices::types::{Device, DeviceContext};
use crate::sim::clock::SimTime;
use crate::sim::types::DemandProfile;

pub const RESIDENTIAL_BASE_MW: f64 = 120.0;
pub const COMMERCIAL_BASE_MW: f64 = 85.0;
pub const INDUSTRIAL_BASE_MW: f64 = 180.0;

/// Consumer sector with its own daily load shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sector {
    Residential,
    Commercial,
    Industrial,
}

impl Sector {
    /// Piecewise time-of-day multiplier applied to the sector base load.
    pub fn multiplier(self, time_of_day: f64) -> f64 {
        match self {
            // Morning bump, daytime lull, evening peak.
            Self::Residential => {
                if time_of_day < 6.0 {
                    0.6
                } else if time_of_day < 9.0 {
                    0.8
                } else if time_of_day < 17.0 {
                    0.7
                } else if time_of_day < 22.0 {
                    1.2
                } else {
                    0.8
                }
            }
            Self::Commercial => {
                if time_of_day < 8.0 {
                    0.4
                } else if time_of_day < 18.0 {
                    1.0
                } else {
                    0.3
                }
            }
            Self::Industrial => {
                if time_of_day < 6.0 {
                    0.9
                } else if time_of_day < 22.0 {
                    1.0
                } else {
                    0.8
                }
            }
        }
    }
}

/// Load of one sector: base MW shaped by time of day and reduced by DSM.
#[derive(Debug, Clone, Copy)]
pub struct SectorLoad {
    pub sector: Sector,
    pub base_mw: f64,
}

impl SectorLoad {
    pub fn new(sector: Sector, base_mw: f64) -> Self {
        Self {
            sector,
            base_mw: base_mw.max(0.0),
        }
    }
}

impl Device for SectorLoad {
    fn power_mw(&self, context: &DeviceContext) -> f64 {
        let shaped = self.base_mw * self.sector.multiplier(context.time.time_of_day());
        (shaped * context.dsm_factor()).round().max(0.0)
    }
}

/// Demand for all three sectors.
#[derive(Debug, Clone, Copy)]
pub struct DemandModel {
    pub residential: SectorLoad,
    pub commercial: SectorLoad,
    pub industrial: SectorLoad,
}

impl DemandModel {
    pub fn new(residential_mw: f64, commercial_mw: f64, industrial_mw: f64) -> Self {
        Self {
            residential: SectorLoad::new(Sector::Residential, residential_mw),
            commercial: SectorLoad::new(Sector::Commercial, commercial_mw),
            industrial: SectorLoad::new(Sector::Industrial, industrial_mw),
        }
    }

    /// Sector demand at `time` with a uniform `dsm_pct` reduction.
    pub fn profile(&self, time: SimTime, dsm_pct: f64) -> DemandProfile {
        let ctx = DeviceContext::with_dsm(time, dsm_pct);
        DemandProfile {
            residential: self.residential.power_mw(&ctx),
            commercial: self.commercial.power_mw(&ctx),
            industrial: self.industrial.power_mw(&ctx),
        }
    }
}

impl Default for DemandModel {
    fn default() -> Self {
        Self::new(RESIDENTIAL_BASE_MW, COMMERCIAL_BASE_MW, INDUSTRIAL_BASE_MW)
    }
}
