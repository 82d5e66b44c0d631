use std::f64::consts::PI;

use crate::devices::types::{Device, DeviceContext};

/// Hour of day at which solar output starts (inclusive).
pub const SUNRISE_HOUR: f64 = 6.0;
/// Hour of day at which solar output stops (exclusive).
pub const SUNSET_HOUR: f64 = 18.0;

/// Fraction of solar nameplate available at a fractional hour of day.
///
/// Zero outside `[06:00, 18:00)`; inside, a half-sine peaking at 1.0 at noon.
pub fn solar_fraction(time_of_day: f64) -> f64 {
    if !(SUNRISE_HOUR..SUNSET_HOUR).contains(&time_of_day) {
        return 0.0;
    }
    ((time_of_day - SUNRISE_HOUR) * PI / 12.0).sin().max(0.0)
}

/// A solar farm whose output follows a fixed daylight curve.
///
/// No weather noise: output is a pure function of time of day, rounded to
/// the nearest whole MW.
#[derive(Debug, Clone, Copy)]
pub struct SolarFarm {
    /// Rated output in MW.
    pub nameplate_mw: f64,
}

impl SolarFarm {
    /// Creates a solar farm. Negative nameplate is clamped to zero.
    pub fn new(nameplate_mw: f64) -> Self {
        Self {
            nameplate_mw: nameplate_mw.max(0.0),
        }
    }
}

impl Device for SolarFarm {
    fn power_mw(&self, context: &DeviceContext) -> f64 {
        (self.nameplate_mw * solar_fraction(context.time.time_of_day())).round()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::clock::SimTime;

    fn ctx(hour: u32, minute: u32) -> DeviceContext {
        DeviceContext::new(SimTime::new(hour, minute))
    }

    #[test]
    fn no_generation_at_night() {
        let pv = SolarFarm::new(200.0);
        for h in [0, 3, 5, 18, 21, 23] {
            assert_eq!(pv.power_mw(&ctx(h, 0)), 0.0, "hour {h}");
        }
        assert_eq!(pv.power_mw(&ctx(5, 45)), 0.0);
    }

    #[test]
    fn peak_at_noon_equals_nameplate() {
        let pv = SolarFarm::new(90.0);
        assert_eq!(pv.power_mw(&ctx(12, 0)), 90.0);
    }

    #[test]
    fn curve_is_symmetric_around_noon() {
        assert!((solar_fraction(9.0) - solar_fraction(15.0)).abs() < 1e-12);
        assert!((solar_fraction(7.25) - solar_fraction(16.75)).abs() < 1e-12);
    }

    #[test]
    fn sunrise_edge_is_zero() {
        assert_eq!(solar_fraction(6.0), 0.0);
        assert!(solar_fraction(6.25) > 0.0);
    }

    #[test]
    fn output_is_rounded() {
        let pv = SolarFarm::new(90.0);
        let out = pv.power_mw(&ctx(8, 15));
        assert_eq!(out, out.round());
    }

    #[test]
    fn negative_nameplate_clamped_to_zero() {
        assert_eq!(SolarFarm::new(-10.0).nameplate_mw, 0.0);
    }
}
