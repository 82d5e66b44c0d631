use std::f64::consts::PI;

use crate::devices::types::{Device, DeviceContext};
use crate::sim::clock::MINUTES_PER_DAY;

/// Fraction of wind nameplate available at a given minute of the day.
///
/// `0.6 + 0.4 * sin(2π * minutes / 1440)`, always within `[0.2, 1.0]`.
pub fn wind_fraction(minutes_since_midnight: u32) -> f64 {
    let phase = 2.0 * PI * f64::from(minutes_since_midnight) / f64::from(MINUTES_PER_DAY);
    0.6 + 0.4 * phase.sin()
}

/// A wind farm with a deterministic daily variability curve.
#[derive(Debug, Clone, Copy)]
pub struct WindFarm {
    /// Rated output in MW.
    pub nameplate_mw: f64,
}

impl WindFarm {
    /// Creates a wind farm. Negative nameplate is clamped to zero.
    pub fn new(nameplate_mw: f64) -> Self {
        Self {
            nameplate_mw: nameplate_mw.max(0.0),
        }
    }
}

impl Device for WindFarm {
    fn power_mw(&self, context: &DeviceContext) -> f64 {
        (self.nameplate_mw * wind_fraction(context.time.minutes_since_midnight())).round()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::clock::SimTime;

    #[test]
    fn midnight_is_sixty_percent() {
        assert!((wind_fraction(0) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn peaks_at_six_and_troughs_at_eighteen() {
        assert!((wind_fraction(6 * 60) - 1.0).abs() < 1e-12);
        assert!((wind_fraction(18 * 60) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn output_at_six_equals_nameplate() {
        let farm = WindFarm::new(75.0);
        let ctx = DeviceContext::new(SimTime::new(6, 0));
        assert_eq!(farm.power_mw(&ctx), 75.0);
    }

    #[test]
    fn same_time_same_output() {
        let farm = WindFarm::new(150.0);
        let ctx = DeviceContext::new(SimTime::new(13, 45));
        assert_eq!(farm.power_mw(&ctx), farm.power_mw(&ctx));
    }
}
