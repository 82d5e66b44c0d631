//! Core grid types: generation mix, demand, tariffs, and the control surface.

use std::fmt;

use serde::Serialize;

use crate::devices::{Battery, BatteryMode, DemandModel, Device, DeviceContext, SolarFarm, WindFarm};

use super::clock::SimTime;

/// Inclusive bounds and step size for one control parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl ParamRange {
    pub const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// Clamps `value` into range. Non-finite input falls back to `min`.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_finite() {
            value.clamp(self.min, self.max)
        } else {
            self.min
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }

    /// Moves `value` one step in `direction` (sign only) and clamps.
    ///
    /// A zero or NaN direction leaves the (clamped) value where it is.
    pub fn step_from(&self, value: f64, direction: f64) -> f64 {
        if direction == 0.0 || direction.is_nan() {
            return self.clamp(value);
        }
        self.clamp(value + direction.signum() * self.step)
    }
}

pub const COAL_RANGE: ParamRange = ParamRange::new(0.0, 500.0, 10.0);
pub const GAS_RANGE: ParamRange = ParamRange::new(0.0, 300.0, 10.0);
pub const HYDRO_RANGE: ParamRange = ParamRange::new(0.0, 200.0, 5.0);
pub const SOLAR_RANGE: ParamRange = ParamRange::new(0.0, 200.0, 5.0);
pub const WIND_RANGE: ParamRange = ParamRange::new(0.0, 150.0, 5.0);
pub const BATTERY_RANGE: ParamRange = ParamRange::new(0.0, 100.0, 5.0);
pub const DSM_RANGE: ParamRange = ParamRange::new(0.0, 20.0, 1.0);
pub const RESIDENTIAL_TARIFF_RANGE: ParamRange = ParamRange::new(3.0, 7.0, 0.1);
pub const COMMERCIAL_TARIFF_RANGE: ParamRange = ParamRange::new(4.0, 8.0, 0.1);
pub const INDUSTRIAL_TARIFF_RANGE: ParamRange = ParamRange::new(4.0, 8.0, 0.1);

/// A generation source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Coal,
    Gas,
    Hydro,
    Solar,
    Wind,
    Battery,
}

impl Source {
    pub const ALL: [Self; 6] = [
        Self::Coal,
        Self::Gas,
        Self::Hydro,
        Self::Solar,
        Self::Wind,
        Self::Battery,
    ];

    /// Maximum output magnitude in MW.
    pub fn max_mw(self) -> f64 {
        match self {
            Self::Coal => COAL_RANGE.max,
            Self::Gas => GAS_RANGE.max,
            Self::Hydro => HYDRO_RANGE.max,
            Self::Solar => SOLAR_RANGE.max,
            Self::Wind => WIND_RANGE.max,
            Self::Battery => BATTERY_RANGE.max,
        }
    }

    pub fn is_renewable(self) -> bool {
        matches!(self, Self::Hydro | Self::Solar | Self::Wind)
    }
}

/// Instantaneous output of every source in MW.
///
/// `battery` is signed: positive = discharging (supply), negative = charging.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct GenerationMix {
    pub coal: f64,
    pub gas: f64,
    pub hydro: f64,
    pub solar: f64,
    pub wind: f64,
    pub battery: f64,
}

impl GenerationMix {
    pub fn get(&self, source: Source) -> f64 {
        match source {
            Source::Coal => self.coal,
            Source::Gas => self.gas,
            Source::Hydro => self.hydro,
            Source::Solar => self.solar,
            Source::Wind => self.wind,
            Source::Battery => self.battery,
        }
    }

    /// `(source, MW)` pairs in a fixed order.
    pub fn iter(&self) -> impl Iterator<Item = (Source, f64)> + '_ {
        Source::ALL.into_iter().map(|s| (s, self.get(s)))
    }

    /// Clamps every source magnitude to its maximum, keeping the battery sign.
    pub fn clamped(self) -> Self {
        let bound = |v: f64, s: Source| {
            if v.is_finite() {
                v.clamp(-s.max_mw(), s.max_mw())
            } else {
                0.0
            }
        };
        Self {
            coal: bound(self.coal, Source::Coal).max(0.0),
            gas: bound(self.gas, Source::Gas).max(0.0),
            hydro: bound(self.hydro, Source::Hydro).max(0.0),
            solar: bound(self.solar, Source::Solar).max(0.0),
            wind: bound(self.wind, Source::Wind).max(0.0),
            battery: bound(self.battery, Source::Battery),
        }
    }
}

/// Sector demand in MW.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DemandProfile {
    pub residential: f64,
    pub commercial: f64,
    pub industrial: f64,
}

impl DemandProfile {
    pub fn total(&self) -> f64 {
        self.residential + self.commercial + self.industrial
    }
}

/// Per-sector tariffs in currency per kWh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TariffSet {
    pub residential: f64,
    pub commercial: f64,
    pub industrial: f64,
}

impl TariffSet {
    pub fn average(&self) -> f64 {
        (self.residential + self.commercial + self.industrial) / 3.0
    }

    pub fn clamped(self) -> Self {
        Self {
            residential: RESIDENTIAL_TARIFF_RANGE.clamp(self.residential),
            commercial: COMMERCIAL_TARIFF_RANGE.clamp(self.commercial),
            industrial: INDUSTRIAL_TARIFF_RANGE.clamp(self.industrial),
        }
    }
}

impl Default for TariffSet {
    fn default() -> Self {
        Self {
            residential: 4.5,
            commercial: 6.2,
            industrial: 5.8,
        }
    }
}

/// Everything the scoring function needs for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridSnapshot {
    pub generation: GenerationMix,
    pub demand: DemandProfile,
    /// Demand-side management level, percent in `[0, 20]`.
    pub dsm: f64,
    pub tariffs: TariffSet,
    /// Grid frequency in Hz.
    pub frequency: f64,
}

/// The user/optimizer-owned control surface.
///
/// A plain value type: every edit produces a new value, so search candidates
/// are independent copies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControlSettings {
    pub coal: f64,
    pub gas: f64,
    pub hydro: f64,
    /// Solar nameplate (MW), derated by time of day.
    pub solar_nameplate: f64,
    /// Wind nameplate (MW), derated by time of day.
    pub wind_nameplate: f64,
    /// Battery power magnitude (MW).
    pub battery_power: f64,
    pub battery_mode: BatteryMode,
    pub dsm: f64,
    pub tariffs: TariffSet,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            coal: 250.0,
            gas: 180.0,
            hydro: 120.0,
            solar_nameplate: 90.0,
            wind_nameplate: 75.0,
            battery_power: 50.0,
            battery_mode: BatteryMode::Discharging,
            dsm: 10.0,
            tariffs: TariffSet::default(),
        }
    }
}

impl ControlSettings {
    /// Returns a copy with every field clamped into its range.
    pub fn clamped(self) -> Self {
        Self {
            coal: COAL_RANGE.clamp(self.coal),
            gas: GAS_RANGE.clamp(self.gas),
            hydro: HYDRO_RANGE.clamp(self.hydro),
            solar_nameplate: SOLAR_RANGE.clamp(self.solar_nameplate),
            wind_nameplate: WIND_RANGE.clamp(self.wind_nameplate),
            battery_power: BATTERY_RANGE.clamp(self.battery_power),
            battery_mode: self.battery_mode,
            dsm: DSM_RANGE.clamp(self.dsm),
            tariffs: self.tariffs.clamped(),
        }
    }

    /// Applies a single control update, clamping the new value.
    pub fn apply(self, update: ControlUpdate) -> Self {
        let mut next = self;
        match update {
            ControlUpdate::Coal(v) => next.coal = COAL_RANGE.clamp(v),
            ControlUpdate::Gas(v) => next.gas = GAS_RANGE.clamp(v),
            ControlUpdate::Hydro(v) => next.hydro = HYDRO_RANGE.clamp(v),
            ControlUpdate::SolarNameplate(v) => next.solar_nameplate = SOLAR_RANGE.clamp(v),
            ControlUpdate::WindNameplate(v) => next.wind_nameplate = WIND_RANGE.clamp(v),
            ControlUpdate::BatteryPower(v) => next.battery_power = BATTERY_RANGE.clamp(v),
            ControlUpdate::BatteryMode(mode) => next.battery_mode = mode,
            ControlUpdate::ToggleBatteryMode => next.battery_mode = self.battery_mode.flipped(),
            ControlUpdate::Dsm(v) => next.dsm = DSM_RANGE.clamp(v),
            ControlUpdate::ResidentialTariff(v) => {
                next.tariffs.residential = RESIDENTIAL_TARIFF_RANGE.clamp(v);
            }
            ControlUpdate::CommercialTariff(v) => {
                next.tariffs.commercial = COMMERCIAL_TARIFF_RANGE.clamp(v);
            }
            ControlUpdate::IndustrialTariff(v) => {
                next.tariffs.industrial = INDUSTRIAL_TARIFF_RANGE.clamp(v);
            }
        }
        next
    }

    /// Generation at `time`: dispatchable levels as set, solar and wind
    /// derated by time of day, battery signed by mode.
    pub fn generation_at(&self, time: SimTime) -> GenerationMix {
        let ctx = DeviceContext::new(time);
        GenerationMix {
            coal: self.coal,
            gas: self.gas,
            hydro: self.hydro,
            solar: SolarFarm::new(self.solar_nameplate).power_mw(&ctx),
            wind: WindFarm::new(self.wind_nameplate).power_mw(&ctx),
            battery: Battery::new(self.battery_power, self.battery_mode).power_mw(&ctx),
        }
    }

    /// Full scoring input at `time` for the given demand model and frequency.
    pub fn snapshot(&self, time: SimTime, demand: &DemandModel, frequency: f64) -> GridSnapshot {
        GridSnapshot {
            generation: self.generation_at(time),
            demand: demand.profile(time, self.dsm),
            dsm: self.dsm,
            tariffs: self.tariffs,
            frequency,
        }
    }
}

/// A single edit to the control surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlUpdate {
    Coal(f64),
    Gas(f64),
    Hydro(f64),
    SolarNameplate(f64),
    WindNameplate(f64),
    BatteryPower(f64),
    BatteryMode(BatteryMode),
    ToggleBatteryMode,
    Dsm(f64),
    ResidentialTariff(f64),
    CommercialTariff(f64),
    IndustrialTariff(f64),
}

impl fmt::Display for ControlSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "coal={:.0} gas={:.0} hydro={:.0} solar={:.0} wind={:.0} MW | \
             battery={:.0} MW ({}) | dsm={:.1}% | tariffs={:.2}/{:.2}/{:.2}",
            self.coal,
            self.gas,
            self.hydro,
            self.solar_nameplate,
            self.wind_nameplate,
            self.battery_power,
            self.battery_mode,
            self.dsm,
            self.tariffs.residential,
            self.tariffs.commercial,
            self.tariffs.industrial,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_range_clamps_and_sanitizes() {
        assert_eq!(COAL_RANGE.clamp(600.0), 500.0);
        assert_eq!(COAL_RANGE.clamp(-5.0), 0.0);
        assert_eq!(COAL_RANGE.clamp(f64::NAN), 0.0);
        assert_eq!(RESIDENTIAL_TARIFF_RANGE.clamp(f64::INFINITY), 3.0);
    }

    #[test]
    fn step_from_respects_bounds() {
        assert_eq!(DSM_RANGE.step_from(20.0, 1.0), 20.0);
        assert_eq!(DSM_RANGE.step_from(0.0, -1.0), 0.0);
        assert_eq!(HYDRO_RANGE.step_from(100.0, 1.0), 105.0);
    }

    #[test]
    fn step_from_zero_direction_holds() {
        assert_eq!(DSM_RANGE.step_from(10.0, 0.0), 10.0);
        assert_eq!(DSM_RANGE.step_from(10.0, -0.0), 10.0);
        assert_eq!(DSM_RANGE.step_from(10.0, f64::NAN), 10.0);
        assert_eq!(DSM_RANGE.step_from(10.0, -3.0), 9.0);
    }

    #[test]
    fn generation_mix_clamp_keeps_battery_sign() {
        let mix = GenerationMix {
            coal: 900.0,
            battery: -250.0,
            ..GenerationMix::default()
        }
        .clamped();
        assert_eq!(mix.coal, 500.0);
        assert_eq!(mix.battery, -100.0);
    }

    #[test]
    fn tariff_average() {
        let t = TariffSet::default();
        assert!((t.average() - 5.5).abs() < 1e-12);
    }

    #[test]
    fn apply_clamps_out_of_range_values() {
        let s = ControlSettings::default()
            .apply(ControlUpdate::Dsm(45.0))
            .apply(ControlUpdate::CommercialTariff(1.0));
        assert_eq!(s.dsm, 20.0);
        assert_eq!(s.tariffs.commercial, 4.0);
    }

    #[test]
    fn toggle_battery_mode_flips() {
        let s = ControlSettings::default();
        let toggled = s.apply(ControlUpdate::ToggleBatteryMode);
        assert_eq!(toggled.battery_mode, BatteryMode::Charging);
        assert_eq!(s.battery_mode, BatteryMode::Discharging);
    }

    #[test]
    fn generation_at_derates_solar_at_night() {
        let s = ControlSettings::default();
        let night = s.generation_at(SimTime::new(2, 0));
        assert_eq!(night.solar, 0.0);
        assert_eq!(night.coal, 250.0);
        assert_eq!(night.battery, 50.0);
    }

    #[test]
    fn charging_battery_is_negative() {
        let s = ControlSettings::default().apply(ControlUpdate::BatteryMode(BatteryMode::Charging));
        assert_eq!(s.generation_at(SimTime::new(12, 0)).battery, -50.0);
    }

    #[test]
    fn renewable_sources() {
        let renewables: Vec<Source> = Source::ALL.into_iter().filter(|s| s.is_renewable()).collect();
        assert_eq!(renewables, vec![Source::Hydro, Source::Solar, Source::Wind]);
    }
}
