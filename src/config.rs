//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::devices::{
    BatteryMode, DemandModel,
    demand::{COMMERCIAL_BASE_MW, INDUSTRIAL_BASE_MW, RESIDENTIAL_BASE_MW},
};
use crate::error::{ConfigError, GridError, GridResult};
use crate::sim::clock::{PlaybackSpeed, SimTime, TICK_MINUTES};
use crate::sim::engine::Simulation;
use crate::sim::frequency::{ConstantFrequency, DroopFrequency, GridFrequency};
use crate::sim::optimizer::{Optimizer, OptimizerConfig};
use crate::sim::score::{BatteryAccounting, ScoringRules};
use crate::sim::types::{
    BATTERY_RANGE, COAL_RANGE, COMMERCIAL_TARIFF_RANGE, ControlSettings, DSM_RANGE, GAS_RANGE,
    HYDRO_RANGE, INDUSTRIAL_TARIFF_RANGE, ParamRange, RESIDENTIAL_TARIFF_RANGE, SOLAR_RANGE,
    TariffSet, WIND_RANGE,
};

/// Top-level scenario configuration parsed from TOML.
///
/// All sections are optional and default to the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Start time, run length, and model selection.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Dispatchable levels, renewable nameplates, and battery.
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Sector base loads.
    #[serde(default)]
    pub demand: DemandConfig,
    /// Demand-side management.
    #[serde(default)]
    pub dsm: DsmConfig,
    /// Sector tariffs.
    #[serde(default)]
    pub tariffs: TariffConfig,
    /// Annealing schedule.
    #[serde(default)]
    pub optimizer: OptimizerSection,
}

/// Start time, run length, and model selection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Start hour (0-23).
    pub start_hour: u32,
    /// Start minute (0, 15, 30 or 45).
    pub start_minute: u32,
    /// Ticks to run in batch mode (must be > 0).
    pub ticks: usize,
    /// Optimizer seed; unset means a fresh OS seed per run.
    pub seed: Option<u64>,
    /// Whether the tick driver starts playing.
    pub playing: bool,
    /// Playback speed multiplier: 1, 2 or 4.
    pub speed: u32,
    /// Frequency model: `"constant"` or `"droop"`.
    pub frequency_model: String,
    /// Droop gain in Hz per unit imbalance (used by `"droop"`).
    pub droop_gain_hz: f64,
    /// Battery supply accounting: `"magnitude"` or `"charging_as_load"`.
    pub battery_accounting: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start_hour: 8,
            start_minute: 0,
            ticks: 24,
            seed: None,
            playing: true,
            speed: 1,
            frequency_model: "constant".to_string(),
            droop_gain_hz: DroopFrequency::DEFAULT_GAIN_HZ,
            battery_accounting: "magnitude".to_string(),
        }
    }
}

/// Generation levels (MW).
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    pub coal: f64,
    pub gas: f64,
    pub hydro: f64,
    /// Solar nameplate, derated by time of day.
    pub solar: f64,
    /// Wind nameplate, derated by time of day.
    pub wind: f64,
    /// Battery power magnitude.
    pub battery_power: f64,
    /// `true` when the battery draws from the grid.
    pub battery_charging: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        let s = ControlSettings::default();
        Self {
            coal: s.coal,
            gas: s.gas,
            hydro: s.hydro,
            solar: s.solar_nameplate,
            wind: s.wind_nameplate,
            battery_power: s.battery_power,
            battery_charging: s.battery_mode.is_charging(),
        }
    }
}

/// Sector base loads (MW) before time-of-day shaping.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemandConfig {
    pub residential: f64,
    pub commercial: f64,
    pub industrial: f64,
}

impl Default for DemandConfig {
    fn default() -> Self {
        Self {
            residential: RESIDENTIAL_BASE_MW,
            commercial: COMMERCIAL_BASE_MW,
            industrial: INDUSTRIAL_BASE_MW,
        }
    }
}

/// Demand-side management.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DsmConfig {
    /// Percent reduction applied to every sector (0-20).
    pub level: f64,
}

impl Default for DsmConfig {
    fn default() -> Self {
        Self { level: 10.0 }
    }
}

/// Sector tariffs (currency per kWh).
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TariffConfig {
    pub residential: f64,
    pub commercial: f64,
    pub industrial: f64,
}

impl Default for TariffConfig {
    fn default() -> Self {
        let t = TariffSet::default();
        Self {
            residential: t.residential,
            commercial: t.commercial,
            industrial: t.industrial,
        }
    }
}

/// Annealing schedule.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizerSection {
    pub restarts: usize,
    pub iterations: usize,
    pub initial_temperature: f64,
    pub cooling_rate: f64,
    pub flip_probability: f64,
}

impl Default for OptimizerSection {
    fn default() -> Self {
        let c = OptimizerConfig::default();
        Self {
            restarts: c.restarts,
            iterations: c.iterations,
            initial_temperature: c.initial_temperature,
            cooling_rate: c.cooling_rate,
            flip_probability: c.flip_probability,
        }
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: mid-morning with a thermal-heavy mix.
    pub fn baseline() -> Self {
        Self::default()
    }

    /// Returns the evening-peak preset: 17:00 start with heavier thermal output.
    pub fn evening_peak() -> Self {
        Self {
            simulation: SimulationConfig {
                start_hour: 17,
                ..SimulationConfig::default()
            },
            generation: GenerationConfig {
                coal: 320.0,
                gas: 240.0,
                hydro: 150.0,
                solar: 40.0,
                wind: 90.0,
                battery_power: 80.0,
                battery_charging: false,
            },
            dsm: DsmConfig { level: 12.0 },
            tariffs: TariffConfig {
                residential: 5.2,
                commercial: 6.8,
                industrial: 6.2,
            },
            ..Self::default()
        }
    }

    /// Returns the renewable-heavy preset: maxed solar and wind, battery charging.
    pub fn renewable_heavy() -> Self {
        Self {
            simulation: SimulationConfig {
                start_hour: 11,
                ..SimulationConfig::default()
            },
            generation: GenerationConfig {
                coal: 80.0,
                gas: 60.0,
                hydro: 150.0,
                solar: 200.0,
                wind: 150.0,
                battery_power: 40.0,
                battery_charging: true,
            },
            dsm: DsmConfig { level: 8.0 },
            tariffs: TariffConfig {
                residential: 4.8,
                commercial: 6.0,
                industrial: 5.6,
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "evening_peak", "renewable_heavy"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        let cfg = match name {
            "baseline" => Self::baseline(),
            "evening_peak" => Self::evening_peak(),
            "renewable_heavy" => Self::renewable_heavy(),
            _ => {
                return Err(ConfigError::new(
                    "preset",
                    format!(
                        "unknown preset \"{name}\", available: {}",
                        Self::PRESETS.join(", ")
                    ),
                ));
            }
        };
        info!(preset = name, "scenario loaded");
        Ok(cfg)
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        let cfg = Self::from_toml_str(&content)?;
        info!(path = %path.display(), "scenario loaded");
        Ok(cfg)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if s.start_hour >= 24 {
            errors.push(ConfigError::new("simulation.start_hour", "must be in [0, 23]"));
        }
        if s.start_minute >= 60 || s.start_minute % TICK_MINUTES != 0 {
            errors.push(ConfigError::new(
                "simulation.start_minute",
                "must be one of 0, 15, 30, 45",
            ));
        }
        if s.ticks == 0 {
            errors.push(ConfigError::new("simulation.ticks", "must be > 0"));
        }
        if PlaybackSpeed::from_multiplier(s.speed).is_none() {
            errors.push(ConfigError::new(
                "simulation.speed",
                format!("must be 1, 2 or 4, got {}", s.speed),
            ));
        }
        if s.frequency_model != "constant" && s.frequency_model != "droop" {
            errors.push(ConfigError::new(
                "simulation.frequency_model",
                format!(
                    "must be \"constant\" or \"droop\", got \"{}\"",
                    s.frequency_model
                ),
            ));
        }
        if !(s.droop_gain_hz.is_finite() && s.droop_gain_hz >= 0.0) {
            errors.push(ConfigError::new("simulation.droop_gain_hz", "must be >= 0"));
        }
        if s.battery_accounting != "magnitude" && s.battery_accounting != "charging_as_load" {
            errors.push(ConfigError::new(
                "simulation.battery_accounting",
                format!(
                    "must be \"magnitude\" or \"charging_as_load\", got \"{}\"",
                    s.battery_accounting
                ),
            ));
        }

        let g = &self.generation;
        check_range(&mut errors, "generation.coal", g.coal, COAL_RANGE);
        check_range(&mut errors, "generation.gas", g.gas, GAS_RANGE);
        check_range(&mut errors, "generation.hydro", g.hydro, HYDRO_RANGE);
        check_range(&mut errors, "generation.solar", g.solar, SOLAR_RANGE);
        check_range(&mut errors, "generation.wind", g.wind, WIND_RANGE);
        check_range(&mut errors, "generation.battery_power", g.battery_power, BATTERY_RANGE);

        let d = &self.demand;
        for (field, value) in [
            ("demand.residential", d.residential),
            ("demand.commercial", d.commercial),
            ("demand.industrial", d.industrial),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                errors.push(ConfigError::new(field, "must be >= 0"));
            }
        }

        check_range(&mut errors, "dsm.level", self.dsm.level, DSM_RANGE);

        let t = &self.tariffs;
        check_range(&mut errors, "tariffs.residential", t.residential, RESIDENTIAL_TARIFF_RANGE);
        check_range(&mut errors, "tariffs.commercial", t.commercial, COMMERCIAL_TARIFF_RANGE);
        check_range(&mut errors, "tariffs.industrial", t.industrial, INDUSTRIAL_TARIFF_RANGE);

        let o = &self.optimizer;
        if o.restarts == 0 {
            errors.push(ConfigError::new("optimizer.restarts", "must be > 0"));
        }
        if !(o.initial_temperature.is_finite() && o.initial_temperature > 0.0) {
            errors.push(ConfigError::new("optimizer.initial_temperature", "must be > 0"));
        }
        if !(o.cooling_rate > 0.0 && o.cooling_rate <= 1.0) {
            errors.push(ConfigError::new("optimizer.cooling_rate", "must be in (0.0, 1.0]"));
        }
        if !(0.0..=1.0).contains(&o.flip_probability) {
            errors.push(ConfigError::new(
                "optimizer.flip_probability",
                "must be in [0.0, 1.0]",
            ));
        }

        errors
    }

    /// Returns `self` if valid, otherwise every validation error at once.
    pub fn validated(self) -> GridResult<Self> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(GridError::Config(errors))
        }
    }

    pub fn start_time(&self) -> SimTime {
        SimTime::new(self.simulation.start_hour, self.simulation.start_minute)
    }

    pub fn control_settings(&self) -> ControlSettings {
        let g = &self.generation;
        ControlSettings {
            coal: g.coal,
            gas: g.gas,
            hydro: g.hydro,
            solar_nameplate: g.solar,
            wind_nameplate: g.wind,
            battery_power: g.battery_power,
            battery_mode: BatteryMode::from_charging(g.battery_charging),
            dsm: self.dsm.level,
            tariffs: TariffSet {
                residential: self.tariffs.residential,
                commercial: self.tariffs.commercial,
                industrial: self.tariffs.industrial,
            },
        }
        .clamped()
    }

    pub fn demand_model(&self) -> DemandModel {
        DemandModel::new(
            self.demand.residential,
            self.demand.commercial,
            self.demand.industrial,
        )
    }

    pub fn scoring_rules(&self) -> ScoringRules {
        let accounting = match self.simulation.battery_accounting.as_str() {
            "charging_as_load" => BatteryAccounting::ChargingAsLoad,
            _ => BatteryAccounting::Magnitude,
        };
        ScoringRules::new(accounting)
    }

    pub fn frequency_model(&self) -> GridFrequency {
        match self.simulation.frequency_model.as_str() {
            "droop" => GridFrequency::Droop(DroopFrequency::new(self.simulation.droop_gain_hz)),
            _ => GridFrequency::Constant(ConstantFrequency),
        }
    }

    pub fn optimizer_config(&self) -> OptimizerConfig {
        let o = &self.optimizer;
        OptimizerConfig {
            restarts: o.restarts,
            iterations: o.iterations,
            initial_temperature: o.initial_temperature,
            cooling_rate: o.cooling_rate,
            flip_probability: o.flip_probability,
        }
    }

    /// Builds the tick driver described by this scenario.
    pub fn build_simulation(&self) -> Simulation<GridFrequency> {
        let mut sim = Simulation::with_models(
            self.control_settings(),
            self.demand_model(),
            self.scoring_rules(),
            self.frequency_model(),
            self.start_time(),
        );
        if !self.simulation.playing {
            sim.pause();
        }
        sim.set_speed(PlaybackSpeed::from_multiplier(self.simulation.speed).unwrap_or_default());
        sim
    }

    /// Builds an optimizer sharing this scenario's demand and scoring models.
    pub fn build_optimizer(&self) -> Optimizer {
        let optimizer = Optimizer::new(self.optimizer_config())
            .with_demand_model(self.demand_model())
            .with_rules(self.scoring_rules());
        match self.simulation.seed {
            Some(seed) => optimizer.with_seed(seed),
            None => optimizer,
        }
    }
}

fn check_range(errors: &mut Vec<ConfigError>, field: &str, value: f64, range: ParamRange) {
    if !range.contains(value) {
        errors.push(ConfigError::new(
            field,
            format!("must be in [{}, {}], got {value}", range.min, range.max),
        ));
    }
}
