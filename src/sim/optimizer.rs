//! Simulated-annealing search over the control surface.
//!
//! The search never touches live state. Candidates are [`ControlSettings`]
//! values scored at a fixed simulated time; only the winning value is handed
//! to a [`ControlSink`], in a single call, after everything else has
//! succeeded.

use std::sync::atomic::{AtomicBool, Ordering};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::devices::DemandModel;
use crate::error::{GridError, GridResult};

use super::clock::SimTime;
use super::frequency::NOMINAL_FREQUENCY_HZ;
use super::score::{ScoreBreakdown, ScoringRules};
use super::types::{
    BATTERY_RANGE, COAL_RANGE, COMMERCIAL_TARIFF_RANGE, ControlSettings, ControlUpdate, DSM_RANGE,
    GAS_RANGE, HYDRO_RANGE, INDUSTRIAL_TARIFF_RANGE, ParamRange, RESIDENTIAL_TARIFF_RANGE,
};

/// Annealing schedule and restart count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizerConfig {
    /// Independent annealing runs; the first starts from the caller's settings.
    pub restarts: usize,
    /// Iterations per restart.
    pub iterations: usize,
    pub initial_temperature: f64,
    /// Geometric decay applied after every iteration.
    pub cooling_rate: f64,
    /// Chance that an iteration flips the battery mode instead of stepping.
    pub flip_probability: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            restarts: 3,
            iterations: 1000,
            initial_temperature: 500.0,
            cooling_rate: 0.995,
            flip_probability: 0.1,
        }
    }
}

/// One of the eight scalar parameters the search perturbs.
///
/// Solar and wind nameplates are fixed inputs and never searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    Coal,
    Gas,
    Hydro,
    BatteryPower,
    Dsm,
    ResidentialTariff,
    CommercialTariff,
    IndustrialTariff,
}

impl Parameter {
    pub const ALL: [Self; 8] = [
        Self::Coal,
        Self::Gas,
        Self::Hydro,
        Self::BatteryPower,
        Self::Dsm,
        Self::ResidentialTariff,
        Self::CommercialTariff,
        Self::IndustrialTariff,
    ];

    pub fn range(self) -> ParamRange {
        match self {
            Self::Coal => COAL_RANGE,
            Self::Gas => GAS_RANGE,
            Self::Hydro => HYDRO_RANGE,
            Self::BatteryPower => BATTERY_RANGE,
            Self::Dsm => DSM_RANGE,
            Self::ResidentialTariff => RESIDENTIAL_TARIFF_RANGE,
            Self::CommercialTariff => COMMERCIAL_TARIFF_RANGE,
            Self::IndustrialTariff => INDUSTRIAL_TARIFF_RANGE,
        }
    }

    pub fn get(self, settings: &ControlSettings) -> f64 {
        match self {
            Self::Coal => settings.coal,
            Self::Gas => settings.gas,
            Self::Hydro => settings.hydro,
            Self::BatteryPower => settings.battery_power,
            Self::Dsm => settings.dsm,
            Self::ResidentialTariff => settings.tariffs.residential,
            Self::CommercialTariff => settings.tariffs.commercial,
            Self::IndustrialTariff => settings.tariffs.industrial,
        }
    }

    /// Returns `settings` with this parameter set to `value` (clamped).
    pub fn set(self, settings: ControlSettings, value: f64) -> ControlSettings {
        let update = match self {
            Self::Coal => ControlUpdate::Coal(value),
            Self::Gas => ControlUpdate::Gas(value),
            Self::Hydro => ControlUpdate::Hydro(value),
            Self::BatteryPower => ControlUpdate::BatteryPower(value),
            Self::Dsm => ControlUpdate::Dsm(value),
            Self::ResidentialTariff => ControlUpdate::ResidentialTariff(value),
            Self::CommercialTariff => ControlUpdate::CommercialTariff(value),
            Self::IndustrialTariff => ControlUpdate::IndustrialTariff(value),
        };
        settings.apply(update)
    }

    /// Moves the parameter one step up (`direction > 0`) or down.
    pub fn stepped(self, settings: ControlSettings, direction: f64) -> ControlSettings {
        let next = self.range().step_from(self.get(&settings), direction);
        self.set(settings, next)
    }

    fn randomized<R: Rng + ?Sized>(self, settings: ControlSettings, rng: &mut R) -> ControlSettings {
        let range = self.range();
        let value = range.min + rng.random::<f64>() * (range.max - range.min);
        self.set(settings, value)
    }
}

/// Receives the optimizer's winning settings.
///
/// Implementors must apply the whole value at once so no reader ever
/// observes a partial write-back.
pub trait ControlSink {
    fn apply_settings(&mut self, settings: ControlSettings);
}

impl ControlSink for ControlSettings {
    fn apply_settings(&mut self, settings: ControlSettings) {
        *self = settings;
    }
}

/// Statistics for one annealing run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RestartSummary {
    pub index: usize,
    pub start_score: i32,
    /// Best score seen during this run.
    pub best_score: i32,
    /// Score of the walk's position when the run ended.
    pub final_score: i32,
    pub accepted: usize,
    pub final_temperature: f64,
}

/// Result of a completed search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationOutcome {
    pub initial_settings: ControlSettings,
    pub initial: ScoreBreakdown,
    pub best_settings: ControlSettings,
    pub best: ScoreBreakdown,
    pub restarts: Vec<RestartSummary>,
    pub evaluations: usize,
}

impl OptimizationOutcome {
    pub fn best_score(&self) -> i32 {
        self.best.total_score
    }

    pub fn improvement(&self) -> i32 {
        self.best.total_score - self.initial.total_score
    }
}

/// Simulated annealing with restarts over [`ControlSettings`].
///
/// At most one search runs at a time per optimizer; a second concurrent call
/// fails with [`GridError::OptimizerBusy`].
#[derive(Debug)]
pub struct Optimizer {
    config: OptimizerConfig,
    demand_model: DemandModel,
    rules: ScoringRules,
    seed: Option<u64>,
    busy: AtomicBool,
}

struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> GridResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| GridError::OptimizerBusy)?;
        Ok(Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Optimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self {
            config,
            demand_model: DemandModel::default(),
            rules: ScoringRules::default(),
            seed: None,
            busy: AtomicBool::new(false),
        }
    }

    pub fn with_demand_model(mut self, demand_model: DemandModel) -> Self {
        self.demand_model = demand_model;
        self
    }

    pub fn with_rules(mut self, rules: ScoringRules) -> Self {
        self.rules = rules;
        self
    }

    /// Fixes the RNG seed so every invocation is reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Scores `settings` at `time` the way the search does.
    pub fn evaluate(&self, settings: &ControlSettings, time: SimTime) -> ScoreBreakdown {
        let snapshot = settings.snapshot(time, &self.demand_model, NOMINAL_FREQUENCY_HZ);
        self.rules.calculate(&snapshot)
    }

    /// Runs the search without writing anything back.
    pub fn search(&self, settings: ControlSettings, time: SimTime) -> GridResult<OptimizationOutcome> {
        let mut rng = self.make_rng();
        self.search_with_rng(settings, time, &mut rng)
    }

    /// Runs the search with a caller-supplied random source.
    pub fn search_with_rng<R: Rng + ?Sized>(
        &self,
        settings: ControlSettings,
        time: SimTime,
        rng: &mut R,
    ) -> GridResult<OptimizationOutcome> {
        let _guard = BusyGuard::acquire(&self.busy)?;
        self.run(settings, time, rng)
    }

    /// Searches, then writes the best settings to `sink` in one call.
    ///
    /// Returns the best total score.
    pub fn optimize<S: ControlSink + ?Sized>(
        &self,
        settings: ControlSettings,
        time: SimTime,
        sink: &mut S,
    ) -> GridResult<i32> {
        self.optimize_with_hook(settings, time, sink, |_| Ok(()))
    }

    /// Like [`Optimizer::optimize`], but runs `notify` before the write-back.
    ///
    /// If `notify` fails the sink is left untouched and the failure is
    /// returned as [`GridError::Notification`].
    pub fn optimize_with_hook<S, F>(
        &self,
        settings: ControlSettings,
        time: SimTime,
        sink: &mut S,
        notify: F,
    ) -> GridResult<i32>
    where
        S: ControlSink + ?Sized,
        F: FnOnce(&OptimizationOutcome) -> Result<(), String>,
    {
        let _guard = BusyGuard::acquire(&self.busy)?;
        let mut rng = self.make_rng();
        let outcome = self.run(settings, time, &mut rng)?;

        if let Err(message) = notify(&outcome) {
            warn!(%message, "optimization hook failed, settings unchanged");
            return Err(GridError::Notification(message));
        }

        sink.apply_settings(outcome.best_settings);
        Ok(outcome.best_score())
    }

    fn make_rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    fn checked_eval(&self, settings: &ControlSettings, time: SimTime) -> GridResult<ScoreBreakdown> {
        let breakdown = self.evaluate(settings, time);
        if breakdown.is_finite() {
            Ok(breakdown)
        } else {
            Err(GridError::OptimizationFailed(format!(
                "non-finite score for candidate [{settings}]"
            )))
        }
    }

    fn run<R: Rng + ?Sized>(
        &self,
        settings: ControlSettings,
        time: SimTime,
        rng: &mut R,
    ) -> GridResult<OptimizationOutcome> {
        let cfg = &self.config;
        let initial_settings = settings.clamped();
        let initial = self.checked_eval(&initial_settings, time)?;
        info!(
            time = %time,
            initial_score = initial.total_score,
            restarts = cfg.restarts,
            iterations = cfg.iterations,
            "optimization started"
        );

        let mut best_settings = initial_settings;
        let mut best = initial;
        let mut evaluations = 1_usize;
        let mut summaries = Vec::with_capacity(cfg.restarts);

        for restart in 0..cfg.restarts {
            let mut current = if restart == 0 {
                initial_settings
            } else {
                Parameter::ALL
                    .into_iter()
                    .fold(initial_settings, |s, p| p.randomized(s, rng))
            };
            let mut current_score = if restart == 0 {
                initial
            } else {
                evaluations += 1;
                self.checked_eval(&current, time)?
            };
            let start_score = current_score.total_score;
            let mut run_best = current_score.total_score;
            let mut temperature = cfg.initial_temperature;
            let mut accepted = 0_usize;

            if current_score.total_score > best.total_score {
                best = current_score;
                best_settings = current;
            }

            for _ in 0..cfg.iterations {
                let param = Parameter::ALL[rng.random_range(0..Parameter::ALL.len())];
                let direction = if rng.random::<f64>() > 0.5 { 1.0 } else { -1.0 };
                let candidate = if rng.random::<f64>() < cfg.flip_probability {
                    current.apply(ControlUpdate::ToggleBatteryMode)
                } else {
                    param.stepped(current, direction)
                };

                let candidate_score = self.checked_eval(&candidate, time)?;
                evaluations += 1;

                let delta = f64::from(candidate_score.total_score - current_score.total_score);
                let acceptance = (delta / temperature.max(f64::MIN_POSITIVE)).exp();
                if acceptance > rng.random::<f64>() {
                    current = candidate;
                    current_score = candidate_score;
                    accepted += 1;
                }

                run_best = run_best.max(candidate_score.total_score);
                if candidate_score.total_score > best.total_score {
                    best = candidate_score;
                    best_settings = candidate;
                }

                temperature *= cfg.cooling_rate;
            }

            let summary = RestartSummary {
                index: restart,
                start_score,
                best_score: run_best,
                final_score: current_score.total_score,
                accepted,
                final_temperature: temperature,
            };
            debug!(
                restart,
                start_score,
                run_best,
                accepted,
                global_best = best.total_score,
                "restart finished"
            );
            summaries.push(summary);
        }

        info!(
            initial_score = initial.total_score,
            best_score = best.total_score,
            evaluations,
            "optimization finished"
        );

        Ok(OptimizationOutcome {
            initial_settings,
            initial,
            best_settings,
            best,
            restarts: summaries,
            evaluations,
        })
    }
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new(OptimizerConfig::default())
    }
}
