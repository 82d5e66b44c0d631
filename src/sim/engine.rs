//! Tick driver: advances simulated time and records scored snapshots.

use std::time::Duration;

use tracing::{debug, info, trace};

use crate::devices::DemandModel;

use super::clock::{Clock, PlaybackSpeed, SimTime, TICK_MINUTES};
use super::frequency::{ConstantFrequency, FrequencyModel};
use super::history::{TickRecord, TimeSeries};
use super::optimizer::ControlSink;
use super::score::{ScoreBreakdown, ScoringRules};
use super::types::{ControlSettings, ControlUpdate, GridSnapshot};

/// Owns the live control settings, the clock, and the tick history.
///
/// Generic over `F: FrequencyModel` for static dispatch; use
/// [`GridFrequency`](super::frequency::GridFrequency) when the model is picked
/// at runtime.
#[derive(Debug, Clone)]
pub struct Simulation<F: FrequencyModel = ConstantFrequency> {
    settings: ControlSettings,
    demand_model: DemandModel,
    rules: ScoringRules,
    frequency: F,
    start: SimTime,
    clock: Clock,
    playing: bool,
    speed: PlaybackSpeed,
    history: TimeSeries,
}

impl Simulation<ConstantFrequency> {
    /// Creates a simulation at `start` with default demand, rules, and a
    /// constant 50 Hz frequency. Starts playing at 1x.
    pub fn new(settings: ControlSettings, start: SimTime) -> Self {
        Self::with_models(
            settings,
            DemandModel::default(),
            ScoringRules::default(),
            ConstantFrequency,
            start,
        )
    }
}

impl<F: FrequencyModel> Simulation<F> {
    /// Creates a simulation with explicit demand, scoring, and frequency models.
    ///
    /// # Arguments
    ///
    /// * `settings` - Initial control settings (clamped)
    /// * `demand_model` - Sector base loads
    /// * `rules` - Scoring options
    /// * `frequency` - Frequency model used for every tick
    /// * `start` - Simulated start time
    pub fn with_models(
        settings: ControlSettings,
        demand_model: DemandModel,
        rules: ScoringRules,
        frequency: F,
        start: SimTime,
    ) -> Self {
        Self {
            settings: settings.clamped(),
            demand_model,
            rules,
            frequency,
            start,
            clock: Clock::new(start),
            playing: true,
            speed: PlaybackSpeed::default(),
            history: TimeSeries::default(),
        }
    }

    pub fn settings(&self) -> &ControlSettings {
        &self.settings
    }

    pub fn frequency_model(&self) -> &F {
        &self.frequency
    }

    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    pub fn elapsed_ticks(&self) -> u64 {
        self.clock.elapsed_ticks()
    }

    pub fn history(&self) -> &TimeSeries {
        &self.history
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn speed(&self) -> PlaybackSpeed {
        self.speed
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn toggle_playing(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }

    pub fn set_speed(&mut self, speed: PlaybackSpeed) {
        self.speed = speed;
    }

    /// Cycles 1x -> 2x -> 4x -> 1x and returns the new speed.
    pub fn cycle_speed(&mut self) -> PlaybackSpeed {
        self.speed = self.speed.next();
        self.speed
    }

    /// Real-time period between ticks at the current speed.
    pub fn tick_interval(&self) -> Duration {
        self.speed.tick_interval()
    }

    /// Scoring input for the current time and settings.
    pub fn snapshot(&self) -> GridSnapshot {
        self.snapshot_at(self.clock.now())
    }

    fn snapshot_at(&self, time: SimTime) -> GridSnapshot {
        let mut snapshot = self.settings.snapshot(time, &self.demand_model, 0.0);
        let supply = self.rules.total_supply(&snapshot.generation);
        snapshot.frequency = self.frequency.frequency_hz(supply, snapshot.demand.total());
        snapshot
    }

    /// Score for the current time and settings.
    pub fn score(&self) -> ScoreBreakdown {
        self.rules.calculate(&self.snapshot())
    }

    /// Advances one tick if playing. Returns `None` while paused.
    pub fn tick(&mut self) -> Option<TickRecord> {
        self.tick_by(TICK_MINUTES)
    }

    /// Advances `delta_minutes` of simulated time if playing.
    pub fn tick_by(&mut self, delta_minutes: u32) -> Option<TickRecord> {
        if !self.playing {
            return None;
        }
        Some(self.advance(delta_minutes))
    }

    /// Manual "+15 min": always advances time, records only while playing.
    pub fn skip_forward(&mut self) -> Option<TickRecord> {
        if self.playing {
            Some(self.advance(TICK_MINUTES))
        } else {
            let now = self.clock.tick(TICK_MINUTES);
            trace!(time = %now, "skipped forward while paused");
            None
        }
    }

    /// Runs `ticks` ticks (a no-op while paused) and returns the records produced.
    pub fn run(&mut self, ticks: usize) -> Vec<TickRecord> {
        (0..ticks).filter_map(|_| self.tick()).collect()
    }

    fn advance(&mut self, delta_minutes: u32) -> TickRecord {
        let now = self.clock.tick(delta_minutes);
        let snapshot = self.snapshot_at(now);
        let breakdown = self.rules.calculate(&snapshot);
        let record = TickRecord::capture(now, &snapshot, &breakdown);
        trace!(
            time = %now,
            supply = record.supply_mw,
            demand = record.demand_mw,
            score = record.score,
            "tick"
        );
        self.history.push(record);
        record
    }

    /// Applies one control edit, clamping out-of-range values.
    pub fn update(&mut self, update: ControlUpdate) {
        let next = self.settings.apply(update);
        if requested_value(update).is_some_and(|v| requested_was_clamped(&next, update, v)) {
            debug!(?update, "control value clamped into range");
        }
        self.settings = next;
    }

    /// Replaces every control value at once.
    pub fn apply_settings(&mut self, settings: ControlSettings) {
        self.settings = settings.clamped();
    }

    /// Rewinds to the start time and clears the history. Settings are kept.
    pub fn reset(&mut self) {
        self.clock.reset(self.start);
        self.history.clear();
    }
}

impl<F: FrequencyModel> ControlSink for Simulation<F> {
    fn apply_settings(&mut self, settings: ControlSettings) {
        Simulation::apply_settings(self, settings);
        info!(settings = %self.settings, "optimized settings applied");
    }
}

fn requested_value(update: ControlUpdate) -> Option<f64> {
    match update {
        ControlUpdate::Coal(v)
        | ControlUpdate::Gas(v)
        | ControlUpdate::Hydro(v)
        | ControlUpdate::SolarNameplate(v)
        | ControlUpdate::WindNameplate(v)
        | ControlUpdate::BatteryPower(v)
        | ControlUpdate::Dsm(v)
        | ControlUpdate::ResidentialTariff(v)
        | ControlUpdate::CommercialTariff(v)
        | ControlUpdate::IndustrialTariff(v) => Some(v),
        ControlUpdate::BatteryMode(_) | ControlUpdate::ToggleBatteryMode => None,
    }
}

fn requested_was_clamped(next: &ControlSettings, update: ControlUpdate, requested: f64) -> bool {
    let applied = match update {
        ControlUpdate::Coal(_) => next.coal,
        ControlUpdate::Gas(_) => next.gas,
        ControlUpdate::Hydro(_) => next.hydro,
        ControlUpdate::SolarNameplate(_) => next.solar_nameplate,
        ControlUpdate::WindNameplate(_) => next.wind_nameplate,
        ControlUpdate::BatteryPower(_) => next.battery_power,
        ControlUpdate::Dsm(_) => next.dsm,
        ControlUpdate::ResidentialTariff(_) => next.tariffs.residential,
        ControlUpdate::CommercialTariff(_) => next.tariffs.commercial,
        ControlUpdate::IndustrialTariff(_) => next.tariffs.industrial,
        ControlUpdate::BatteryMode(_) | ControlUpdate::ToggleBatteryMode => return false,
    };
    applied != requested
}
