//! TUI application state and background optimization.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Instant;

use crate::config::ScenarioConfig;
use crate::error::{GridError, GridResult};
use crate::sim::engine::Simulation;
use crate::sim::frequency::GridFrequency;
use crate::sim::history::TickRecord;
use crate::sim::optimizer::{ControlSink, OptimizationOutcome, Optimizer};
use crate::sim::score::ScoreBreakdown;
use crate::sim::types::ControlUpdate;

/// TUI application state.
pub struct App {
    /// Tick driver for the active scenario.
    pub sim: Simulation<GridFrequency>,
    optimizer: Arc<Optimizer>,
    /// Result channel of an in-flight background search.
    pending: Option<Receiver<GridResult<OptimizationOutcome>>>,
    /// One-line notification shown in the footer.
    pub message: Option<String>,
    /// Whether the user has requested quit.
    pub quit: bool,
    /// When the last simulation tick was executed.
    pub last_tick: Instant,
    /// Name of the active preset.
    pub preset_name: String,
}

impl App {
    /// Creates an app for a validated scenario.
    pub fn new(scenario: ScenarioConfig, preset_name: &str) -> Self {
        Self {
            sim: scenario.build_simulation(),
            optimizer: Arc::new(scenario.build_optimizer()),
            pending: None,
            message: None,
            quit: false,
            last_tick: Instant::now(),
            preset_name: preset_name.to_string(),
        }
    }

    /// Advances the simulation by one tick (no-op while paused).
    pub fn tick(&mut self) -> Option<TickRecord> {
        self.sim.tick()
    }

    pub fn toggle_play(&mut self) {
        self.sim.toggle_playing();
    }

    pub fn cycle_speed(&mut self) {
        self.sim.cycle_speed();
    }

    /// Manual "+15 min".
    pub fn skip_forward(&mut self) {
        self.sim.skip_forward();
    }

    pub fn adjust(&mut self, update: ControlUpdate) {
        self.sim.update(update);
    }

    /// Steps coal by `direction` units.
    pub fn nudge_coal(&mut self, direction: f64) {
        let value = self.sim.settings().coal + direction * 10.0;
        self.adjust(ControlUpdate::Coal(value));
    }

    /// Steps gas by `direction` units.
    pub fn nudge_gas(&mut self, direction: f64) {
        let value = self.sim.settings().gas + direction * 10.0;
        self.adjust(ControlUpdate::Gas(value));
    }

    /// Starts a background search from the current settings and time.
    ///
    /// The result is applied by [`App::poll_optimizer`] on the UI thread.
    pub fn auto_adjust(&mut self) {
        if self.pending.is_some() || self.optimizer.is_busy() {
            self.message = Some("Optimization already in progress".to_string());
            return;
        }
        let (tx, rx) = mpsc::channel();
        let optimizer = Arc::clone(&self.optimizer);
        let settings = *self.sim.settings();
        let time = self.sim.now();
        thread::spawn(move || {
            let _ = tx.send(optimizer.search(settings, time));
        });
        self.pending = Some(rx);
        self.message = Some("Optimizing...".to_string());
    }

    /// Returns `true` while a background search is in flight.
    pub fn is_optimizing(&self) -> bool {
        self.pending.is_some()
    }

    /// Applies a finished search result, if any, in one write.
    pub fn poll_optimizer(&mut self) {
        let Some(rx) = self.pending.as_ref() else {
            return;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => {
                self.pending = None;
                self.message = Some("Optimization did not complete".to_string());
                return;
            }
        };
        self.pending = None;
        self.finish_optimization(result);
    }

    /// Blocks until the in-flight search (if any) finishes and applies it.
    pub fn wait_for_optimizer(&mut self) {
        if let Some(rx) = self.pending.take() {
            let result = rx.recv().unwrap_or_else(|_| {
                Err(GridError::OptimizationFailed(
                    "search thread exited".to_string(),
                ))
            });
            self.finish_optimization(result);
        }
    }

    fn finish_optimization(&mut self, result: GridResult<OptimizationOutcome>) {
        match result {
            Ok(outcome) => {
                ControlSink::apply_settings(&mut self.sim, outcome.best_settings);
                self.message = Some(format!(
                    "Optimized: score {} -> {}",
                    outcome.initial.total_score,
                    outcome.best_score()
                ));
            }
            Err(e) => self.message = Some(format!("Optimization failed: {e}")),
        }
    }

    /// Switches to a different preset, resetting simulation state.
    pub fn switch_preset(&mut self, name: &str) {
        let Ok(scenario) = ScenarioConfig::from_preset(name) else {
            return;
        };
        self.sim = scenario.build_simulation();
        self.optimizer = Arc::new(scenario.build_optimizer());
        self.pending = None;
        self.message = None;
        self.preset_name = name.to_string();
    }

    /// Rewinds the current scenario to its start time, keeping settings.
    pub fn restart(&mut self) {
        self.sim.reset();
    }

    pub fn score(&self) -> ScoreBreakdown {
        self.sim.score()
    }
}
