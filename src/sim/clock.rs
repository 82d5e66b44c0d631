//! Simulated time of day and playback speed.

use std::fmt;
use std::time::Duration;

use serde::{Serialize, Serializer};

/// Minutes in one simulated day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Simulated minutes covered by one tick.
pub const TICK_MINUTES: u32 = 15;

/// A time of day on the simulation's 15-minute grid.
///
/// Always normalized to `[00:00, 24:00)` with minutes in `{0, 15, 30, 45}`.
///
/// # Examples
///
/// ```
/// use powergrid_sim::sim::clock::SimTime;
///
/// let t = SimTime::new(23, 45).advanced_by(15);
/// assert_eq!(t.to_string(), "00:00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimTime {
    minutes: u32,
}

impl SimTime {
    /// Creates a time from an hour and minute.
    ///
    /// Hours wrap at 24 and minutes are snapped down to the tick grid.
    pub fn new(hour: u32, minute: u32) -> Self {
        Self::from_minutes((hour % 24) * 60 + minute.min(59))
    }

    /// Creates a time from minutes since midnight, wrapping and snapping to the grid.
    pub fn from_minutes(minutes: u32) -> Self {
        let wrapped = minutes % MINUTES_PER_DAY;
        Self {
            minutes: wrapped - wrapped % TICK_MINUTES,
        }
    }

    pub fn hour(self) -> u32 {
        self.minutes / 60
    }

    pub fn minute(self) -> u32 {
        self.minutes % 60
    }

    /// Minutes elapsed since midnight.
    pub fn minutes_since_midnight(self) -> u32 {
        self.minutes
    }

    /// Fractional hour of day, `hour + minute / 60`.
    pub fn time_of_day(self) -> f64 {
        f64::from(self.minutes) / 60.0
    }

    /// Fraction of the day elapsed, in `[0, 1)`.
    pub fn day_fraction(self) -> f64 {
        f64::from(self.minutes) / f64::from(MINUTES_PER_DAY)
    }

    /// Returns the time `delta_minutes` later, wrapping at midnight.
    pub fn advanced_by(self, delta_minutes: u32) -> Self {
        Self::from_minutes(self.minutes + delta_minutes % MINUTES_PER_DAY)
    }
}

impl Default for SimTime {
    fn default() -> Self {
        Self::new(8, 0)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for SimTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A logical clock advanced by explicit ticks.
///
/// Decoupled from wall time: any scheduler (timer, UI loop, test) drives it.
///
/// # Examples
///
/// ```
/// use powergrid_sim::sim::clock::{Clock, SimTime};
///
/// let mut clock = Clock::new(SimTime::new(6, 0));
/// let mut labels = Vec::new();
///
/// clock.run(3, |t| labels.push(t.to_string()));
/// assert_eq!(labels, vec!["06:15", "06:30", "06:45"]);
/// ```
#[derive(Debug, Clone)]
pub struct Clock {
    /// Current simulated time
    now: SimTime,
    /// Ticks taken since the clock was created or reset
    elapsed_ticks: u64,
}

impl Clock {
    pub fn new(start: SimTime) -> Self {
        Self {
            now: start,
            elapsed_ticks: 0,
        }
    }

    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn elapsed_ticks(&self) -> u64 {
        self.elapsed_ticks
    }

    /// Advances the clock by `delta_minutes` and returns the new time.
    pub fn tick(&mut self, delta_minutes: u32) -> SimTime {
        self.now = self.now.advanced_by(delta_minutes);
        self.elapsed_ticks += 1;
        self.now
    }

    /// Advances `ticks` standard steps, calling `f` with each new time.
    pub fn run(&mut self, ticks: usize, mut f: impl FnMut(SimTime)) {
        for _ in 0..ticks {
            let now = self.tick(TICK_MINUTES);
            f(now);
        }
    }

    /// Jumps to `start` and clears the tick counter.
    pub fn reset(&mut self, start: SimTime) {
        self.now = start;
        self.elapsed_ticks = 0;
    }
}

/// Playback speed multiplier for the tick driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PlaybackSpeed {
    #[default]
    X1,
    X2,
    X4,
}

impl PlaybackSpeed {
    /// Parses a multiplier value (`1`, `2` or `4`).
    pub fn from_multiplier(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::X1),
            2 => Some(Self::X2),
            4 => Some(Self::X4),
            _ => None,
        }
    }

    pub fn multiplier(self) -> u32 {
        match self {
            Self::X1 => 1,
            Self::X2 => 2,
            Self::X4 => 4,
        }
    }

    /// Next speed in the 1x -> 2x -> 4x -> 1x cycle.
    pub fn next(self) -> Self {
        match self {
            Self::X1 => Self::X2,
            Self::X2 => Self::X4,
            Self::X4 => Self::X1,
        }
    }

    /// Real-time period between ticks: one second scaled by the multiplier.
    pub fn tick_interval(self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.multiplier()))
    }
}

impl fmt::Display for PlaybackSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.multiplier())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_snaps_to_quarter_hour() {
        let t = SimTime::new(7, 40);
        assert_eq!(t.hour(), 7);
        assert_eq!(t.minute(), 30);
    }

    #[test]
    fn hours_wrap() {
        assert_eq!(SimTime::new(25, 0), SimTime::new(1, 0));
    }

    #[test]
    fn huge_hours_wrap_without_overflow() {
        assert_eq!(SimTime::new(80_000_000, 0), SimTime::new(8, 0));
        assert_eq!(SimTime::new(u32::MAX, u32::MAX), SimTime::new(15, 45));
    }

    #[test]
    fn time_of_day_is_fractional_hour() {
        assert_eq!(SimTime::new(12, 30).time_of_day(), 12.5);
        assert_eq!(SimTime::new(0, 0).time_of_day(), 0.0);
    }

    #[test]
    fn display_is_zero_padded() {
        assert_eq!(SimTime::new(6, 15).to_string(), "06:15");
        assert_eq!(SimTime::new(0, 0).to_string(), "00:00");
    }

    #[test]
    fn tick_advances_and_wraps_at_midnight() {
        let mut clock = Clock::new(SimTime::new(23, 30));
        assert_eq!(clock.tick(TICK_MINUTES), SimTime::new(23, 45));
        assert_eq!(clock.tick(TICK_MINUTES), SimTime::new(0, 0));
        assert_eq!(clock.elapsed_ticks(), 2);
    }

    #[test]
    fn full_day_of_ticks_returns_to_start() {
        let start = SimTime::new(8, 0);
        let mut clock = Clock::new(start);
        clock.run(96, |_| {});
        assert_eq!(clock.now(), start);
    }

    #[test]
    fn run_zero_ticks_never_calls() {
        let mut clock = Clock::new(SimTime::default());
        let mut was_called = false;
        clock.run(0, |_| was_called = true);
        assert!(!was_called);
    }

    #[test]
    fn reset_clears_counter() {
        let mut clock = Clock::new(SimTime::new(1, 0));
        clock.tick(TICK_MINUTES);
        clock.reset(SimTime::new(5, 0));
        assert_eq!(clock.now(), SimTime::new(5, 0));
        assert_eq!(clock.elapsed_ticks(), 0);
    }

    #[test]
    fn speed_cycles_through_three_levels() {
        let s = PlaybackSpeed::X1;
        assert_eq!(s.next(), PlaybackSpeed::X2);
        assert_eq!(s.next().next(), PlaybackSpeed::X4);
        assert_eq!(s.next().next().next(), PlaybackSpeed::X1);
    }

    #[test]
    fn tick_interval_scales_with_speed() {
        assert_eq!(PlaybackSpeed::X1.tick_interval(), Duration::from_millis(1000));
        assert_eq!(PlaybackSpeed::X2.tick_interval(), Duration::from_millis(500));
        assert_eq!(PlaybackSpeed::X4.tick_interval(), Duration::from_millis(250));
    }

    #[test]
    fn from_multiplier_rejects_unknown() {
        assert_eq!(PlaybackSpeed::from_multiplier(4), Some(PlaybackSpeed::X4));
        assert_eq!(PlaybackSpeed::from_multiplier(3), None);
    }
}
