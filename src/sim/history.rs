//! Bounded per-tick history feeding charts and exports.

use std::collections::VecDeque;
use std::fmt;

use serde::Serialize;

use super::clock::SimTime;
use super::score::ScoreBreakdown;
use super::types::GridSnapshot;

/// Number of records kept; older records are evicted.
pub const HISTORY_CAPACITY: usize = 24;

/// One tick of simulated grid state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TickRecord {
    /// `HH:MM` label.
    pub time: SimTime,
    pub supply_mw: f64,
    pub demand_mw: f64,
    pub coal_mw: f64,
    pub gas_mw: f64,
    pub hydro_mw: f64,
    pub solar_mw: f64,
    pub wind_mw: f64,
    pub battery_mw: f64,
    pub residential_mw: f64,
    pub commercial_mw: f64,
    pub industrial_mw: f64,
    pub frequency_hz: f64,
    /// kg CO2 for the interval.
    pub emissions: f64,
    /// Generation cost for the interval.
    pub cost: f64,
    pub renewable_pct: f64,
    pub score: i32,
}

impl TickRecord {
    pub fn capture(time: SimTime, snapshot: &GridSnapshot, breakdown: &ScoreBreakdown) -> Self {
        let generation = &snapshot.generation;
        let demand = &snapshot.demand;
        Self {
            time,
            supply_mw: breakdown.total_supply,
            demand_mw: breakdown.total_demand,
            coal_mw: generation.coal,
            gas_mw: generation.gas,
            hydro_mw: generation.hydro,
            solar_mw: generation.solar,
            wind_mw: generation.wind,
            battery_mw: generation.battery,
            residential_mw: demand.residential,
            commercial_mw: demand.commercial,
            industrial_mw: demand.industrial,
            frequency_hz: snapshot.frequency,
            emissions: breakdown.total_emissions,
            cost: breakdown.total_cost,
            renewable_pct: breakdown.renewable_percentage,
            score: breakdown.total_score,
        }
    }

    /// `supply - demand` in MW.
    pub fn imbalance_mw(&self) -> f64 {
        self.supply_mw - self.demand_mw
    }
}

impl fmt::Display for TickRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | supply {:>4.0} MW | demand {:>4.0} MW | {:>5.2} Hz | {:>6.1} kg CO2 | score {:>4}",
            self.time, self.supply_mw, self.demand_mw, self.frequency_hz, self.emissions, self.score
        )
    }
}

/// Fixed-capacity ring of the most recent tick records, oldest first.
#[derive(Debug, Clone)]
pub struct TimeSeries {
    records: VecDeque<TickRecord>,
    capacity: usize,
}

impl TimeSeries {
    /// Creates a buffer holding at most `capacity` records (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a record, evicting the oldest when full.
    pub fn push(&mut self, record: TickRecord) {
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&TickRecord> {
        self.records.back()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &TickRecord> + ExactSizeIterator {
        self.records.iter()
    }

    /// Copies the records out, oldest first.
    pub fn to_vec(&self) -> Vec<TickRecord> {
        self.records.iter().copied().collect()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl Default for TimeSeries {
    fn default() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::score::calculate_score;
    use crate::sim::types::{DemandProfile, GenerationMix, TariffSet};

    fn record(minutes: u32) -> TickRecord {
        let snapshot = GridSnapshot {
            generation: GenerationMix {
                coal: 100.0,
                ..GenerationMix::default()
            },
            demand: DemandProfile {
                residential: 40.0,
                commercial: 30.0,
                industrial: 30.0,
            },
            dsm: 0.0,
            tariffs: TariffSet::default(),
            frequency: 50.0,
        };
        TickRecord::capture(SimTime::from_minutes(minutes), &snapshot, &calculate_score(&snapshot))
    }

    #[test]
    fn capture_copies_snapshot_fields() {
        let r = record(0);
        assert_eq!(r.supply_mw, 100.0);
        assert_eq!(r.demand_mw, 100.0);
        assert_eq!(r.coal_mw, 100.0);
        assert_eq!(r.imbalance_mw(), 0.0);
        assert_eq!(r.time.to_string(), "00:00");
    }

    #[test]
    fn evicts_oldest_when_full() {
        let mut series = TimeSeries::default();
        for i in 0..30 {
            series.push(record(i * 15));
        }
        assert_eq!(series.len(), HISTORY_CAPACITY);
        // first six evicted
        assert_eq!(series.iter().next().map(|r| r.time), Some(SimTime::from_minutes(90)));
        assert_eq!(series.latest().map(|r| r.time), Some(SimTime::from_minutes(29 * 15)));
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mut series = TimeSeries::with_capacity(0);
        series.push(record(0));
        series.push(record(15));
        assert_eq!(series.len(), 1);
        assert_eq!(series.capacity(), 1);
    }
}
