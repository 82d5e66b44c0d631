//! Integration tests for the tick driver, history buffer, KPIs and export.

mod common;

use std::fs;

use powergrid_sim::config::ScenarioConfig;
use powergrid_sim::io::export::export_csv;
use powergrid_sim::sim::clock::{PlaybackSpeed, SimTime};
use powergrid_sim::sim::engine::Simulation;
use powergrid_sim::sim::history::HISTORY_CAPACITY;
use powergrid_sim::sim::kpi::KpiReport;
use powergrid_sim::sim::types::{ControlSettings, ControlUpdate};

#[test]
fn full_day_wraps_midnight() {
    let mut sim = Simulation::new(ControlSettings::default(), SimTime::new(0, 0));
    let records = sim.run(96);
    assert_eq!(records.len(), 96);
    assert_eq!(records[0].time.to_string(), "00:15");
    assert_eq!(records[95].time.to_string(), "00:00");
    assert_eq!(sim.history().len(), HISTORY_CAPACITY);
}

#[test]
fn solar_follows_daylight_window() {
    let mut sim = Simulation::new(ControlSettings::default(), SimTime::new(0, 0));
    for r in sim.run(96) {
        let tod = r.time.time_of_day();
        if !(6.0..18.0).contains(&tod) {
            assert_eq!(r.solar_mw, 0.0, "solar at {}", r.time);
        }
        if r.time == SimTime::new(12, 0) {
            assert_eq!(r.solar_mw, 90.0);
        }
    }
}

#[test]
fn records_match_live_score() {
    let mut sim = Simulation::new(ControlSettings::default(), common::evening());
    let record = sim.tick().unwrap();
    let score = sim.score();
    assert_eq!(record.score, score.total_score);
    assert_eq!(record.supply_mw, score.total_supply);
    assert_eq!(record.emissions, score.total_emissions);
    assert_eq!(record.cost, score.total_cost);
}

#[test]
fn updates_take_effect_on_next_tick() {
    let mut sim = Simulation::new(ControlSettings::default(), SimTime::new(2, 0));
    let before = sim.tick().unwrap();
    sim.update(ControlUpdate::Coal(0.0));
    let after = sim.tick().unwrap();
    assert_eq!(after.coal_mw, 0.0);
    assert!(after.supply_mw < before.supply_mw);
}

#[test]
fn paused_simulation_keeps_history() {
    let mut sim = Simulation::new(ControlSettings::default(), SimTime::new(8, 0));
    sim.run(3);
    sim.pause();
    assert!(sim.run(10).is_empty());
    assert_eq!(sim.history().len(), 3);
    assert_eq!(sim.now(), SimTime::new(8, 45));
}

#[test]
fn tick_interval_scales_with_speed() {
    let mut sim = Simulation::new(ControlSettings::default(), SimTime::default());
    let base = sim.tick_interval();
    sim.set_speed(PlaybackSpeed::X4);
    assert_eq!(sim.tick_interval() * 4, base);
}

#[test]
fn kpi_over_a_day() {
    let mut sim = ScenarioConfig::baseline().build_simulation();
    let records = sim.run(96);
    let kpi = KpiReport::from_records(&records);
    assert_eq!(kpi.ticks, 96);
    assert!(kpi.min_score <= kpi.max_score);
    assert!(kpi.peak_supply_mw >= kpi.peak_demand_mw);
    assert!(kpi.total_emissions > 0.0);
}

#[test]
fn csv_export_writes_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ticks.csv");

    let mut sim = ScenarioConfig::evening_peak().build_simulation();
    sim.run(30);
    export_csv(&sim.history().to_vec(), &path).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1 + HISTORY_CAPACITY);
    assert!(lines[0].starts_with("time,supply_mw,demand_mw"));
    // 30 ticks from 17:00: the buffer starts at tick 7
    assert!(lines[1].starts_with("18:45,"));
}
