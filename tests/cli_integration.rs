//! End-to-end tests that run the compiled binary.

use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_powergrid-sim"))
        .args(args)
        .output()
        .expect("powergrid-sim process should run")
}

fn run_ok(args: &[&str]) -> String {
    let output = run(args);
    assert!(
        output.status.success(),
        "run failed for {args:?}: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout should be valid UTF-8")
}

#[test]
fn baseline_prints_ticks_and_reports() {
    let stdout = run_ok(&["--preset", "baseline", "--ticks", "4"]);
    assert!(stdout.contains("08:15"));
    assert!(stdout.contains("09:00"));
    assert!(!stdout.contains("09:15"));
    assert!(stdout.contains("--- Grid Score ---"));
    assert!(stdout.contains("--- KPI Report ---"));
}

#[test]
fn json_summary_is_parseable() {
    let stdout = run_ok(&["--preset", "evening_peak", "--ticks", "30", "--json"]);
    let v: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert_eq!(v["start"], "17:00");
    assert_eq!(v["records"].as_array().map(Vec::len), Some(30));
    assert_eq!(v["kpi"]["ticks"], 30);
    assert!(v["optimization"].is_null());
}

#[test]
fn optimize_improves_or_keeps_score() {
    let stdout = run_ok(&["--preset", "baseline", "--ticks", "1", "--optimize", "--seed", "7", "--json"]);
    let v: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    let initial = v["optimization"]["initial"]["total_score"].as_i64().unwrap();
    let best = v["optimization"]["best"]["total_score"].as_i64().unwrap();
    assert!(best >= initial);
    assert_eq!(v["optimization"]["restarts"].as_array().map(Vec::len), Some(3));
}

#[test]
fn seeded_optimization_is_reproducible() {
    let args = ["--preset", "baseline", "--ticks", "2", "--optimize", "--seed", "99", "--json"];
    assert_eq!(run_ok(&args), run_ok(&args));
}

#[test]
fn telemetry_csv_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    let path_str = path.to_str().unwrap();
    run_ok(&["--ticks", "5", "--telemetry-out", path_str]);
    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 6);
}

#[test]
fn scenario_files_load() {
    for path in [
        "scenarios/baseline.toml",
        "scenarios/evening_peak.toml",
        "scenarios/renewable_heavy.toml",
        "scenarios/droop.toml",
    ] {
        run_ok(&["--scenario", path, "--ticks", "2"]);
    }
}

#[test]
fn unknown_preset_fails() {
    let output = run(&["--preset", "nuclear"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown preset"));
}

#[test]
fn invalid_scenario_reports_all_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[generation]\ncoal = 900.0\n\n[dsm]\nlevel = 40.0\n").unwrap();
    let output = run(&["--scenario", path.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("generation.coal"));
    assert!(stderr.contains("dsm.level"));
}

#[test]
fn conflicting_sources_are_rejected() {
    let output = run(&["--preset", "baseline", "--scenario", "scenarios/droop.toml"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("mutually exclusive"));

    let output = run(&["--ticks", "2", "--ticks", "3"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("more than once"));
}

#[test]
fn unwritable_telemetry_path_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("out.csv");
    let output = run(&["--ticks", "1", "--telemetry-out", path.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("IO error"));
}
