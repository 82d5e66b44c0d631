//! Power-grid simulator entry point: CLI wiring and scenario-driven runs.

mod cli;

use std::process;

use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use powergrid_sim::config::ScenarioConfig;
use powergrid_sim::error::GridResult;
use powergrid_sim::io::export::export_csv;
use powergrid_sim::sim::history::TickRecord;
use powergrid_sim::sim::kpi::KpiReport;
use powergrid_sim::sim::optimizer::OptimizationOutcome;
use powergrid_sim::sim::score::ScoreBreakdown;
use powergrid_sim::sim::types::ControlSettings;

use cli::CliOptions;

/// Everything a batch run produces, for `--json`.
#[derive(Serialize)]
struct RunSummary {
    start: String,
    settings: ControlSettings,
    optimization: Option<OptimizationOutcome>,
    records: Vec<TickRecord>,
    final_score: ScoreBreakdown,
    kpi: KpiReport,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Loads and validates the scenario selected on the command line.
///
/// `--scenario` or `--preset` picks the source (baseline when neither is given);
/// `--seed` and `--ticks` override the loaded values.
fn load_scenario(cli: &CliOptions) -> GridResult<ScenarioConfig> {
    let mut scenario = if let Some(ref path) = cli.scenario {
        ScenarioConfig::from_toml_file(path)?
    } else if let Some(ref name) = cli.preset {
        ScenarioConfig::from_preset(name)?
    } else {
        ScenarioConfig::baseline()
    };

    if let Some(seed) = cli.seed {
        scenario.simulation.seed = Some(seed);
    }
    if let Some(ticks) = cli.ticks {
        scenario.simulation.ticks = ticks;
    }

    scenario.validated()
}

/// Runs the scenario in batch mode, optionally optimizing first.
fn run_batch(scenario: &ScenarioConfig, optimize: bool) -> GridResult<(RunSummary, Vec<TickRecord>)> {
    let mut sim = scenario.build_simulation();
    // Batch runs always advance.
    sim.play();
    let start = sim.now();

    let optimization = if optimize {
        let optimizer = scenario.build_optimizer();
        let mut captured = None;
        optimizer.optimize_with_hook(*sim.settings(), start, &mut sim, |outcome| {
            captured = Some(outcome.clone());
            Ok(())
        })?;
        captured
    } else {
        None
    };

    let records = sim.run(scenario.simulation.ticks);
    let kpi = KpiReport::from_records(&records);
    let summary = RunSummary {
        start: start.to_string(),
        settings: *sim.settings(),
        optimization,
        records: records.clone(),
        final_score: sim.score(),
        kpi,
    };
    Ok((summary, sim.history().to_vec()))
}

fn print_text(summary: &RunSummary) {
    println!("Start {} | {}", summary.start, summary.settings);
    if let Some(ref o) = summary.optimization {
        println!(
            "Optimized: {} -> {} ({:+}) over {} restarts, {} evaluations",
            o.initial.total_score,
            o.best_score(),
            o.improvement(),
            o.restarts.len(),
            o.evaluations
        );
    }
    println!();
    for r in &summary.records {
        println!("{r}");
    }
    println!("\n{}", summary.final_score);
    println!("\n{}", summary.kpi);
}

fn main() {
    let cli = match cli::parse_args() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            process::exit(1);
        }
    };

    if cli.help {
        cli::print_usage();
        return;
    }

    // Raw-mode terminal output and log lines do not mix.
    if !cli.tui {
        init_tracing();
    }

    if let Err(e) = run(&cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(cli: &CliOptions) -> GridResult<()> {
    let scenario = load_scenario(cli)?;

    if cli.tui {
        return run_tui(scenario, &cli.scenario_label());
    }

    let (summary, history) = run_batch(&scenario, cli.optimize)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_text(&summary);
    }

    if let Some(ref path) = cli.telemetry_out {
        export_csv(&history, path)?;
        eprintln!("Telemetry written to {}", path.display());
    }
    Ok(())
}

#[cfg(feature = "tui")]
fn run_tui(scenario: ScenarioConfig, label: &str) -> GridResult<()> {
    powergrid_sim::tui::run(scenario, label)
}

#[cfg(not(feature = "tui"))]
fn run_tui(_scenario: ScenarioConfig, _label: &str) -> GridResult<()> {
    Err(powergrid_sim::error::GridError::Io(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "built without the \"tui\" feature",
    )))
}
