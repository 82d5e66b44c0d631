use std::env;
use std::path::PathBuf;

use powergrid_sim::config::ScenarioConfig;

/// Parsed CLI arguments.
#[derive(Debug, Default)]
pub struct CliOptions {
    pub scenario: Option<PathBuf>,
    pub preset: Option<String>,
    pub ticks: Option<usize>,
    pub seed: Option<u64>,
    pub optimize: bool,
    pub json: bool,
    pub telemetry_out: Option<PathBuf>,
    pub tui: bool,
    pub help: bool,
}

impl CliOptions {
    /// Name shown for the loaded scenario: the preset, the scenario file stem,
    /// or `baseline` when neither was given.
    pub fn scenario_label(&self) -> String {
        if let Some(ref name) = self.preset {
            return name.clone();
        }
        self.scenario
            .as_ref()
            .and_then(|p| p.file_stem())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "baseline".to_string())
    }
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

pub fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    let mut opts = CliOptions::default();
    let mut i = 0usize;

    while i < args.len() {
        match args[i].as_str() {
            "--scenario" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --scenario (expected a TOML file path)",
                )?;
                if opts.scenario.replace(PathBuf::from(path)).is_some() {
                    return Err("--scenario provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name =
                    args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                if opts.preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--ticks" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --ticks (expected a count)")?;
                let ticks = raw
                    .parse::<usize>()
                    .map_err(|_| format!("--ticks value \"{raw}\" is not a valid count"))?;
                if opts.ticks.replace(ticks).is_some() {
                    return Err("--ticks provided more than once".to_string());
                }
            }
            "--seed" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --seed (expected a u64)")?;
                let seed = raw
                    .parse::<u64>()
                    .map_err(|_| format!("--seed value \"{raw}\" is not a valid u64"))?;
                if opts.seed.replace(seed).is_some() {
                    return Err("--seed provided more than once".to_string());
                }
            }
            "--telemetry-out" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --telemetry-out (expected a file path)",
                )?;
                if opts.telemetry_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--telemetry-out provided more than once".to_string());
                }
            }
            "--optimize" => opts.optimize = true,
            "--json" => opts.json = true,
            "--tui" => opts.tui = true,
            "--help" | "-h" => opts.help = true,
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if opts.scenario.is_some() && opts.preset.is_some() {
        return Err(
            "arguments `--scenario` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    Ok(opts)
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("powergrid-sim: power-grid operations simulator");
    eprintln!();
    eprintln!("Usage: powergrid-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!(
        "  --preset <name>          Use a built-in preset ({})",
        ScenarioConfig::PRESETS.join(", ")
    );
    eprintln!("  --ticks <n>              Number of 15-minute ticks to run (default: 24)");
    eprintln!("  --seed <u64>             Seed the optimizer");
    eprintln!("  --optimize               Auto-adjust settings before running");
    eprintln!("  --json                   Print a JSON summary instead of text");
    eprintln!("  --telemetry-out <path>   Export the tick history to CSV");
    eprintln!("  --tui                    Start the interactive terminal UI");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
}
