//! Headless Fleet Tactics battle runner.
//!
//! # Usage
//!
//! ```bash
//! # Run the stock skirmish
//! cargo run -p fleet_headless -- run
//!
//! # Run a scenario file at 4x and print a JSON report
//! cargo run -p fleet_headless -- run --scenario scenarios/skirmish.ron --time-scale 4 --json
//!
//! # Check that repeated runs agree
//! cargo run -p fleet_headless -- verify --scenario scenarios/skirmish.ron --runs 8
//!
//! # Run once per time scale
//! cargo run -p fleet_headless -- sweep --scenario scenarios/skirmish.ron
//!
//! # Check a blueprint file
//! cargo run -p fleet_headless -- validate --blueprints data/blueprints.ron
//! ```
//!
//! Reports go to stdout; logs go to stderr.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fleet_headless::{
    load_blueprints, HeadlessRunner, RunConfig, RunReport, Scenario, ScenarioError,
};

#[derive(Parser)]
#[command(name = "fleet_headless")]
#[command(about = "Headless Fleet Tactics battle runner")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario to completion
    Run {
        /// Scenario file (stock skirmish if omitted)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Real time per frame in milliseconds
        #[arg(long, default_value = "16")]
        frame_ms: f64,

        /// Give up after this many frames
        #[arg(long, default_value_t = fleet_headless::runner::DEFAULT_MAX_FRAMES)]
        max_frames: u64,

        /// Starting time scale
        #[arg(long)]
        time_scale: Option<u32>,

        /// Print the report as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Run the same scenario several times in parallel and compare hashes
    Verify {
        /// Scenario file (stock skirmish if omitted)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Number of runs
        #[arg(short, long, default_value = "5")]
        runs: usize,
    },

    /// Run once per allowed time scale
    Sweep {
        /// Scenario file (stock skirmish if omitted)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Print the reports as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Load and check a blueprint file
    Validate {
        /// Blueprint RON file
        #[arg(short, long)]
        blueprints: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout is for reports.
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    let result = match cli.command {
        Commands::Run {
            scenario,
            frame_ms,
            max_frames,
            time_scale,
            json,
        } => {
            let config = RunConfig {
                frame_ms,
                max_frames,
                time_scale,
            };
            cmd_run(scenario.as_deref(), config, json)
        }
        Commands::Verify { scenario, runs } => cmd_verify(scenario.as_deref(), runs),
        Commands::Sweep { scenario, json } => cmd_sweep(scenario.as_deref(), json),
        Commands::Validate { blueprints } => cmd_validate(&blueprints),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn load_scenario(path: Option<&Path>) -> Result<Scenario, ScenarioError> {
    match path {
        Some(path) => Scenario::load(path),
        None => Ok(Scenario::skirmish()),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), ScenarioError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

fn log_report(report: &RunReport) {
    let outcome = report
        .outcome
        .map_or_else(|| "undecided".to_string(), |o| o.to_string());
    tracing::info!(
        scenario = %report.scenario,
        %outcome,
        frames = report.frames,
        battle_seconds = report.elapsed_ms / 1000.0,
        time_scale = report.time_scale,
        state_hash = report.final_state_hash,
        "Run complete"
    );
    for (faction, tally) in &report.metrics.factions {
        tracing::info!(
            %faction,
            attacks = tally.attacks,
            damage_dealt = tally.damage_dealt,
            flank_hits = tally.flank_hits(),
            losses = tally.losses,
            "Faction summary"
        );
    }
}

/// Run a scenario once.
fn cmd_run(scenario: Option<&Path>, config: RunConfig, json: bool) -> Result<bool, ScenarioError> {
    let scenario = load_scenario(scenario)?;
    tracing::info!(name = %scenario.name, units = scenario.units.len(), "Running scenario");

    let runner = HeadlessRunner::from_scenario(scenario, config)?;
    let report = runner.run();
    log_report(&report);
    if json {
        print_json(&report)?;
    }
    Ok(true)
}

/// Verify that repeated runs agree.
fn cmd_verify(scenario: Option<&Path>, runs: usize) -> Result<bool, ScenarioError> {
    let scenario = load_scenario(scenario)?;
    tracing::info!(name = %scenario.name, runs, "Verifying determinism");

    let runner = HeadlessRunner::from_scenario(scenario, RunConfig::default())?;
    let report = runner.verify(runs);
    if report.deterministic {
        tracing::info!(
            runs,
            hash = report.hashes.first().copied().unwrap_or_default(),
            "All runs matched"
        );
    }
    print_json(&report)?;
    Ok(report.deterministic)
}

/// Run the scenario at every allowed time scale.
fn cmd_sweep(scenario: Option<&Path>, json: bool) -> Result<bool, ScenarioError> {
    let scenario = load_scenario(scenario)?;
    tracing::info!(
        name = %scenario.name,
        min = scenario.config.min_time_scale,
        max = scenario.config.max_time_scale,
        "Sweeping time scales"
    );

    let runner = HeadlessRunner::from_scenario(scenario, RunConfig::default())?;
    let reports = runner.sweep();
    for report in &reports {
        log_report(report);
    }
    if json {
        print_json(&reports)?;
    }
    Ok(true)
}

/// Load a blueprint file and report what it contains.
fn cmd_validate(path: &Path) -> Result<bool, ScenarioError> {
    let registry = load_blueprints(path)?;
    for name in registry.names() {
        tracing::info!(blueprint = name, "OK");
    }
    tracing::info!(path = %path.display(), count = registry.len(), "Blueprints valid");
    Ok(true)
}
