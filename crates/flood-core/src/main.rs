//! Flood behavior simulation runner
//!
//! Runs one seeded disaster timeline and writes snapshots, the lifecycle event
//! log and a run summary to the output directory.

use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flood_core::config::DEFAULT_CONFIG_PATH;
use flood_core::events::EventLogger;
use flood_core::output::{write_current_state, write_snapshot_to_dir, write_summary};
use flood_core::{Config, Simulation};

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "flood_sim")]
#[command(about = "Agent-based flood disaster behavior simulation")]
struct Args {
    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Configuration file (falls back to defaults when absent)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Hours to simulate (defaults to the full disaster timeline)
    #[arg(long)]
    ticks: Option<u64>,

    /// Override the population size
    #[arg(long)]
    population: Option<usize>,

    /// Output directory
    #[arg(long, default_value = "output")]
    output: PathBuf,

    /// Interval between snapshots (in hours)
    #[arg(long)]
    snapshot_interval: Option<u64>,

    /// Skip writing the lifecycle event log
    #[arg(long)]
    no_events: bool,
}

fn load_config(args: &Args) -> Result<Config, flood_core::ConfigError> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(DEFAULT_CONFIG_PATH),
    };
    if let Some(size) = args.population {
        config.population.size = size;
    }
    if let Some(interval) = args.snapshot_interval {
        config.simulation.snapshot_interval = interval;
    }
    config.validate()?;
    Ok(config)
}

fn write_snapshot(sim: &mut Simulation, triggered_by: &str, output: &Path) {
    let snapshot = sim.snapshot(triggered_by);
    if let Err(e) = write_snapshot_to_dir(&snapshot, output) {
        warn!("Could not write snapshot at hour {}: {}", snapshot.timestamp.tick, e);
    }
    if let Err(e) = write_current_state(&snapshot, output) {
        warn!("Could not write current state at hour {}: {}", snapshot.timestamp.tick, e);
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flood_sim=info,flood_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let hours = args.ticks.unwrap_or_else(|| config.total_hours());

    info!(
        seed = args.seed,
        hours,
        population = config.population.size,
        output = %args.output.display(),
        "starting flood simulation"
    );

    if let Err(e) = fs::create_dir_all(args.output.join("snapshots")) {
        error!("Could not create output directories: {}", e);
        return ExitCode::FAILURE;
    }

    let mut sim = match Simulation::new(&config, args.seed) {
        Ok(sim) => sim,
        Err(e) => {
            error!("Could not initialize simulation: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if !args.no_events {
        match EventLogger::new(args.output.join("events.jsonl")) {
            Ok(logger) => sim.set_event_logger(logger),
            Err(e) => warn!("Could not open event log, continuing without it: {}", e),
        }
    }

    write_snapshot(&mut sim, "simulation_start", &args.output);

    for _ in 0..hours {
        sim.step();

        if sim.snapshot_due() {
            write_snapshot(&mut sim, "periodic", &args.output);
        }

        let hour = sim.hour();
        if hour % 100 == 0 {
            info!("Hour {} / {}", hour, hours);
        }
    }

    write_snapshot(&mut sim, "simulation_end", &args.output);
    sim.flush_events();

    let summary = sim.summary();
    if let Err(e) = write_summary(&summary, &args.output) {
        error!("Could not write run summary: {}", e);
        return ExitCode::FAILURE;
    }

    info!(
        run_id = %summary.run_id,
        hours = summary.total_ticks,
        dead = summary.deaths.total(),
        peak_stranded = summary.peak_fractions.stranded,
        peak_evacuated = summary.peak_fractions.evacuated,
        snapshots = sim.snapshot_count(),
        "simulation complete"
    );

    ExitCode::SUCCESS
}
