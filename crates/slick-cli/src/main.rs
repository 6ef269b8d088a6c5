//! Slick patrol runner.
//!
//! Loads a run configuration, starts the patrol service with a random-walk
//! transport and logs a summary after every tick.

mod run_config;

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use slick_core::{ParticleSet, TickId};
use slick_engine::{
    MissionConfig, PatrolEngine, PatrolHandle, PatrolService, PatrolSnapshot, SensitivityMode,
};
use slick_io::{load_region, load_sensitivity_points, RandomWalkTransport, SnapshotStore};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::run_config::RunConfig;

#[derive(Parser)]
#[command(name = "slick-patrol")]
#[command(about = "Run the oil-patrol grid engine against a simulated spill")]
struct Cli {
    /// Run configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Mission region file (JSON); creates a mission if the config has none
    #[arg(long)]
    region: Option<PathBuf>,

    /// Hazard feature file (JSON); switches the mission to the hazard potential
    #[arg(long)]
    sensitivity: Option<PathBuf>,

    /// Stop after this many ticks
    #[arg(long, default_value = "10")]
    ticks: u64,

    /// Override the tick interval, in seconds
    #[arg(long)]
    interval_secs: Option<f64>,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().compact().with_env_filter(filter).init();

    let mut run = match &cli.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    apply_overrides(&cli, &mut run)?;

    let initial = match &run.initial_particles {
        Some(path) => SnapshotStore::new(path)
            .load()
            .with_context(|| format!("reading particles {}", path.display()))?
            .with_context(|| format!("particle file {} does not exist", path.display()))?,
        None => ParticleSet::new(),
    };
    let mut transport =
        RandomWalkTransport::new(run.transport.clone(), initial).map_err(anyhow::Error::msg)?;
    if let Some(path) = &run.residual {
        transport = transport
            .with_store(SnapshotStore::new(path))
            .with_context(|| format!("reading residual {}", path.display()))?;
    }

    let interval = run.simulation.tick_interval;
    let mut engine = PatrolEngine::new(run.simulation.clone(), Box::new(transport))
        .context("building simulation")?;
    if let Some(mission) = &run.mission {
        engine.attach_mission(mission).context("attaching mission")?;
    }

    let mut service = PatrolService::start(engine, interval)?;
    watch(&service.handle(), cli.ticks, interval);

    let report = service.shutdown();
    if !report.scheduler_joined {
        warn!("scheduler thread panicked");
    }
    info!(
        last_tick = %report.last_tick.unwrap_or_default(),
        shutdown_ms = report.total_ms,
        "done"
    );
    Ok(())
}

fn apply_overrides(cli: &Cli, run: &mut RunConfig) -> Result<()> {
    if let Some(secs) = cli.interval_secs {
        run.simulation.tick_interval =
            Duration::try_from_secs_f64(secs).context("invalid --interval-secs")?;
    }
    if let Some(path) = &cli.region {
        let region = load_region(path).with_context(|| format!("loading region {}", path.display()))?;
        match &mut run.mission {
            Some(mission) => mission.region = region,
            None => run.mission = Some(MissionConfig::new(region, Vec::new())),
        }
    }
    if let Some(path) = &cli.sensitivity {
        let points = load_sensitivity_points(path)
            .with_context(|| format!("loading hazard features {}", path.display()))?;
        let mission = run
            .mission
            .as_mut()
            .context("--sensitivity needs a mission (config or --region)")?;
        mission.sensitivity_points = points;
        mission.sensitivity = SensitivityMode::HazardPotential;
    }
    Ok(())
}

/// Log each published tick until `ticks` have run or failed.
fn watch(handle: &PatrolHandle, ticks: u64, interval: Duration) {
    let poll = (interval / 4).min(Duration::from_millis(200));
    let mut seen = TickId::default();
    loop {
        let snap = handle.latest();
        if snap.tick_id != seen {
            seen = snap.tick_id;
            log_summary(&snap);
        }
        if snap.tick_id.0 + snap.metrics.failed_ticks >= ticks {
            break;
        }
        thread::sleep(poll);
    }
}

fn log_summary(snap: &PatrolSnapshot) {
    let peak = |values: &[f64]| values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    info!(
        tick = %snap.tick_id,
        particles = snap.particles.len(),
        simulation_peak = peak(snap.simulation_density().values()),
        mission_peak = snap.mission_density().map(|s| peak(s.values())),
        consumed_total = snap.metrics.consumed_total,
        failed_ticks = snap.metrics.failed_ticks,
        total_us = snap.metrics.total_us,
        "tick summary"
    );
}
