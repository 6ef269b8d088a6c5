//! The synchronous patrol engine.
//!
//! [`PatrolEngine`] owns the transport, the live particles, the
//! simulation-window density and an optional mission. It is the single
//! writer for all of them: the threaded service wraps it, it never shares
//! it.

use std::error::Error;
use std::fmt;
use std::time::{Duration, Instant};

use slick_core::{ParticleSet, TickId, Transport, TransportError};
use tracing::{info, warn};

use crate::config::{ConfigError, MissionConfig, SimulationConfig};
use crate::metrics::TickMetrics;
use crate::mission::{Feedback, FeedbackError, FeedbackOutcome, MissionState};
use crate::simulation::SimulationState;
use crate::snapshot::{MissionSnapshot, PatrolSnapshot, RobotView};

// ── TickError ──────────────────────────────────────────────────────

/// A tick that could not complete.
///
/// The engine state is whatever it was before the tick started.
#[derive(Debug, Clone, PartialEq)]
pub enum TickError {
    /// The transport failed to persist, advance or produce particles.
    Transport(TransportError),
}

impl fmt::Display for TickError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport: {e}"),
        }
    }
}

impl Error for TickError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport(e) => Some(e),
        }
    }
}

impl From<TransportError> for TickError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

/// Summary of a completed tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickReport {
    /// The tick just completed.
    pub tick_id: TickId,
    /// Its metrics.
    pub metrics: TickMetrics,
}

// ── PatrolEngine ───────────────────────────────────────────────────

/// Synchronous patrol engine.
pub struct PatrolEngine {
    config: SimulationConfig,
    transport: Box<dyn Transport>,
    simulation: SimulationState,
    mission: Option<MissionState>,
    tick_id: TickId,
    metrics: TickMetrics,
}

// Compile-time assertion: PatrolEngine must be Send (it moves onto the
// scheduler thread).
const _: fn() = || {
    fn assert<T: Send>() {}
    assert::<PatrolEngine>();
};

impl PatrolEngine {
    /// Build the simulation grid and compute the first density from the
    /// transport's current particles.
    ///
    /// A transport that cannot produce particles yet is not fatal: the
    /// engine starts empty with a baseline surface.
    pub fn new(config: SimulationConfig, transport: Box<dyn Transport>) -> Result<Self, ConfigError> {
        config.validate()?;
        let particles = match transport.current_particles() {
            Ok(p) => p,
            Err(error) => {
                warn!(%error, "initial particle snapshot unavailable; starting empty");
                ParticleSet::new()
            }
        };
        let simulation = SimulationState::new(&config, particles)?;
        info!(
            width = simulation.grid().grid().width(),
            height = simulation.grid().grid().height(),
            particles = simulation.particles().len(),
            "simulation grid ready"
        );
        Ok(Self {
            config,
            transport,
            simulation,
            mission: None,
            tick_id: TickId::default(),
            metrics: TickMetrics::default(),
        })
    }

    /// One refresh cycle.
    ///
    /// 1. Persist the current (post-consumption) particles.
    /// 2. Advance the transport by `elapsed` and pull the new snapshot.
    /// 3. Recompute the simulation density.
    /// 4. Recompute the mission density, if a mission is attached.
    ///
    /// Any transport failure aborts the tick before state changes and is
    /// counted in [`TickMetrics::failed_ticks`].
    pub fn tick(&mut self, elapsed: Duration) -> Result<TickReport, TickError> {
        match self.try_tick(elapsed) {
            Ok(report) => Ok(report),
            Err(e) => {
                self.metrics.failed_ticks += 1;
                Err(e)
            }
        }
    }

    fn try_tick(&mut self, elapsed: Duration) -> Result<TickReport, TickError> {
        let start = Instant::now();

        let t = Instant::now();
        self.transport.persist(self.simulation.particles())?;
        let persist_us = t.elapsed().as_micros() as u64;

        let t = Instant::now();
        self.transport.advance(elapsed)?;
        let particles = self.transport.current_particles()?;
        let advance_us = t.elapsed().as_micros() as u64;

        let t = Instant::now();
        self.simulation.replace_particles(particles);
        let simulation_density_us = t.elapsed().as_micros() as u64;

        let t = Instant::now();
        if let Some(mission) = self.mission.as_mut() {
            mission.recompute(self.simulation.particles());
        }
        let mission_density_us = if self.mission.is_some() {
            t.elapsed().as_micros() as u64
        } else {
            0
        };

        self.tick_id = self.tick_id.next();
        self.metrics = TickMetrics {
            total_us: start.elapsed().as_micros() as u64,
            persist_us,
            advance_us,
            simulation_density_us,
            mission_density_us,
            particles: self.simulation.particles().len(),
            consumed_total: self.metrics.consumed_total,
            failed_ticks: self.metrics.failed_ticks,
        };
        Ok(TickReport {
            tick_id: self.tick_id,
            metrics: self.metrics.clone(),
        })
    }

    /// Attach a mission, replacing any current one.
    pub fn attach_mission(&mut self, config: &MissionConfig) -> Result<(), ConfigError> {
        let mission = MissionState::new(config, self.simulation.particles())?;
        info!(
            robots = mission.robots().len(),
            width = mission.grid().grid().width(),
            height = mission.grid().grid().height(),
            sensitivity = ?mission.sensitivity_mode(),
            "mission attached"
        );
        self.mission = Some(mission);
        Ok(())
    }

    /// Detach the mission. Returns whether one was attached.
    pub fn detach_mission(&mut self) -> bool {
        let had = self.mission.take().is_some();
        if had {
            info!("mission detached");
        }
        had
    }

    /// Apply robot feedback: update the robot and clear its cell.
    ///
    /// Sighted oil is forwarded to the transport first. Both the mission
    /// and the simulation caches are recomputed before this returns.
    pub fn report_feedback(&mut self, feedback: &Feedback) -> Result<FeedbackOutcome, FeedbackError> {
        let mission = self.mission.as_mut().ok_or(FeedbackError::NoMission)?;
        if let Err(e) = mission.check(feedback) {
            warn!(robot = %feedback.robot, x = feedback.x, y = feedback.y, error = %e, "feedback rejected");
            return Err(e);
        }
        if let Some(sightings) = &feedback.sightings {
            self.transport.inject_report(sightings)?;
        }

        let outcome = self
            .simulation
            .mutate_particles(|particles| mission.consume(feedback, particles))?;
        self.metrics.consumed_total += outcome.consumed as u64;
        self.metrics.particles = outcome.remaining;
        info!(
            robot = %outcome.robot,
            x = outcome.x,
            y = outcome.y,
            consumed = outcome.consumed,
            remaining = outcome.remaining,
            "robot feedback applied"
        );
        Ok(outcome)
    }

    /// Forward externally sighted oil to the transport.
    ///
    /// The sightings become sources on the next advance; nothing is
    /// recomputed now.
    pub fn report_oil(&mut self, sightings: &ParticleSet) -> Result<(), FeedbackError> {
        self.transport.inject_report(sightings)?;
        info!(count = sightings.len(), "oil report forwarded");
        Ok(())
    }

    /// Freeze the current state for readers.
    pub fn snapshot(&self) -> PatrolSnapshot {
        PatrolSnapshot {
            tick_id: self.tick_id,
            metrics: self.metrics.clone(),
            grid: *self.simulation.grid().grid(),
            density: self.simulation.density().clone(),
            particles: self.simulation.particles().clone(),
            mission: self.mission.as_ref().map(mission_snapshot),
        }
    }

    /// Configuration the engine was built with.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Simulation state.
    pub fn simulation(&self) -> &SimulationState {
        &self.simulation
    }

    /// Attached mission.
    pub fn mission(&self) -> Option<&MissionState> {
        self.mission.as_ref()
    }

    /// Last completed tick.
    pub fn tick_id(&self) -> TickId {
        self.tick_id
    }

    /// Metrics of the last tick plus cumulative counters.
    pub fn metrics(&self) -> &TickMetrics {
        &self.metrics
    }
}

fn mission_snapshot(mission: &MissionState) -> MissionSnapshot {
    let grid = *mission.grid().grid();
    let robots = mission
        .robots()
        .iter()
        .map(|r| {
            let pose = r.pose();
            RobotView {
                id: r.id(),
                weights: *r.weights(),
                pose,
                position: pose.map(|p| grid.raster_point(p.x, p.y)),
            }
        })
        .collect();
    MissionSnapshot {
        grid,
        density: mission.density().clone(),
        coast_distance: mission.coast_distance().clone(),
        potential: mission.potential().cloned(),
        sensitivity: mission.sensitivity_mode(),
        outer: mission.region().outer().vertices().to_vec(),
        inner: mission
            .region()
            .inner()
            .iter()
            .map(|r| r.vertices().to_vec())
            .collect(),
        robots,
    }
}
