//! Immutable engine snapshots and the slot they are published through.
//!
//! Readers never see the engine itself. Each mutation publishes a fresh
//! [`PatrolSnapshot`] behind an `Arc`; a reader holding an older `Arc`
//! keeps a consistent view for as long as it likes.

use std::sync::{Arc, Mutex, PoisonError};

use slick_core::{BoundingBox, LonLat, ParticleSet, RobotId, Surface, TickId};
use slick_space::GridSpec;

use crate::config::SensitivityMode;
use crate::metrics::TickMetrics;
use crate::robot::RobotPose;

/// A robot as seen by readers.
#[derive(Clone, Debug, PartialEq)]
pub struct RobotView {
    /// Robot id.
    pub id: RobotId,
    /// Strategy weights.
    pub weights: [f64; crate::robot::STRATEGY_WEIGHTS],
    /// Last pose, `None` while idle.
    pub pose: Option<RobotPose>,
    /// Pose converted to lon/lat (`x / res + min_lon`, `y / res + min_lat`).
    pub position: Option<LonLat>,
}

/// Mission surfaces and robots at snapshot time.
#[derive(Clone, Debug, PartialEq)]
pub struct MissionSnapshot {
    /// Mission grid.
    pub grid: GridSpec,
    /// Mission density surface.
    pub density: Surface,
    /// Normalized coast proximity.
    pub coast_distance: Surface,
    /// Normalized hazard potential, if sensitivity points were configured.
    pub potential: Option<Surface>,
    /// Selected sensitivity mode.
    pub sensitivity: SensitivityMode,
    /// Outer ring of the mission region.
    pub outer: Vec<LonLat>,
    /// Exclusion rings.
    pub inner: Vec<Vec<LonLat>>,
    /// Robots in configuration order.
    pub robots: Vec<RobotView>,
}

impl MissionSnapshot {
    /// The surface the sensitivity mode selects.
    pub fn sensitivity_surface(&self) -> &Surface {
        match (self.sensitivity, &self.potential) {
            (SensitivityMode::HazardPotential, Some(p)) => p,
            _ => &self.coast_distance,
        }
    }
}

/// Everything the presentation layer can query, frozen at one instant.
#[derive(Clone, Debug, PartialEq)]
pub struct PatrolSnapshot {
    /// Tick that produced the particle set.
    pub tick_id: TickId,
    /// Metrics of that tick.
    pub metrics: TickMetrics,
    /// Simulation grid.
    pub grid: GridSpec,
    /// Simulation-window density surface.
    pub density: Surface,
    /// Live particles.
    pub particles: ParticleSet,
    /// Mission view, if a mission is attached.
    pub mission: Option<MissionSnapshot>,
}

impl PatrolSnapshot {
    /// Simulation-window density.
    pub fn simulation_density(&self) -> &Surface {
        &self.density
    }

    /// Mission density.
    pub fn mission_density(&self) -> Option<&Surface> {
        self.mission.as_ref().map(|m| &m.density)
    }

    /// The selected sensitivity surface.
    pub fn sensitivity(&self) -> Option<&Surface> {
        self.mission.as_ref().map(MissionSnapshot::sensitivity_surface)
    }

    /// Mission coast proximity.
    pub fn coast_distance(&self) -> Option<&Surface> {
        self.mission.as_ref().map(|m| &m.coast_distance)
    }

    /// Mission hazard potential.
    pub fn potential(&self) -> Option<&Surface> {
        self.mission.as_ref().and_then(|m| m.potential.as_ref())
    }

    /// Robots, empty without a mission.
    pub fn robots(&self) -> &[RobotView] {
        self.mission
            .as_ref()
            .map(|m| m.robots.as_slice())
            .unwrap_or_default()
    }

    /// One robot.
    pub fn robot(&self, id: RobotId) -> Option<&RobotView> {
        self.robots().iter().find(|r| r.id == id)
    }

    /// Outer ring of the mission region.
    pub fn region_outer(&self) -> Option<&[LonLat]> {
        self.mission.as_ref().map(|m| m.outer.as_slice())
    }

    /// Particles inside `window` (inclusive).
    pub fn particles_in(&self, window: &BoundingBox) -> ParticleSet {
        self.particles.within(window)
    }
}

/// Latest-snapshot slot: one writer, any number of readers.
pub struct SnapshotSlot {
    latest: Mutex<Arc<PatrolSnapshot>>,
}

// Compile-time assertion: SnapshotSlot must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<SnapshotSlot>();
};

impl SnapshotSlot {
    /// A slot holding `initial`.
    pub fn new(initial: PatrolSnapshot) -> Self {
        Self {
            latest: Mutex::new(Arc::new(initial)),
        }
    }

    /// Replace the published snapshot.
    pub fn publish(&self, snapshot: PatrolSnapshot) {
        let next = Arc::new(snapshot);
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }

    /// The most recently published snapshot.
    pub fn latest(&self) -> Arc<PatrolSnapshot> {
        Arc::clone(&self.latest.lock().unwrap_or_else(PoisonError::into_inner))
    }
}
