//! Mission state: robots, mission grid and particle consumption.

use std::error::Error;
use std::fmt;

use slick_core::{LengthMismatch, ParticleSet, RobotId, Surface, TransportError};
use slick_fields::{DensityCache, DensityEstimator, DensityPipeline, PotentialField};
use slick_space::{GridSpec, Region, RegionGrid};

use crate::config::{ConfigError, MissionConfig, SensitivityMode};
use crate::robot::{RobotFleet, RobotPose};

// ── FeedbackError ──────────────────────────────────────────────────

/// Recoverable failure of a feedback or oil report.
///
/// Shared state is left untouched whenever one of these is returned.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedbackError {
    /// Feedback named a robot the mission does not know.
    UnknownRobot {
        /// The unregistered id.
        id: RobotId,
    },
    /// No mission is attached.
    NoMission,
    /// Reported cell lies outside the mission grid.
    CellOutOfBounds {
        /// Reported column.
        x: usize,
        /// Reported row.
        y: usize,
        /// Grid columns.
        width: usize,
        /// Grid rows.
        height: usize,
    },
    /// Sighting longitudes and latitudes differ in length.
    LengthMismatch(LengthMismatch),
    /// The transport refused the sighting report.
    Transport(TransportError),
    /// The service has shut down.
    Shutdown,
}

impl fmt::Display for FeedbackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownRobot { id } => write!(f, "unknown robot {id}"),
            Self::NoMission => write!(f, "no mission attached"),
            Self::CellOutOfBounds {
                x,
                y,
                width,
                height,
            } => write!(f, "cell ({x}, {y}) outside {width}x{height} mission grid"),
            Self::LengthMismatch(e) => write!(f, "sightings: {e}"),
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Shutdown => write!(f, "service has shut down"),
        }
    }
}

impl Error for FeedbackError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::LengthMismatch(e) => Some(e),
            Self::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LengthMismatch> for FeedbackError {
    fn from(e: LengthMismatch) -> Self {
        Self::LengthMismatch(e)
    }
}

impl From<TransportError> for FeedbackError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ── Feedback ───────────────────────────────────────────────────────

/// A robot's position report, optionally carrying oil it sighted.
#[derive(Clone, Debug, PartialEq)]
pub struct Feedback {
    /// Reporting robot.
    pub robot: RobotId,
    /// Grid column the robot occupies.
    pub x: usize,
    /// Grid row the robot occupies.
    pub y: usize,
    /// Robot heading.
    pub heading: f64,
    /// Oil sighted by the robot, forwarded to the transport.
    pub sightings: Option<ParticleSet>,
}

impl Feedback {
    /// A position-only report.
    pub fn new(robot: RobotId, x: usize, y: usize, heading: f64) -> Self {
        Self {
            robot,
            x,
            y,
            heading,
            sightings: None,
        }
    }

    /// Attach sighted oil from parallel coordinate arrays.
    pub fn with_sightings(mut self, lon: Vec<f64>, lat: Vec<f64>) -> Result<Self, FeedbackError> {
        self.sightings = Some(ParticleSet::from_coords(lon, lat)?);
        Ok(self)
    }

    fn pose(&self) -> RobotPose {
        RobotPose {
            x: self.x,
            y: self.y,
            heading: self.heading,
        }
    }
}

/// What a successful feedback did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeedbackOutcome {
    /// Reporting robot.
    pub robot: RobotId,
    /// Cell cleared.
    pub x: usize,
    /// Cell cleared.
    pub y: usize,
    /// Particles removed from the live set.
    pub consumed: usize,
    /// Particles left in the live set.
    pub remaining: usize,
}

// ── MissionState ───────────────────────────────────────────────────

/// A mission attached to the engine.
///
/// Holds the mission grid, the sensitivity surfaces, the robot fleet and a
/// density cache over the mission window. It never owns particles: every
/// operation takes the simulation's particle set, and consumption mutates
/// that set in place.
#[derive(Clone, Debug)]
pub struct MissionState {
    region: Region,
    grid: RegionGrid,
    potential: Option<Surface>,
    sensitivity: SensitivityMode,
    pipeline: DensityPipeline,
    cache: DensityCache,
    robots: RobotFleet,
}

impl MissionState {
    /// Validate `config`, rasterize the mission grid and compute the first
    /// density cache from `particles`.
    pub fn new(config: &MissionConfig, particles: &ParticleSet) -> Result<Self, ConfigError> {
        config.validate()?;
        let region = Region::from_shape(&config.region)?;
        let grid = RegionGrid::build(&region, GridSpec::covering(&region, config.resolution)?);
        let robots = RobotFleet::from_configs(&config.robots)?;

        let potential = if config.sensitivity_points.is_empty() {
            None
        } else {
            let field = PotentialField::builder()
                .sigma(config.sigma)
                .build()
                .map_err(|_| ConfigError::InvalidSigma {
                    value: config.sigma,
                })?;
            Some(field.build(&config.sensitivity_points, grid.grid(), grid.mask()))
        };

        let estimator = DensityEstimator::new(config.kde_bandwidth).map_err(|_| {
            ConfigError::InvalidBandwidth {
                value: config.kde_bandwidth,
            }
        })?;
        let pipeline = DensityPipeline::new(&grid, estimator);
        let cache = pipeline.run(particles);

        Ok(Self {
            region,
            grid,
            potential,
            sensitivity: config.sensitivity,
            pipeline,
            cache,
            robots,
        })
    }

    /// Recompute the mission density cache for `particles`.
    pub fn recompute(&mut self, particles: &ParticleSet) {
        self.cache = self.pipeline.run(particles);
    }

    /// Check a feedback without applying it.
    pub fn check(&self, feedback: &Feedback) -> Result<(), FeedbackError> {
        if !self.robots.contains(feedback.robot) {
            return Err(FeedbackError::UnknownRobot { id: feedback.robot });
        }
        let spec = self.grid.grid();
        if !spec.contains_cell(feedback.x, feedback.y) {
            return Err(FeedbackError::CellOutOfBounds {
                x: feedback.x,
                y: feedback.y,
                width: spec.width(),
                height: spec.height(),
            });
        }
        Ok(())
    }

    /// Apply a feedback: update the robot, then clear its cell.
    ///
    /// Every particle the cached bins place in `(x, y)` is removed from
    /// `particles`, then the mission cache is recomputed. On error nothing
    /// is touched.
    pub fn consume(
        &mut self,
        feedback: &Feedback,
        particles: &mut ParticleSet,
    ) -> Result<FeedbackOutcome, FeedbackError> {
        self.check(feedback)?;
        let robot = self
            .robots
            .get_mut(feedback.robot)
            .ok_or(FeedbackError::UnknownRobot { id: feedback.robot })?;
        robot.report(feedback.pose());

        let doomed = self.cache.originals_in_cell(feedback.x, feedback.y);
        let consumed = particles.remove_indices(&doomed);
        self.recompute(particles);

        Ok(FeedbackOutcome {
            robot: feedback.robot,
            x: feedback.x,
            y: feedback.y,
            consumed,
            remaining: particles.len(),
        })
    }

    /// Mission density cache.
    pub fn cache(&self) -> &DensityCache {
        &self.cache
    }

    /// Mission density surface.
    pub fn density(&self) -> &Surface {
        self.cache.surface()
    }

    /// Normalized coast proximity.
    pub fn coast_distance(&self) -> &Surface {
        self.grid.coast_distance()
    }

    /// Normalized hazard potential, when sensitivity points were given.
    pub fn potential(&self) -> Option<&Surface> {
        self.potential.as_ref()
    }

    /// The configured sensitivity mode.
    pub fn sensitivity_mode(&self) -> SensitivityMode {
        self.sensitivity
    }

    /// The surface selected by the sensitivity mode.
    pub fn sensitivity(&self) -> &Surface {
        match (self.sensitivity, &self.potential) {
            (SensitivityMode::HazardPotential, Some(p)) => p,
            _ => self.grid.coast_distance(),
        }
    }

    /// Rasterized mission grid.
    pub fn grid(&self) -> &RegionGrid {
        &self.grid
    }

    /// Mission region.
    pub fn region(&self) -> &Region {
        &self.region
    }

    /// Robots.
    pub fn robots(&self) -> &RobotFleet {
        &self.robots
    }
}
