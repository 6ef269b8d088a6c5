//! Simulation and mission configuration, validation, and error types.
//!
//! [`SimulationConfig`] and [`MissionConfig`] are plain serde structs so a
//! runner can load them from one JSON file. `validate()` checks every
//! invariant the engine relies on; failures are fatal at startup.

use std::error::Error;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use slick_core::{BoundingBox, RobotId};
use slick_fields::SensitivityPoint;
use slick_space::{GridSpec, Region, RegionShape, SpaceError};

use crate::robot::STRATEGY_WEIGHTS;

/// Default grid resolution, cells per degree (about 1 km cells).
pub const DEFAULT_RESOLUTION: f64 = 111.0;

/// Default time between scheduled ticks.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(180);

/// Default kernel bandwidth factor.
pub const DEFAULT_KDE_BANDWIDTH: f64 = 0.2;

/// Default Gaussian width of hazard bumps, in degrees.
pub const DEFAULT_SIGMA: f64 = 0.1;

/// Default simulation window: the Alagoas/Pernambuco coastal strip.
pub const DEFAULT_WINDOW: BoundingBox = BoundingBox::new(-36.5, -11.0, -34.0, -8.5);

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while validating configuration or starting a service.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Region geometry or grid construction failed.
    Space(SpaceError),
    /// Tick interval is zero.
    InvalidInterval {
        /// The rejected interval.
        value: Duration,
    },
    /// KDE bandwidth factor is NaN, infinite, zero or negative.
    InvalidBandwidth {
        /// The rejected value.
        value: f64,
    },
    /// Potential-field sigma is NaN, infinite, zero or negative.
    InvalidSigma {
        /// The rejected value.
        value: f64,
    },
    /// Hazard-potential sensitivity was selected with no sensitivity points.
    NoSensitivityPoints,
    /// Two robots share an id.
    DuplicateRobot {
        /// The repeated id.
        id: RobotId,
    },
    /// A robot's strategy weights are not all finite and non-negative.
    InvalidWeights {
        /// The robot whose weights were rejected.
        id: RobotId,
    },
    /// A sensitivity point has a non-finite location or a negative or
    /// non-finite value.
    InvalidSensitivityValue {
        /// Position of the point in the configured list.
        index: usize,
        /// Its value.
        value: f64,
    },
    /// The scheduler thread could not be spawned.
    ThreadSpawnFailed {
        /// OS error description.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Space(e) => write!(f, "space: {e}"),
            Self::InvalidInterval { value } => {
                write!(f, "tick interval must be non-zero, got {value:?}")
            }
            Self::InvalidBandwidth { value } => {
                write!(f, "kde bandwidth must be finite and positive, got {value}")
            }
            Self::InvalidSigma { value } => {
                write!(f, "sigma must be finite and positive, got {value}")
            }
            Self::NoSensitivityPoints => {
                write!(f, "hazard-potential sensitivity needs at least one sensitivity point")
            }
            Self::DuplicateRobot { id } => write!(f, "robot {id} configured twice"),
            Self::InvalidWeights { id } => {
                write!(f, "robot {id} weights must be finite and non-negative")
            }
            Self::InvalidSensitivityValue { index, value } => {
                write!(f, "sensitivity point {index} is invalid (value {value})")
            }
            Self::ThreadSpawnFailed { reason } => write!(f, "thread spawn failed: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Space(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SpaceError> for ConfigError {
    fn from(e: SpaceError) -> Self {
        Self::Space(e)
    }
}

// ── SimulationConfig ───────────────────────────────────────────────

/// Simulation-wide grid and scheduling settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Filter window and grid bounds for the simulation density.
    pub window: BoundingBox,
    /// Cells per degree.
    pub resolution: f64,
    /// Time between scheduled ticks, in seconds on the wire.
    #[serde(with = "duration_secs")]
    pub tick_interval: Duration,
    /// KDE bandwidth factor.
    pub kde_bandwidth: f64,
    /// Optional fly region. When absent the whole window is flyable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<RegionShape>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            resolution: DEFAULT_RESOLUTION,
            tick_interval: DEFAULT_TICK_INTERVAL,
            kde_bandwidth: DEFAULT_KDE_BANDWIDTH,
            region: None,
        }
    }
}

impl SimulationConfig {
    /// Check every invariant the simulation grid relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid()?;
        self.region()?;
        if self.tick_interval.is_zero() {
            return Err(ConfigError::InvalidInterval {
                value: self.tick_interval,
            });
        }
        validate_bandwidth(self.kde_bandwidth)
    }

    /// Grid derived from the window.
    pub fn grid(&self) -> Result<GridSpec, ConfigError> {
        Ok(GridSpec::new(self.window, self.resolution)?)
    }

    /// The configured region, or the window rectangle.
    pub fn region(&self) -> Result<Region, ConfigError> {
        Ok(match &self.region {
            Some(shape) => Region::from_shape(shape)?,
            None => Region::rectangle(&self.window)?,
        })
    }
}

// ── MissionConfig ──────────────────────────────────────────────────

/// Which surface robots treat as environmental sensitivity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityMode {
    /// Proximity to the coastline (default).
    #[default]
    CoastDistance,
    /// Gaussian potential around configured hazard points.
    HazardPotential,
}

/// One robot in a mission.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RobotConfig {
    /// Unique id.
    pub id: RobotId,
    /// Reactive-strategy weights.
    #[serde(default = "default_weights")]
    pub weights: [f64; STRATEGY_WEIGHTS],
}

impl RobotConfig {
    /// A robot with equal strategy weights.
    pub fn new(id: RobotId) -> Self {
        Self {
            id,
            weights: default_weights(),
        }
    }
}

fn default_weights() -> [f64; STRATEGY_WEIGHTS] {
    [1.0 / STRATEGY_WEIGHTS as f64; STRATEGY_WEIGHTS]
}

/// A patrol mission: a region, its robots, and the sensitivity surface
/// they plan against.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MissionConfig {
    /// Mission region. Its bounding box is the mission grid and window.
    pub region: RegionShape,
    /// Robots, in the order they are reported.
    #[serde(default)]
    pub robots: Vec<RobotConfig>,
    /// Sensitivity surface selection. Never inferred from the other fields.
    #[serde(default)]
    pub sensitivity: SensitivityMode,
    /// Hazard points for the potential field.
    #[serde(default)]
    pub sensitivity_points: Vec<SensitivityPoint>,
    /// Gaussian width of hazard bumps, in degrees.
    #[serde(default = "default_sigma")]
    pub sigma: f64,
    /// Cells per degree.
    #[serde(default = "default_resolution")]
    pub resolution: f64,
    /// KDE bandwidth factor.
    #[serde(default = "default_bandwidth")]
    pub kde_bandwidth: f64,
}

fn default_sigma() -> f64 {
    DEFAULT_SIGMA
}

fn default_resolution() -> f64 {
    DEFAULT_RESOLUTION
}

fn default_bandwidth() -> f64 {
    DEFAULT_KDE_BANDWIDTH
}

impl MissionConfig {
    /// A coast-distance mission over `region` with default settings.
    pub fn new(region: RegionShape, robots: Vec<RobotConfig>) -> Self {
        Self {
            region,
            robots,
            sensitivity: SensitivityMode::default(),
            sensitivity_points: Vec::new(),
            sigma: DEFAULT_SIGMA,
            resolution: DEFAULT_RESOLUTION,
            kde_bandwidth: DEFAULT_KDE_BANDWIDTH,
        }
    }

    /// Check every invariant the mission relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let region = Region::from_shape(&self.region)?;
        GridSpec::covering(&region, self.resolution)?;
        validate_bandwidth(self.kde_bandwidth)?;
        if !(self.sigma > 0.0) || !self.sigma.is_finite() {
            return Err(ConfigError::InvalidSigma { value: self.sigma });
        }

        let mut seen = Vec::with_capacity(self.robots.len());
        for robot in &self.robots {
            if seen.contains(&robot.id) {
                return Err(ConfigError::DuplicateRobot { id: robot.id });
            }
            seen.push(robot.id);
            if robot.weights.iter().any(|w| !(w.is_finite() && *w >= 0.0)) {
                return Err(ConfigError::InvalidWeights { id: robot.id });
            }
        }

        for (index, p) in self.sensitivity_points.iter().enumerate() {
            if !(p.location.is_finite() && p.value.is_finite() && p.value >= 0.0) {
                return Err(ConfigError::InvalidSensitivityValue {
                    index,
                    value: p.value,
                });
            }
        }
        if self.sensitivity == SensitivityMode::HazardPotential && self.sensitivity_points.is_empty()
        {
            return Err(ConfigError::NoSensitivityPoints);
        }
        Ok(())
    }
}

fn validate_bandwidth(value: f64) -> Result<(), ConfigError> {
    if !(value > 0.0) || !value.is_finite() {
        return Err(ConfigError::InvalidBandwidth { value });
    }
    Ok(())
}

/// `Duration` as fractional seconds.
mod duration_secs {
    use std::time::Duration;

    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Duration::try_from_secs_f64(secs).map_err(de::Error::custom)
    }
}
