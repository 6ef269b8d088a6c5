//! The runner's JSON configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use slick_engine::{MissionConfig, SimulationConfig};
use slick_io::RandomWalkConfig;

/// Everything one run needs.
///
/// ```json
/// {
///   "simulation": {"resolution": 111.0, "tick_interval": 180},
///   "transport": {"seed": 7, "diffusion": 0.02},
///   "initial_particles": "spill.txt",
///   "residual": "residual.txt",
///   "mission": {"region": {"outer": [[-35.5, -9.5], [-34, -9.5], [-34, -8.5]]}}
/// }
/// ```
///
/// Relative paths are resolved against the config file's directory.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub simulation: SimulationConfig,
    pub transport: RandomWalkConfig,
    /// Starting particles, `lon lat` per line.
    pub initial_particles: Option<PathBuf>,
    /// Residual snapshot persisted between ticks.
    pub residual: Option<PathBuf>,
    pub mission: Option<MissionConfig>,
}

impl RunConfig {
    /// Read `path`, resolving relative file references next to it.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut config: RunConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        let base = path.parent().unwrap_or(Path::new("."));
        config.initial_particles = config.initial_particles.map(|p| base.join(p));
        config.residual = config.residual.map(|p| base.join(p));
        Ok(config)
    }
}
