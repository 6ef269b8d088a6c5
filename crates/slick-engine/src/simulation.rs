//! Simulation-wide state: the live particle set and its density cache.

use slick_core::{ParticleSet, Surface};
use slick_fields::{DensityCache, DensityEstimator, DensityPipeline};
use slick_space::{Region, RegionGrid};

use crate::config::{ConfigError, SimulationConfig};

/// The particle set and the simulation-window density computed from it.
///
/// The particle set is only reachable mutably through
/// [`mutate_particles`](Self::mutate_particles) and
/// [`replace_particles`](Self::replace_particles), both of which recompute
/// the cache, so the cached bins always describe the live particles.
#[derive(Clone, Debug)]
pub struct SimulationState {
    region: Region,
    grid: RegionGrid,
    pipeline: DensityPipeline,
    particles: ParticleSet,
    cache: DensityCache,
}

impl SimulationState {
    /// Rasterize the simulation grid and compute the first cache.
    pub fn new(config: &SimulationConfig, particles: ParticleSet) -> Result<Self, ConfigError> {
        config.validate()?;
        let region = config.region()?;
        let grid = RegionGrid::build(&region, config.grid()?);
        let estimator = DensityEstimator::new(config.kde_bandwidth).map_err(|_| {
            ConfigError::InvalidBandwidth {
                value: config.kde_bandwidth,
            }
        })?;
        let pipeline = DensityPipeline::new(&grid, estimator);
        let cache = pipeline.run(&particles);
        Ok(Self {
            region,
            grid,
            pipeline,
            particles,
            cache,
        })
    }

    /// Swap in a fresh snapshot and recompute.
    pub fn replace_particles(&mut self, particles: ParticleSet) {
        self.particles = particles;
        self.recompute();
    }

    /// Run `f` against the particle set; recompute if it succeeds.
    ///
    /// `f` must leave the set untouched when it returns `Err`.
    pub fn mutate_particles<T, E>(
        &mut self,
        f: impl FnOnce(&mut ParticleSet) -> Result<T, E>,
    ) -> Result<T, E> {
        let out = f(&mut self.particles)?;
        self.recompute();
        Ok(out)
    }

    fn recompute(&mut self) {
        self.cache = self.pipeline.run(&self.particles);
    }

    /// Live particles.
    pub fn particles(&self) -> &ParticleSet {
        &self.particles
    }

    /// Current density cache.
    pub fn cache(&self) -> &DensityCache {
        &self.cache
    }

    /// Current density surface.
    pub fn density(&self) -> &Surface {
        self.cache.surface()
    }

    /// Rasterized simulation grid.
    pub fn grid(&self) -> &RegionGrid {
        &self.grid
    }

    /// Simulation region (the window rectangle when none is configured).
    pub fn region(&self) -> &Region {
        &self.region
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slick_core::{BoundingBox, LonLat};

    fn config() -> SimulationConfig {
        SimulationConfig {
            window: BoundingBox::new(-1.0, -1.0, 1.0, 1.0),
            resolution: 1.0,
            ..Default::default()
        }
    }

    fn one_particle() -> ParticleSet {
        [LonLat::new(0.5, 0.5)].into_iter().collect()
    }

    #[test]
    fn initial_cache_is_computed() {
        let sim = SimulationState::new(&config(), one_particle()).unwrap();
        assert_eq!(sim.density().get(1, 1), Some(5.0));
        assert_eq!(sim.cache().originals_in_cell(1, 1), vec![0]);
    }

    #[test]
    fn replace_recomputes() {
        let mut sim = SimulationState::new(&config(), one_particle()).unwrap();
        sim.replace_particles(ParticleSet::new());
        assert!(sim.cache().degraded().is_some());
        assert_eq!(sim.density().values(), &[0.0; 4]);
    }

    #[test]
    fn failed_mutation_does_not_recompute() {
        let mut sim = SimulationState::new(&config(), one_particle()).unwrap();
        let before = sim.cache().clone();
        let r: Result<(), &str> = sim.mutate_particles(|_| Err("nope"));
        assert!(r.is_err());
        assert_eq!(sim.cache(), &before);
    }

    #[test]
    fn successful_mutation_recomputes() {
        let mut sim = SimulationState::new(&config(), one_particle()).unwrap();
        let removed: Result<usize, ()> = sim.mutate_particles(|p| Ok(p.remove_indices(&[0])));
        assert_eq!(removed, Ok(1));
        assert!(sim.particles().is_empty());
        assert_eq!(sim.density().get(1, 1), Some(0.0));
    }
}
