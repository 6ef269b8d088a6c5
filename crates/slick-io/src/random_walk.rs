//! A seeded random-walk stand-in for the oil trajectory model.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use slick_core::{LonLat, ParticleSet, Transport, TransportError};
use tracing::debug;

use crate::error::LoadError;
use crate::store::SnapshotStore;

/// Random-walk parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomWalkConfig {
    /// RNG seed; equal seeds give equal trajectories.
    pub seed: u64,
    /// Standard deviation of the displacement after one hour, in degrees.
    pub diffusion: f64,
    /// Mean displacement per hour, `[lon, lat]` degrees.
    pub drift: LonLat,
    /// Particles released at each reported sighting.
    pub particles_per_report: usize,
}

impl Default for RandomWalkConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            diffusion: 0.01,
            drift: LonLat::new(0.0, 0.0),
            particles_per_report: 10,
        }
    }
}

impl RandomWalkConfig {
    /// Check the parameters.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.diffusion >= 0.0) || !self.diffusion.is_finite() {
            return Err(format!("diffusion must be finite and >= 0, got {}", self.diffusion));
        }
        if !self.drift.is_finite() {
            return Err("drift must be finite".into());
        }
        Ok(())
    }
}

/// Gaussian random walk over a particle set.
///
/// Each advance releases the pending reports as new sources, then moves
/// every particle by `drift * h + diffusion * sqrt(h) * N(0, 1)` per axis,
/// where `h` is the elapsed time in hours. With a [`SnapshotStore`] the
/// persisted set survives a restart.
pub struct RandomWalkTransport {
    config: RandomWalkConfig,
    rng: ChaCha8Rng,
    particles: ParticleSet,
    pending: ParticleSet,
    store: Option<SnapshotStore>,
}

impl RandomWalkTransport {
    /// Start a walk from `initial`.
    pub fn new(config: RandomWalkConfig, initial: ParticleSet) -> Result<Self, String> {
        config.validate()?;
        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            particles: initial,
            pending: ParticleSet::new(),
            store: None,
        })
    }

    /// Persist through `store`, resuming from its residual snapshot when
    /// one exists.
    pub fn with_store(mut self, store: SnapshotStore) -> Result<Self, LoadError> {
        if let Some(residual) = store.load()? {
            debug!(particles = residual.len(), "resuming from residual snapshot");
            self.particles = residual;
        }
        self.store = Some(store);
        Ok(self)
    }

    /// Parameters in use.
    pub fn config(&self) -> &RandomWalkConfig {
        &self.config
    }

    fn gaussian(&mut self) -> f64 {
        let u1 = 1.0 - self.rng.random::<f64>();
        let u2 = self.rng.random::<f64>();
        (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
    }
}

impl Transport for RandomWalkTransport {
    fn advance(&mut self, elapsed: Duration) -> Result<(), TransportError> {
        let released = std::mem::take(&mut self.pending);
        for source in released.iter() {
            for _ in 0..self.config.particles_per_report {
                self.particles.push(source);
            }
        }

        let hours = elapsed.as_secs_f64() / 3600.0;
        let spread = self.config.diffusion * hours.sqrt();
        let drift = self.config.drift;
        let current = std::mem::take(&mut self.particles);
        let mut moved = ParticleSet::new();
        for p in current.iter() {
            let lon = p.lon + drift.lon * hours + spread * self.gaussian();
            let lat = p.lat + drift.lat * hours + spread * self.gaussian();
            moved.push(LonLat::new(lon, lat));
        }
        self.particles = moved;
        debug!(
            released = released.len(),
            particles = self.particles.len(),
            hours,
            "random walk advanced"
        );
        Ok(())
    }

    fn current_particles(&self) -> Result<ParticleSet, TransportError> {
        Ok(self.particles.clone())
    }

    fn inject_report(&mut self, report: &ParticleSet) -> Result<(), TransportError> {
        if report.iter().any(|p| !p.is_finite()) {
            return Err(TransportError::Rejected {
                reason: "report contains non-finite coordinates".into(),
            });
        }
        self.pending.extend_from(report);
        Ok(())
    }

    fn persist(&mut self, particles: &ParticleSet) -> Result<(), TransportError> {
        if let Some(store) = &self.store {
            store.save(particles)?;
        }
        self.particles = particles.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walker(seed: u64) -> RandomWalkTransport {
        let config = RandomWalkConfig {
            seed,
            ..RandomWalkConfig::default()
        };
        let initial = ParticleSet::from_points([LonLat::new(-35.0, -9.0), LonLat::new(-34.9, -9.1)]);
        RandomWalkTransport::new(config, initial).unwrap()
    }

    #[test]
    fn same_seed_same_trajectory() {
        let mut a = walker(7);
        let mut b = walker(7);
        for _ in 0..3 {
            a.advance(Duration::from_secs(180)).unwrap();
            b.advance(Duration::from_secs(180)).unwrap();
        }
        assert_eq!(a.current_particles().unwrap(), b.current_particles().unwrap());

        let mut c = walker(8);
        for _ in 0..3 {
            c.advance(Duration::from_secs(180)).unwrap();
        }
        assert_ne!(a.current_particles().unwrap(), c.current_particles().unwrap());
    }

    #[test]
    fn zero_elapsed_leaves_particles_in_place() {
        let mut w = walker(1);
        let before = w.current_particles().unwrap();
        w.advance(Duration::ZERO).unwrap();
        assert_eq!(w.current_particles().unwrap(), before);
    }

    #[test]
    fn reports_become_sources_on_advance() {
        let mut w = walker(3);
        w.inject_report(&ParticleSet::from_points([LonLat::new(-35.5, -9.5)]))
            .unwrap();
        assert_eq!(w.current_particles().unwrap().len(), 2);
        w.advance(Duration::from_secs(60)).unwrap();
        assert_eq!(w.current_particles().unwrap().len(), 2 + 10);
    }

    #[test]
    fn persist_replaces_the_walked_set() {
        let mut w = walker(4);
        let kept = ParticleSet::from_points([LonLat::new(-35.0, -9.0)]);
        w.persist(&kept).unwrap();
        assert_eq!(w.current_particles().unwrap(), kept);
    }

    #[test]
    fn non_finite_report_is_rejected() {
        let mut w = walker(5);
        match w.inject_report(&ParticleSet::from_points([LonLat::new(f64::NAN, 0.0)])) {
            Err(TransportError::Rejected { .. }) => {}
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn negative_diffusion_is_rejected() {
        let config = RandomWalkConfig {
            diffusion: -1.0,
            ..RandomWalkConfig::default()
        };
        assert!(RandomWalkTransport::new(config, ParticleSet::new()).is_err());
    }
}
