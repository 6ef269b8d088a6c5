//! The collaborator seam between the grid engine and the trajectory model.

use std::time::Duration;

use crate::error::TransportError;
use crate::particles::ParticleSet;

/// The oil-transport collaborator.
///
/// A transport owns the trajectory model that moves particles between
/// ticks. The engine never mutates the transport's particles directly: it
/// pulls a fresh [`ParticleSet`] each tick, consumes from its own copy,
/// and hands that copy back through [`persist`](Transport::persist) at the
/// start of the next tick.
///
/// Implementations are moved onto the scheduler thread, hence `Send`.
pub trait Transport: Send {
    /// Advance the trajectory state by `elapsed`.
    fn advance(&mut self, elapsed: Duration) -> Result<(), TransportError>;

    /// The particle positions after the last [`advance`](Transport::advance).
    fn current_particles(&self) -> Result<ParticleSet, TransportError>;

    /// Add externally sighted oil as new sources for the next advance.
    fn inject_report(&mut self, sightings: &ParticleSet) -> Result<(), TransportError>;

    /// Save the engine's view of the particles (after consumption).
    fn persist(&mut self, particles: &ParticleSet) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn advance(&mut self, elapsed: Duration) -> Result<(), TransportError> {
        (**self).advance(elapsed)
    }

    fn current_particles(&self) -> Result<ParticleSet, TransportError> {
        (**self).current_particles()
    }

    fn inject_report(&mut self, sightings: &ParticleSet) -> Result<(), TransportError> {
        (**self).inject_report(sightings)
    }

    fn persist(&mut self, particles: &ParticleSet) -> Result<(), TransportError> {
        (**self).persist(particles)
    }
}
