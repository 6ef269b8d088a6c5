//! Test utilities and mock collaborators for Slick development.
//!
//! [`MockTransport`] stands in for the oil-transport model: it replays a
//! script of particle snapshots and records every call so tests can
//! inspect what the engine persisted and injected. [`fixtures`] holds the
//! small regions and particle sets the scenario tests share.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use slick_core::{ParticleSet, Transport, TransportError};

/// Everything a [`MockTransport`] was asked to do.
#[derive(Clone, Debug, Default)]
pub struct TransportLog {
    pub advanced: Vec<Duration>,
    pub persisted: Vec<ParticleSet>,
    pub injected: Vec<ParticleSet>,
}

/// Scripted [`Transport`].
///
/// `current_particles` returns the last persisted set, the last scripted
/// snapshot, or the initial set, whichever came most recently. Each
/// `advance` pops the next scripted snapshot if there is one, then releases
/// every report injected since the previous advance.
pub struct MockTransport {
    current: ParticleSet,
    pending: ParticleSet,
    script: VecDeque<ParticleSet>,
    failing: Arc<AtomicBool>,
    log: Arc<Mutex<TransportLog>>,
}

/// Shared view into a [`MockTransport`] after it has been boxed and moved
/// into an engine.
#[derive(Clone)]
pub struct MockHandle {
    failing: Arc<AtomicBool>,
    log: Arc<Mutex<TransportLog>>,
}

impl MockTransport {
    pub fn new(initial: ParticleSet) -> Self {
        Self {
            current: initial,
            pending: ParticleSet::new(),
            script: VecDeque::new(),
            failing: Arc::new(AtomicBool::new(false)),
            log: Arc::new(Mutex::new(TransportLog::default())),
        }
    }

    /// Queue a snapshot for a later `advance`.
    pub fn then(mut self, next: ParticleSet) -> Self {
        self.script.push_back(next);
        self
    }

    /// Start in the failing state: every call errors.
    pub fn failing(self) -> Self {
        self.failing.store(true, Ordering::Release);
        self
    }

    pub fn handle(&self) -> MockHandle {
        MockHandle {
            failing: Arc::clone(&self.failing),
            log: Arc::clone(&self.log),
        }
    }

    fn check(&self) -> Result<(), TransportError> {
        if self.failing.load(Ordering::Acquire) {
            return Err(TransportError::Io {
                reason: "mock transport is failing".into(),
            });
        }
        Ok(())
    }

    fn log(&self) -> MutexGuard<'_, TransportLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for MockTransport {
    fn advance(&mut self, elapsed: Duration) -> Result<(), TransportError> {
        self.check()?;
        self.log().advanced.push(elapsed);
        if let Some(next) = self.script.pop_front() {
            self.current = next;
        }
        let released = std::mem::take(&mut self.pending);
        self.current.extend_from(&released);
        Ok(())
    }

    fn current_particles(&self) -> Result<ParticleSet, TransportError> {
        self.check()?;
        Ok(self.current.clone())
    }

    fn inject_report(&mut self, report: &ParticleSet) -> Result<(), TransportError> {
        self.check()?;
        self.log().injected.push(report.clone());
        self.pending.extend_from(report);
        Ok(())
    }

    fn persist(&mut self, particles: &ParticleSet) -> Result<(), TransportError> {
        self.check()?;
        self.log().persisted.push(particles.clone());
        self.current = particles.clone();
        Ok(())
    }
}

impl MockHandle {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Release);
    }

    /// Copy of the call log so far.
    pub fn log(&self) -> TransportLog {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slick_core::LonLat;

    #[test]
    fn script_replays_in_order() {
        let a = fixtures::particles(&[(0.0, 0.0)]);
        let b = fixtures::particles(&[(1.0, 1.0), (2.0, 2.0)]);
        let mut t = MockTransport::new(ParticleSet::new()).then(a.clone()).then(b.clone());
        t.advance(Duration::from_secs(1)).unwrap();
        assert_eq!(t.current_particles().unwrap(), a);
        t.advance(Duration::from_secs(1)).unwrap();
        assert_eq!(t.current_particles().unwrap(), b);
        t.advance(Duration::from_secs(1)).unwrap();
        assert_eq!(t.current_particles().unwrap(), b);
    }

    #[test]
    fn handle_toggles_failure_and_sees_log() {
        let mut t = MockTransport::new(ParticleSet::new());
        let handle = t.handle();
        t.inject_report(&fixtures::particles(&[(0.5, 0.5)])).unwrap();
        assert!(t.current_particles().unwrap().is_empty());
        t.advance(Duration::from_secs(1)).unwrap();
        assert_eq!(t.current_particles().unwrap().get(0), Some(LonLat::new(0.5, 0.5)));

        handle.set_failing(true);
        assert!(t.persist(&ParticleSet::new()).is_err());
        assert_eq!(handle.log().injected.len(), 1);
        assert!(handle.log().persisted.is_empty());
    }
}
