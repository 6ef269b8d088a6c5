//! The threaded patrol service and its shutdown sequence.

use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use slick_core::{ParticleSet, TickId};
use tracing::info;

use crate::command::Command;
use crate::config::{ConfigError, MissionConfig};
use crate::engine::{PatrolEngine, TickError};
use crate::mission::{Feedback, FeedbackError, FeedbackOutcome};
use crate::scheduler::SchedulerState;
use crate::snapshot::{PatrolSnapshot, SnapshotSlot};

/// Capacity of the command channel.
const COMMAND_CAPACITY: usize = 64;

// ── Error types ──────────────────────────────────────────────────

/// Failure of a service request other than feedback.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// The scheduler thread has shut down.
    Shutdown,
    /// The mission configuration was rejected.
    Config(ConfigError),
    /// The requested tick failed.
    Tick(TickError),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shutdown => write!(f, "scheduler thread has shut down"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Tick(e) => write!(f, "tick: {e}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Shutdown => None,
            Self::Config(e) => Some(e),
            Self::Tick(e) => Some(e),
        }
    }
}

// ── ShutdownReport ───────────────────────────────────────────────

/// Report from [`PatrolService::shutdown`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Total time spent shutting down.
    pub total_ms: u64,
    /// Whether the scheduler thread was joined successfully.
    pub scheduler_joined: bool,
    /// Last tick the engine completed, if the engine was recovered.
    pub last_tick: Option<TickId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShutdownState {
    Running,
    Stopped,
}

// ── PatrolHandle ─────────────────────────────────────────────────

/// Cloneable request handle onto a running [`PatrolService`].
///
/// Every request is a message to the scheduler thread and blocks for the
/// reply, so requests and ticks never interleave. Any number of threads
/// may hold a clone and call in concurrently. Reads go through
/// [`latest`](Self::latest) and never block on the scheduler.
///
/// Once the service shuts down every request fails with `Shutdown`.
#[derive(Clone)]
pub struct PatrolHandle {
    cmd_tx: Sender<Command>,
    slot: Arc<SnapshotSlot>,
}

// Request handlers on any thread share clones of the handle.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<PatrolHandle>();
};

impl PatrolHandle {
    /// Send a command and wait for its reply. `None` once shut down.
    fn request<T>(&self, make: impl FnOnce(Sender<T>) -> Command) -> Option<T> {
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        self.cmd_tx.send(make(reply_tx)).ok()?;
        reply_rx.recv().ok()
    }

    /// Apply robot feedback. Returns once both density caches reflect the
    /// consumption.
    pub fn report_feedback(&self, feedback: Feedback) -> Result<FeedbackOutcome, FeedbackError> {
        self.request(|reply| Command::Feedback { feedback, reply })
            .unwrap_or(Err(FeedbackError::Shutdown))
    }

    /// Forward sighted oil to the transport.
    pub fn report_oil(&self, sightings: ParticleSet) -> Result<(), FeedbackError> {
        self.request(|reply| Command::ReportOil { sightings, reply })
            .unwrap_or(Err(FeedbackError::Shutdown))
    }

    /// Attach (or replace) the mission.
    pub fn attach_mission(&self, config: MissionConfig) -> Result<(), ServiceError> {
        let config = Box::new(config);
        self.request(|reply| Command::AttachMission { config, reply })
            .ok_or(ServiceError::Shutdown)?
            .map_err(ServiceError::Config)
    }

    /// Detach the mission. Returns whether one was attached.
    pub fn detach_mission(&self) -> Result<bool, ServiceError> {
        self.request(|reply| Command::DetachMission { reply })
            .ok_or(ServiceError::Shutdown)
    }

    /// Tick immediately and re-arm the timer from now.
    pub fn tick_now(&self) -> Result<TickId, ServiceError> {
        self.request(|reply| Command::TickNow { reply })
            .ok_or(ServiceError::Shutdown)?
            .map_err(ServiceError::Tick)
    }

    /// The most recently published snapshot.
    pub fn latest(&self) -> Arc<PatrolSnapshot> {
        self.slot.latest()
    }
}

// ── PatrolService ────────────────────────────────────────────────

/// A [`PatrolEngine`] running on its own scheduler thread.
///
/// The service owns the thread and its shutdown; requests go through
/// [`PatrolHandle`]s obtained from [`handle`](Self::handle).
pub struct PatrolService {
    handle: PatrolHandle,
    shutdown_flag: Arc<AtomicBool>,
    scheduler: Option<JoinHandle<PatrolEngine>>,
    recovered: Option<PatrolEngine>,
    state: ShutdownState,
}

impl PatrolService {
    /// Move `engine` onto a new `slick-tick` thread ticking every
    /// `interval`.
    ///
    /// The first tick fires one `interval` after start.
    pub fn start(engine: PatrolEngine, interval: Duration) -> Result<Self, ConfigError> {
        if interval.is_zero() {
            return Err(ConfigError::InvalidInterval { value: interval });
        }

        let slot = Arc::new(SnapshotSlot::new(engine.snapshot()));
        let shutdown_flag = Arc::new(AtomicBool::new(false));
        let (cmd_tx, cmd_rx) = crossbeam_channel::bounded(COMMAND_CAPACITY);

        let thread_slot = Arc::clone(&slot);
        let thread_shutdown = Arc::clone(&shutdown_flag);
        let scheduler = thread::Builder::new()
            .name("slick-tick".into())
            .spawn(move || {
                SchedulerState::new(engine, thread_slot, cmd_rx, thread_shutdown, interval).run()
            })
            .map_err(|e| ConfigError::ThreadSpawnFailed {
                reason: format!("slick-tick: {e}"),
            })?;

        info!(interval_ms = interval.as_millis() as u64, "patrol service started");
        Ok(Self {
            handle: PatrolHandle { cmd_tx, slot },
            shutdown_flag,
            scheduler: Some(scheduler),
            recovered: None,
            state: ShutdownState::Running,
        })
    }

    /// A new request handle.
    pub fn handle(&self) -> PatrolHandle {
        self.handle.clone()
    }

    /// The most recently published snapshot.
    pub fn latest(&self) -> Arc<PatrolSnapshot> {
        self.handle.latest()
    }

    /// Whether the scheduler is still running.
    pub fn is_running(&self) -> bool {
        self.state == ShutdownState::Running
    }

    /// Stop the scheduler and recover the engine.
    ///
    /// Sets the shutdown flag and wakes the scheduler out of its wait,
    /// then joins it. Requests queued behind the wake-up are dropped and
    /// their callers get `Shutdown`. Idempotent.
    pub fn shutdown(&mut self) -> ShutdownReport {
        if self.state == ShutdownState::Stopped {
            return ShutdownReport {
                total_ms: 0,
                scheduler_joined: true,
                last_tick: self.recovered.as_ref().map(PatrolEngine::tick_id),
            };
        }

        let start = Instant::now();
        self.state = ShutdownState::Stopped;
        self.shutdown_flag.store(true, Ordering::Release);
        // Fails only if the scheduler is already gone.
        let _ = self.handle.cmd_tx.send(Command::Wake);

        let scheduler_joined = match self.scheduler.take().map(JoinHandle::join) {
            Some(Ok(engine)) => {
                self.recovered = Some(engine);
                true
            }
            Some(Err(_)) => false,
            None => true,
        };

        let report = ShutdownReport {
            total_ms: start.elapsed().as_millis() as u64,
            scheduler_joined,
            last_tick: self.recovered.as_ref().map(PatrolEngine::tick_id),
        };
        info!(
            total_ms = report.total_ms,
            joined = report.scheduler_joined,
            "patrol service shut down"
        );
        report
    }

    /// Take the engine back after [`shutdown`](Self::shutdown).
    pub fn take_engine(&mut self) -> Option<PatrolEngine> {
        self.recovered.take()
    }
}

impl Drop for PatrolService {
    fn drop(&mut self) {
        if self.state != ShutdownState::Stopped {
            self.shutdown();
        }
    }
}

// The owning service moves between threads with its handle.
const _: fn() = || {
    fn assert<T: Send>() {}
    assert::<PatrolService>();
};
