//! Patrol engine for the Slick oil-patrol grid engine.
//!
//! Two ways to drive it:
//!
//! - [`PatrolEngine`]: the synchronous core. Owns the particle set, the
//!   simulation-wide density cache and an optional mission. Every
//!   operation runs to completion on the caller's thread.
//! - [`PatrolService`]: moves a `PatrolEngine` onto a dedicated scheduler
//!   thread that ticks on a fixed cadence and serializes feedback with
//!   ticks. Requests go through cloneable [`PatrolHandle`]s; readers get
//!   immutable [`PatrolSnapshot`]s.
//!
//! # Architecture
//!
//! ```text
//! PatrolHandle clones             slick-tick thread
//!     |                               | (deadline reached: tick first)
//!     |--report_feedback()----------->| cmd_rx.recv_timeout(deadline)
//!     |   [cmd_tx: bounded(64)]       | engine.report_feedback()
//!     |<--outcome via reply_tx--------| slot.publish(snapshot)
//!     |                               |
//!     |                               | (deadline reached)
//!     |                               | engine.tick(interval)
//!     |                               | slot.publish(snapshot)
//!     |                               | deadline = now + interval
//!     |--latest()------------------>  slot (Mutex<Arc<PatrolSnapshot>>)
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod engine;
pub mod metrics;
pub mod mission;
pub mod robot;
pub mod service;
pub mod simulation;
pub mod snapshot;

mod command;
mod scheduler;

pub use config::{ConfigError, MissionConfig, RobotConfig, SensitivityMode, SimulationConfig};
pub use engine::{PatrolEngine, TickError, TickReport};
pub use metrics::TickMetrics;
pub use mission::{Feedback, FeedbackError, FeedbackOutcome, MissionState};
pub use robot::{Robot, RobotFleet, RobotPose, RobotState};
pub use service::{PatrolHandle, PatrolService, ServiceError, ShutdownReport};
pub use simulation::SimulationState;
pub use snapshot::{MissionSnapshot, PatrolSnapshot, RobotView, SnapshotSlot};
