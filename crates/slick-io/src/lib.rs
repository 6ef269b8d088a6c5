//! File-backed collaborators for the Slick patrol engine.
//!
//! - [`region`]: JSON patrol regions.
//! - [`sensitivity`]: JSON hazard features reduced to sensitivity points.
//! - [`SnapshotStore`]: the residual particle snapshot between ticks.
//! - [`RandomWalkTransport`]: a seeded stand-in for the trajectory model.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod random_walk;
pub mod region;
pub mod sensitivity;
pub mod store;

pub use error::LoadError;
pub use random_walk::{RandomWalkConfig, RandomWalkTransport};
pub use region::{load_region, parse_region};
pub use sensitivity::{load_sensitivity_points, parse_sensitivity_points};
pub use store::SnapshotStore;
