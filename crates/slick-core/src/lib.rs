//! Core types and traits for the Slick oil-patrol grid engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the Slick workspace:
//! identifiers, geographic primitives, the live particle set, score
//! surfaces with their normalization rules, and the [`Transport`]
//! collaborator trait that feeds particle snapshots into the engine.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod field;
pub mod geo;
pub mod id;
pub mod particles;
pub mod score;
pub mod traits;

pub use error::{LengthMismatch, TransportError};
pub use field::{FlyMask, Surface};
pub use geo::{BoundingBox, LonLat};
pub use id::{RobotId, TickId};
pub use particles::ParticleSet;
pub use score::{normalize_intensity, normalize_proximity, MASKED_SCORE, MAX_SCORE};
pub use traits::Transport;
