//! Spatial layer for the Slick oil-patrol grid engine.
//!
//! Everything that maps geography onto the patrol grid lives here:
//!
//! - [`Ring`] / [`Region`]: polygon geometry with closed (boundary-inclusive)
//!   point-in-polygon containment.
//! - [`GridSpec`]: the regular lon/lat lattice, its dimensions, bin edges
//!   and cell sample points.
//! - [`RegionGrid`]: the rasterized fly mask and coast-distance field.
//! - [`ParticleIndex`]: the window filter with composed original indices
//!   and the per-particle bin assignment.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod grid;
pub mod particle_index;
pub mod polygon;
pub mod raster;

pub use error::SpaceError;
pub use grid::{GridSpec, MAX_CELLS};
pub use particle_index::{bin, bin_axis, filter, BinAssignment, FilteredParticles, ParticleIndex};
pub use polygon::{Region, RegionShape, Ring};
pub use raster::RegionGrid;
