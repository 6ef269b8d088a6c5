//! Field producers for the Slick oil-patrol grid engine.
//!
//! Surfaces computed on top of a rasterized region:
//!
//! - [`PotentialField`]: Gaussian hazard bumps around weighted
//!   [`SensitivityPoint`]s.
//! - [`GaussianKde`]: a two-dimensional Gaussian kernel density fit.
//! - [`DensityEstimator`]: the masked, histogram-gated oil density surface.
//! - [`DensityPipeline`]: filter, bin and estimate in one step, producing
//!   the [`DensityCache`] that consumption indexes into.
//!
//! # Degradation
//!
//! Density estimation never fails outward. An empty snapshot or a particle
//! cloud with nothing inside the fly zone yields the baseline surface
//! (0 flyable, -1 masked) and the [`EstimateError`] is kept on the cache.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod density;
pub mod kde;
pub mod pipeline;
pub mod potential;

pub use density::{DensityEstimator, EstimateError};
pub use kde::GaussianKde;
pub use pipeline::{DensityCache, DensityPipeline};
pub use potential::{PotentialField, PotentialFieldBuilder, SensitivityPoint};
