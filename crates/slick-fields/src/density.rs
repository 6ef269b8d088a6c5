//! Masked, histogram-gated kernel density surface.

use std::fmt;

use slick_core::{FlyMask, ParticleSet, Surface, MASKED_SCORE, MAX_SCORE};
use slick_space::ParticleIndex;

use crate::kde::GaussianKde;

/// Why a density surface could not be estimated.
///
/// Neither case is fatal: the caller substitutes the mask baseline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EstimateError {
    /// The particle snapshot was empty inside the grid window.
    DataUnavailable,
    /// No particle landed in a flyable cell, or the fitted density has no
    /// positive maximum.
    DegenerateEstimation,
}

impl fmt::Display for EstimateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DataUnavailable => write!(f, "no particles inside the grid window"),
            Self::DegenerateEstimation => {
                write!(f, "no particles in flyable cells to fit a density to")
            }
        }
    }
}

impl std::error::Error for EstimateError {}

/// Density surface estimator.
///
/// The kernel is fit only to particles binned into flyable cells, evaluated
/// at every cell midpoint and scaled as
/// `5 / max(f) * (1 - mask) * f * (count > 0) - mask`, where `max(f)` runs
/// over every cell. A flyable cell with no particle of its own scores 0
/// even if the kernel leaks density into it.
#[derive(Clone, Debug, PartialEq)]
pub struct DensityEstimator {
    bandwidth: f64,
}

impl DensityEstimator {
    /// Default bandwidth factor.
    pub const DEFAULT_BANDWIDTH: f64 = 0.2;

    /// Create an estimator with bandwidth factor `bandwidth`.
    ///
    /// # Errors
    ///
    /// Returns `Err` unless `bandwidth` is finite and positive.
    pub fn new(bandwidth: f64) -> Result<Self, String> {
        if !(bandwidth > 0.0) || !bandwidth.is_finite() {
            return Err(format!("bandwidth must be finite and > 0, got {bandwidth}"));
        }
        Ok(Self { bandwidth })
    }

    /// Bandwidth factor.
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Estimate the density surface for an indexed particle set.
    ///
    /// # Errors
    ///
    /// [`EstimateError::DataUnavailable`] when the index is empty,
    /// [`EstimateError::DegenerateEstimation`] when nothing is left to fit
    /// after masking or the fit has no positive maximum.
    ///
    /// # Panics
    ///
    /// Panics if `mask` does not match the index's grid dimensions.
    pub fn estimate(&self, index: &ParticleIndex, mask: &FlyMask) -> Result<Surface, EstimateError> {
        let grid = index.grid();
        assert!(
            mask.width() == grid.width() && mask.height() == grid.height(),
            "mask does not match grid"
        );
        if index.particles().is_empty() {
            return Err(EstimateError::DataUnavailable);
        }

        let eligible: ParticleSet = index
            .particles()
            .iter()
            .zip(index.bins().iter())
            .filter(|(_, (x, y))| !mask.is_masked(*x, *y))
            .map(|(p, _)| p)
            .collect();
        let floor = self.bandwidth / grid.resolution();
        let kde = GaussianKde::fit(&eligible, self.bandwidth, floor)
            .ok_or(EstimateError::DegenerateEstimation)?;

        let fitted: Vec<f64> = grid
            .cells()
            .map(|(i, j)| kde.evaluate(&grid.cell_center(i, j)))
            .collect();
        let max = fitted.iter().copied().fold(0.0_f64, f64::max);
        if !(max > 0.0) || !max.is_finite() {
            return Err(EstimateError::DegenerateEstimation);
        }

        let values = grid
            .cells()
            .zip(fitted)
            .map(|((i, j), f)| {
                if mask.is_masked(i, j) {
                    MASKED_SCORE
                } else if index.count_at(i, j) == 0 {
                    0.0
                } else {
                    (MAX_SCORE * (f / max)).clamp(0.0, MAX_SCORE)
                }
            })
            .collect();
        Ok(Surface::from_values(grid.width(), grid.height(), values))
    }
}

impl Default for DensityEstimator {
    fn default() -> Self {
        Self {
            bandwidth: Self::DEFAULT_BANDWIDTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slick_core::{BoundingBox, LonLat};
    use slick_space::GridSpec;

    fn grid() -> GridSpec {
        GridSpec::new(BoundingBox::new(-1.0, -1.0, 1.0, 1.0), 1.0).unwrap()
    }

    fn set(points: &[(f64, f64)]) -> ParticleSet {
        points.iter().map(|&(x, y)| LonLat::new(x, y)).collect()
    }

    #[test]
    fn rejects_bad_bandwidth() {
        assert!(DensityEstimator::new(0.0).unwrap_err().contains("bandwidth"));
        assert!(DensityEstimator::new(f64::NAN).is_err());
    }

    #[test]
    fn empty_snapshot_is_data_unavailable() {
        let g = grid();
        let idx = ParticleIndex::build(&ParticleSet::new(), &g);
        let mask = FlyMask::all_flyable(2, 2);
        assert_eq!(
            DensityEstimator::default().estimate(&idx, &mask),
            Err(EstimateError::DataUnavailable)
        );
    }

    #[test]
    fn only_masked_particles_is_degenerate() {
        let g = grid();
        let idx = ParticleIndex::build(&set(&[(-0.5, -0.5), (-0.4, -0.6)]), &g);
        let mut mask = FlyMask::all_flyable(2, 2);
        mask.set_masked(0, 0, true);
        assert_eq!(
            DensityEstimator::default().estimate(&idx, &mask),
            Err(EstimateError::DegenerateEstimation)
        );
    }

    #[test]
    fn single_particle_fills_only_its_cell() {
        let g = grid();
        let idx = ParticleIndex::build(&set(&[(0.5, 0.5)]), &g);
        let mask = FlyMask::all_flyable(2, 2);
        let s = DensityEstimator::default().estimate(&idx, &mask).unwrap();
        assert_eq!(s.values(), &[0.0, 0.0, 0.0, MAX_SCORE]);
    }

    #[test]
    fn masked_cells_are_minus_one_and_uncovered_cells_zero() {
        let g = grid();
        let idx = ParticleIndex::build(&set(&[(0.5, 0.5), (0.6, 0.4), (-0.5, -0.5), (0.2, 0.9)]), &g);
        let mut mask = FlyMask::all_flyable(2, 2);
        mask.set_masked(0, 0, true);
        let s = DensityEstimator::default().estimate(&idx, &mask).unwrap();
        assert_eq!(s.get(0, 0), Some(MASKED_SCORE));
        assert_eq!(s.get(1, 0), Some(0.0));
        assert_eq!(s.get(0, 1), Some(0.0));
        let v = s.get(1, 1).unwrap();
        assert!(v > 0.0 && v <= MAX_SCORE);
    }
}
