//! Filter, bin and estimate as one step.

use slick_core::{FlyMask, ParticleSet, Surface};
use slick_space::{GridSpec, ParticleIndex, RegionGrid};
use tracing::debug;

use crate::density::{DensityEstimator, EstimateError};

/// A density surface together with the bin assignment it was computed from.
///
/// The two are only ever replaced together. Consumption reads the cached
/// bins to find which original particles sit in a robot's cell.
#[derive(Clone, Debug, PartialEq)]
pub struct DensityCache {
    index: ParticleIndex,
    surface: Surface,
    degraded: Option<EstimateError>,
}

impl DensityCache {
    /// The density surface.
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Filtered particles, original indices, bins and histogram.
    pub fn index(&self) -> &ParticleIndex {
        &self.index
    }

    /// Why the surface fell back to the baseline, if it did.
    pub fn degraded(&self) -> Option<EstimateError> {
        self.degraded
    }

    /// Original indices of every particle cached in cell `(x, y)`.
    pub fn originals_in_cell(&self, x: usize, y: usize) -> Vec<usize> {
        self.index.originals_in_cell(x, y)
    }
}

/// The filter, bin and estimate chain for one rasterized region.
#[derive(Clone, Debug)]
pub struct DensityPipeline {
    grid: GridSpec,
    mask: FlyMask,
    estimator: DensityEstimator,
}

impl DensityPipeline {
    /// A pipeline over `region`'s grid and mask.
    pub fn new(region: &RegionGrid, estimator: DensityEstimator) -> Self {
        Self {
            grid: *region.grid(),
            mask: region.mask().clone(),
            estimator,
        }
    }

    /// Grid the pipeline computes on.
    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    /// Recompute the cache for `particles`.
    ///
    /// Never fails: an [`EstimateError`] substitutes the mask baseline and
    /// is recorded on the cache.
    pub fn run(&self, particles: &ParticleSet) -> DensityCache {
        let index = ParticleIndex::build(particles, &self.grid);
        let (surface, degraded) = match self.estimator.estimate(&index, &self.mask) {
            Ok(surface) => (surface, None),
            Err(reason) => {
                debug!(
                    %reason,
                    particles = particles.len(),
                    in_window = index.particles().len(),
                    "density degraded to baseline"
                );
                (Surface::baseline(&self.mask), Some(reason))
            }
        };
        DensityCache {
            index,
            surface,
            degraded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slick_core::{BoundingBox, LonLat};
    use slick_space::Region;

    fn pipeline() -> DensityPipeline {
        let bbox = BoundingBox::new(-1.0, -1.0, 1.0, 1.0);
        let region = Region::rectangle(&bbox).unwrap();
        let rg = RegionGrid::build(&region, GridSpec::new(bbox, 1.0).unwrap());
        DensityPipeline::new(&rg, DensityEstimator::default())
    }

    #[test]
    fn empty_snapshot_degrades_to_baseline() {
        let cache = pipeline().run(&ParticleSet::new());
        assert_eq!(cache.degraded(), Some(EstimateError::DataUnavailable));
        assert_eq!(cache.surface().values(), &[0.0; 4]);
        assert!(cache.index().bins().is_empty());
    }

    #[test]
    fn cache_keeps_bins_with_surface() {
        let particles: ParticleSet = [LonLat::new(5.0, 5.0), LonLat::new(0.5, 0.5)]
            .into_iter()
            .collect();
        let cache = pipeline().run(&particles);
        assert_eq!(cache.degraded(), None);
        assert_eq!(cache.originals_in_cell(1, 1), vec![1]);
        assert_eq!(cache.index().bins().len(), cache.index().particles().len());
        assert_eq!(cache.surface().get(1, 1), Some(5.0));
    }
}
