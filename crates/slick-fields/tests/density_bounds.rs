//! Degenerate input and score bounds for the density pipeline.

use proptest::prelude::*;
use slick_core::{BoundingBox, LonLat, ParticleSet, Surface, MASKED_SCORE, MAX_SCORE};
use slick_fields::{DensityEstimator, DensityPipeline, EstimateError};
use slick_space::{GridSpec, Region, RegionGrid, Ring};

/// 4x4 grid over [0, 4]^2 with the south-west quadrant excluded.
fn region_grid() -> RegionGrid {
    let square = |a: f64, b: f64| {
        Ring::new(vec![
            LonLat::new(a, a),
            LonLat::new(b, a),
            LonLat::new(b, b),
            LonLat::new(a, b),
        ])
        .unwrap()
    };
    let region = Region::new(square(0.0, 4.0), [square(-0.5, 1.5)]);
    let grid = GridSpec::new(BoundingBox::new(0.0, 0.0, 4.0, 4.0), 1.0).unwrap();
    RegionGrid::build(&region, grid)
}

#[test]
fn particles_only_in_exclusion_yield_baseline() {
    let rg = region_grid();
    assert!(rg.mask().is_masked(0, 0));
    assert!(rg.mask().is_masked(1, 1));
    let particles: ParticleSet = [LonLat::new(0.5, 0.5), LonLat::new(0.2, 0.7)]
        .into_iter()
        .collect();
    let cache = DensityPipeline::new(&rg, DensityEstimator::default()).run(&particles);
    assert_eq!(cache.degraded(), Some(EstimateError::DegenerateEstimation));
    assert_eq!(cache.surface(), &Surface::baseline(rg.mask()));
    assert!(cache.surface().values().iter().all(|v| !v.is_nan()));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn density_scores_stay_in_range(
        coords in prop::collection::vec((-1.0f64..5.0, -1.0f64..5.0), 0..40),
    ) {
        let rg = region_grid();
        let particles: ParticleSet = coords.iter().map(|&(x, y)| LonLat::new(x, y)).collect();
        let cache = DensityPipeline::new(&rg, DensityEstimator::default()).run(&particles);
        for (k, &v) in cache.surface().values().iter().enumerate() {
            prop_assert!(!v.is_nan());
            if rg.mask().cells()[k] == 1 {
                prop_assert_eq!(v, MASKED_SCORE);
            } else {
                prop_assert!((0.0..=MAX_SCORE).contains(&v));
            }
        }
        if cache.degraded().is_some() {
            prop_assert_eq!(cache.surface(), &Surface::baseline(rg.mask()));
        }
    }
}
