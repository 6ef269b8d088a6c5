//! Region rasterization: fly mask plus coast-distance field.

use slick_core::{normalize_proximity, FlyMask, LonLat, Surface};

use crate::grid::GridSpec;
use crate::polygon::Region;

/// A region rasterized onto a grid.
///
/// Every cell is sampled at its [raster point](GridSpec::raster_point). A
/// cell is masked iff that point is outside the outer ring or inside any
/// exclusion ring (boundaries count as inside, see [`Region::is_flyable`]).
/// Flyable cells store `resolution * min distance` to the region's
/// coastline points; masked cells store 0 in the raw field.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionGrid {
    grid: GridSpec,
    mask: FlyMask,
    coast_distance_raw: Surface,
    coast_distance: Surface,
}

impl RegionGrid {
    /// Rasterize `region` onto `grid`.
    ///
    /// The grid need not match the region's bounding box; cells outside the
    /// region are simply masked.
    pub fn build(region: &Region, grid: GridSpec) -> Self {
        let (w, h) = (grid.width(), grid.height());
        let mut mask = FlyMask::all_flyable(w, h);
        let mut raw = Surface::filled(w, h, 0.0);
        let coastline = region.coastline();

        for (i, j) in grid.cells() {
            let p = grid.raster_point(i, j);
            if region.is_flyable(&p) {
                raw.set(i, j, grid.resolution() * nearest_distance(&p, coastline));
            } else {
                mask.set_masked(i, j, true);
            }
        }

        let coast_distance = normalize_proximity(&raw, &mask);
        Self {
            grid,
            mask,
            coast_distance_raw: raw,
            coast_distance,
        }
    }

    /// Grid geometry.
    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    /// Fly mask (`1` = forbidden).
    pub fn mask(&self) -> &FlyMask {
        &self.mask
    }

    /// Unnormalized coast distance in grid units.
    pub fn coast_distance_raw(&self) -> &Surface {
        &self.coast_distance_raw
    }

    /// Normalized coast proximity score (0..=5 flyable, -1 masked).
    pub fn coast_distance(&self) -> &Surface {
        &self.coast_distance
    }

    /// Whether cell `(i, j)` is flyable.
    pub fn is_flyable(&self, i: usize, j: usize) -> bool {
        !self.mask.is_masked(i, j)
    }
}

fn nearest_distance(p: &LonLat, cloud: &[LonLat]) -> f64 {
    cloud
        .iter()
        .map(|c| p.distance_sq(c))
        .fold(f64::INFINITY, f64::min)
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon::Ring;
    use proptest::prelude::*;
    use slick_core::{BoundingBox, MASKED_SCORE, MAX_SCORE};

    fn ring(v: &[(f64, f64)]) -> Ring {
        Ring::new(v.iter().map(|&(x, y)| LonLat::new(x, y)).collect()).unwrap()
    }

    #[test]
    fn unit_square_is_fully_flyable() {
        let bbox = BoundingBox::new(-1.0, -1.0, 1.0, 1.0);
        let region = Region::rectangle(&bbox).unwrap();
        let rg = RegionGrid::build(&region, GridSpec::new(bbox, 1.0).unwrap());
        assert_eq!(rg.mask().flyable_count(), 4);
        // Raster points (-1,-1), (0,-1), (-1,0), (0,0); (-1,-1) is a vertex.
        assert_eq!(rg.coast_distance_raw().get(0, 0), Some(0.0));
        assert_eq!(rg.coast_distance_raw().get(1, 1), Some(2f64.sqrt()));
        assert_eq!(rg.coast_distance().get(1, 1), Some(0.0));
        assert_eq!(rg.coast_distance().get(0, 0), Some(MAX_SCORE));
    }

    #[test]
    fn exclusion_cells_are_masked() {
        let outer = ring(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]);
        let hole = ring(&[(1.5, 1.5), (2.5, 1.5), (2.5, 2.5), (1.5, 2.5)]);
        let region = Region::new(outer, [hole]);
        let rg = RegionGrid::build(&region, GridSpec::covering(&region, 1.0).unwrap());
        assert_eq!((rg.grid().width(), rg.grid().height()), (4, 4));
        assert!(!rg.is_flyable(2, 2));
        assert!(rg.is_flyable(1, 1));
        assert_eq!(rg.coast_distance().get(2, 2), Some(MASKED_SCORE));
        assert_eq!(rg.mask().flyable_count(), 15);
    }

    #[test]
    fn region_outside_grid_masks_everything() {
        let region = Region::rectangle(&BoundingBox::new(10.0, 10.0, 11.0, 11.0)).unwrap();
        let grid = GridSpec::new(BoundingBox::new(0.0, 0.0, 2.0, 2.0), 1.0).unwrap();
        let rg = RegionGrid::build(&region, grid);
        assert_eq!(rg.mask().flyable_count(), 0);
        assert!(rg.coast_distance().values().iter().all(|&v| v == MASKED_SCORE));
    }

    #[test]
    fn triangle_masks_far_corner() {
        let region = Region::new(ring(&[(0.0, 0.0), (3.0, 0.0), (0.0, 3.0)]), []);
        let rg = RegionGrid::build(&region, GridSpec::covering(&region, 1.0).unwrap());
        assert!(rg.is_flyable(0, 0));
        assert!(rg.is_flyable(1, 1));
        assert!(!rg.is_flyable(2, 2));
    }

    proptest! {
        #[test]
        fn mask_matches_containment_and_is_deterministic(
            cx in 0.5f64..1.5, cy in 0.5f64..1.5, r in 0.1f64..0.4, res in 1.0f64..8.0,
        ) {
            let outer = ring(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);
            let hole = ring(&[(cx - r, cy - r), (cx + r, cy - r), (cx + r, cy + r), (cx - r, cy + r)]);
            let region = Region::new(outer.clone(), [hole.clone()]);
            let grid = GridSpec::covering(&region, res).unwrap();
            let first = RegionGrid::build(&region, grid);
            let second = RegionGrid::build(&region, grid);
            prop_assert_eq!(first.mask(), second.mask());
            for (i, j) in grid.cells() {
                let p = grid.raster_point(i, j);
                let expected = !outer.contains(&p) || hole.contains(&p);
                prop_assert_eq!(first.mask().is_masked(i, j), expected);
                let score = first.coast_distance().get(i, j).unwrap();
                if expected {
                    prop_assert_eq!(score, MASKED_SCORE);
                } else {
                    prop_assert!((0.0..=MAX_SCORE).contains(&score));
                }
            }
        }
    }
}
