//! The regular lon/lat lattice every surface is computed on.

use slick_core::{BoundingBox, LonLat};

use crate::error::SpaceError;
use crate::polygon::Region;

/// Cell counts closer than this to an integer are snapped to it before
/// the ceiling is taken, so `10 * 0.3` degrees gives 3 cells, not 4.
const CELL_COUNT_SNAP: f64 = 1e-9;

/// Dimensions and placement of a patrol grid.
///
/// A grid covers `bounds` at `resolution` cells per degree. Cell `(i, j)`
/// spans `[min_lon + i/res, min_lon + (i+1)/res]` by
/// `[min_lat + j/res, min_lat + (j+1)/res]`; when the extent is not a
/// whole number of cells the last column/row overhangs `bounds`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridSpec {
    bounds: BoundingBox,
    resolution: f64,
    width: usize,
    height: usize,
}

impl GridSpec {
    /// Derive the grid for `bounds`: `ceil(resolution * extent)` cells per
    /// axis.
    ///
    /// # Errors
    ///
    /// [`SpaceError::InvalidResolution`] for a non-positive or non-finite
    /// resolution, [`SpaceError::InvalidBounds`] for non-finite or inverted
    /// bounds, [`SpaceError::EmptyGrid`] when an axis has zero extent,
    /// [`SpaceError::GridTooLarge`] above [`MAX_CELLS`] cells.
    ///
    /// # Examples
    ///
    /// ```
    /// use slick_core::BoundingBox;
    /// use slick_space::GridSpec;
    ///
    /// let grid = GridSpec::new(BoundingBox::new(-1.0, -1.0, 1.0, 1.0), 1.0).unwrap();
    /// assert_eq!((grid.width(), grid.height()), (2, 2));
    /// ```
    pub fn new(bounds: BoundingBox, resolution: f64) -> Result<Self, SpaceError> {
        if !(resolution.is_finite() && resolution > 0.0) {
            return Err(SpaceError::InvalidResolution { value: resolution });
        }
        if !bounds.is_valid() {
            return Err(SpaceError::InvalidBounds {
                reason: format!(
                    "({}, {}) .. ({}, {}) is not a finite, ordered extent",
                    bounds.min_lon, bounds.min_lat, bounds.max_lon, bounds.max_lat
                ),
            });
        }
        let width = cell_count(resolution * bounds.width());
        let height = cell_count(resolution * bounds.height());
        if width == 0 || height == 0 {
            return Err(SpaceError::EmptyGrid { width, height });
        }
        match width.checked_mul(height) {
            Some(cells) if cells <= MAX_CELLS => {}
            _ => return Err(SpaceError::GridTooLarge { width, height }),
        }
        Ok(Self {
            bounds,
            resolution,
            width,
            height,
        })
    }

    /// The grid over a region's bounding box.
    pub fn covering(region: &Region, resolution: f64) -> Result<Self, SpaceError> {
        Self::new(region.bounding_box(), resolution)
    }

    /// Columns (longitude axis).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Rows (latitude axis).
    pub fn height(&self) -> usize {
        self.height
    }

    /// `width * height`.
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// Cells per degree.
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// The bounds the grid was derived from. Also the particle filter window.
    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// Whether `(i, j)` addresses a cell.
    pub fn contains_cell(&self, i: usize, j: usize) -> bool {
        i < self.width && j < self.height
    }

    /// Row-major storage offset of `(i, j)`.
    pub fn offset(&self, i: usize, j: usize) -> usize {
        j * self.width + i
    }

    /// Iterate `(i, j)` in storage order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let w = self.width;
        (0..self.cell_count()).map(move |k| (k % w, k / w))
    }

    /// The raster sample point of a cell, `(i/res + min_lon, j/res + min_lat)`.
    ///
    /// Mask, coast distance and potential are sampled here. It is also how a
    /// robot's grid cell converts back to lon/lat.
    pub fn raster_point(&self, i: usize, j: usize) -> LonLat {
        LonLat::new(
            i as f64 / self.resolution + self.bounds.min_lon,
            j as f64 / self.resolution + self.bounds.min_lat,
        )
    }

    /// Midpoint of a cell, where density is evaluated.
    pub fn cell_center(&self, i: usize, j: usize) -> LonLat {
        LonLat::new(
            (i as f64 + 0.5) / self.resolution + self.bounds.min_lon,
            (j as f64 + 0.5) / self.resolution + self.bounds.min_lat,
        )
    }

    /// `width + 1` longitude bin edges.
    pub fn x_edges(&self) -> Vec<f64> {
        edges(self.bounds.min_lon, self.resolution, self.width)
    }

    /// `height + 1` latitude bin edges.
    pub fn y_edges(&self) -> Vec<f64> {
        edges(self.bounds.min_lat, self.resolution, self.height)
    }
}

/// Largest grid [`GridSpec::new`] accepts. Every surface over the grid
/// holds one `f64` per cell.
pub const MAX_CELLS: usize = 1 << 26;

fn cell_count(cells: f64) -> usize {
    let rounded = cells.round();
    let snapped = if (cells - rounded).abs() < CELL_COUNT_SNAP {
        rounded
    } else {
        cells.ceil()
    };
    snapped.max(0.0) as usize
}

fn edges(min: f64, resolution: f64, cells: usize) -> Vec<f64> {
    (0..=cells).map(|k| min + k as f64 / resolution).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> GridSpec {
        GridSpec::new(BoundingBox::new(-1.0, -1.0, 1.0, 1.0), 1.0).unwrap()
    }

    #[test]
    fn oversized_grid_is_rejected() {
        match GridSpec::new(BoundingBox::new(-1.0, -1.0, 1.0, 1.0), 1e12) {
            Err(SpaceError::GridTooLarge { .. }) => {}
            other => panic!("expected GridTooLarge, got {other:?}"),
        }
        match GridSpec::new(BoundingBox::new(-180.0, -90.0, 180.0, 90.0), 1e300) {
            Err(SpaceError::GridTooLarge { .. }) => {}
            other => panic!("expected GridTooLarge, got {other:?}"),
        }
        // 8192 x 8192 is exactly the cap.
        assert!(GridSpec::new(BoundingBox::new(0.0, 0.0, 8192.0, 8192.0), 1.0).is_ok());
        assert!(GridSpec::new(BoundingBox::new(0.0, 0.0, 8193.0, 8192.0), 1.0).is_err());
    }

    #[test]
    fn two_by_two_grid() {
        let g = unit();
        assert_eq!(g.width(), 2);
        assert_eq!(g.height(), 2);
        assert_eq!(g.cell_count(), 4);
        assert_eq!(g.x_edges(), vec![-1.0, 0.0, 1.0]);
        assert_eq!(g.y_edges(), vec![-1.0, 0.0, 1.0]);
    }

    #[test]
    fn partial_cells_round_up() {
        let g = GridSpec::new(BoundingBox::new(-36.5, -11.0, -34.0, -8.5), 111.0).unwrap();
        assert_eq!((g.width(), g.height()), (278, 278));
        let g = GridSpec::new(BoundingBox::new(0.0, 0.0, 0.25, 1.0), 10.0).unwrap();
        assert_eq!((g.width(), g.height()), (3, 10));
    }

    #[test]
    fn near_integer_counts_snap() {
        let g = GridSpec::new(BoundingBox::new(0.0, 0.0, 0.3, 0.7), 10.0).unwrap();
        assert_eq!((g.width(), g.height()), (3, 7));
    }

    #[test]
    fn sample_points() {
        let g = unit();
        assert_eq!(g.raster_point(1, 0), LonLat::new(0.0, -1.0));
        assert_eq!(g.cell_center(1, 1), LonLat::new(0.5, 0.5));
        assert_eq!(g.offset(1, 1), 3);
        let cells: Vec<_> = g.cells().collect();
        assert_eq!(cells, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn invalid_resolution_rejected() {
        for res in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            match GridSpec::new(BoundingBox::new(0.0, 0.0, 1.0, 1.0), res) {
                Err(SpaceError::InvalidResolution { .. }) => {}
                other => panic!("expected InvalidResolution for {res}, got {other:?}"),
            }
        }
    }

    #[test]
    fn zero_extent_is_empty_grid() {
        match GridSpec::new(BoundingBox::new(0.0, 0.0, 0.0, 1.0), 1.0) {
            Err(SpaceError::EmptyGrid { width: 0, height: 1 }) => {}
            other => panic!("expected EmptyGrid, got {other:?}"),
        }
    }

    #[test]
    fn inverted_bounds_rejected() {
        match GridSpec::new(BoundingBox::new(1.0, 0.0, 0.0, 1.0), 1.0) {
            Err(SpaceError::InvalidBounds { .. }) => {}
            other => panic!("expected InvalidBounds, got {other:?}"),
        }
    }
}
