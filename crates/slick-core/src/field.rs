//! Row-major grid storage: the fly mask and scalar score surfaces.
//!
//! Both types index cells as `(i, j)` where `i` is the longitude column
//! (`0..width`) and `j` the latitude row (`0..height`). Storage is
//! row-major: cell `(i, j)` lives at `j * width + i`.

use crate::score::MASKED_SCORE;

/// Boolean no-fly mask over a grid.
///
/// `1` marks a forbidden cell (outside the outer polygon or inside an
/// exclusion polygon), `0` a flyable one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlyMask {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl FlyMask {
    /// A mask with every cell flyable.
    pub fn all_flyable(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0; width * height],
        }
    }

    /// A mask with every cell forbidden.
    pub fn all_masked(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![1; width * height],
        }
    }

    /// Grid width (longitude columns).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height (latitude rows).
    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw cells, row-major, `1` = masked.
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Whether cell `(i, j)` is forbidden. Out-of-grid cells count as masked.
    pub fn is_masked(&self, i: usize, j: usize) -> bool {
        if i >= self.width || j >= self.height {
            return true;
        }
        self.cells[j * self.width + i] == 1
    }

    /// Mark cell `(i, j)` as forbidden (`true`) or flyable (`false`).
    ///
    /// # Panics
    ///
    /// Panics if `(i, j)` is outside the grid.
    pub fn set_masked(&mut self, i: usize, j: usize, masked: bool) {
        assert!(i < self.width && j < self.height, "cell ({i}, {j}) outside mask");
        self.cells[j * self.width + i] = u8::from(masked);
    }

    /// Number of flyable cells.
    pub fn flyable_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c == 0).count()
    }
}

/// A scalar value per grid cell.
///
/// Score surfaces follow one convention: values in `[0, 5]` inside the
/// fly zone and exactly `-1` in masked cells. Raw (unnormalized) fields
/// use the same storage with no range guarantee.
#[derive(Clone, Debug, PartialEq)]
pub struct Surface {
    width: usize,
    height: usize,
    values: Vec<f64>,
}

impl Surface {
    /// A surface with every cell set to `fill`.
    pub fn filled(width: usize, height: usize, fill: f64) -> Self {
        Self {
            width,
            height,
            values: vec![fill; width * height],
        }
    }

    /// Wrap row-major values.
    ///
    /// # Panics
    ///
    /// Panics if `values.len() != width * height`.
    pub fn from_values(width: usize, height: usize, values: Vec<f64>) -> Self {
        assert_eq!(
            values.len(),
            width * height,
            "surface of {width}x{height} needs {} values",
            width * height
        );
        Self {
            width,
            height,
            values,
        }
    }

    /// The all-masked baseline: `0` in flyable cells, `-1` in masked cells.
    ///
    /// This is what every score surface degrades to when there is nothing
    /// to normalize against.
    pub fn baseline(mask: &FlyMask) -> Self {
        let values = mask
            .cells()
            .iter()
            .map(|&m| if m == 1 { MASKED_SCORE } else { 0.0 })
            .collect();
        Self::from_values(mask.width(), mask.height(), values)
    }

    /// Grid width (longitude columns).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height (latitude rows).
    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw values, row-major.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value at cell `(i, j)`, or `None` outside the grid.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.width || j >= self.height {
            return None;
        }
        Some(self.values[j * self.width + i])
    }

    /// Set cell `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics if `(i, j)` is outside the grid.
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        assert!(i < self.width && j < self.height, "cell ({i}, {j}) outside surface");
        self.values[j * self.width + i] = value;
    }

    /// Rows of the surface, southernmost first.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.values.chunks(self.width.max(1))
    }

    /// Maximum value over flyable cells, or `None` if no cell is flyable.
    pub fn max_flyable(&self, mask: &FlyMask) -> Option<f64> {
        self.values
            .iter()
            .zip(mask.cells())
            .filter(|(_, &m)| m == 0)
            .map(|(&v, _)| v)
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
    }

    /// Whether any value is NaN.
    pub fn has_nan(&self) -> bool {
        self.values.iter().any(|v| v.is_nan())
    }
}
