//! Window filtering and bin assignment for the live particle set.
//!
//! The filter keeps a composed index vector back into the unfiltered set;
//! consumption relies on it to delete exactly the right particles.

use slick_core::{BoundingBox, LonLat, ParticleSet};

use crate::grid::GridSpec;

/// Particles inside a window plus their positions in the unfiltered set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilteredParticles {
    /// The surviving particles, in original relative order.
    pub particles: ParticleSet,
    /// `original_indices[k]` is the index of `particles[k]` in the input.
    pub original_indices: Vec<usize>,
}

/// Keep the particles inside `window` (inclusive on every side).
///
/// Four half-plane filters run in a fixed order, `lon >= min_lon`,
/// `lon <= max_lon`, `lat >= min_lat`, `lat <= max_lat`. Each stage
/// yields indices into the previous stage's output, and those are
/// composed so the result addresses the original array. NaN coordinates
/// fail every comparison and are dropped.
pub fn filter(particles: &ParticleSet, window: &BoundingBox) -> FilteredParticles {
    let mut lon = particles.lon().to_vec();
    let mut lat = particles.lat().to_vec();
    let mut composed: Vec<usize> = (0..particles.len()).collect();

    let stages: [&dyn Fn(f64, f64) -> bool; 4] = [
        &|x, _| x >= window.min_lon,
        &|x, _| x <= window.max_lon,
        &|_, y| y >= window.min_lat,
        &|_, y| y <= window.max_lat,
    ];
    for keep in stages {
        let stage: Vec<usize> = (0..lon.len()).filter(|&k| keep(lon[k], lat[k])).collect();
        lon = stage.iter().map(|&k| lon[k]).collect();
        lat = stage.iter().map(|&k| lat[k]).collect();
        composed = stage.iter().map(|&k| composed[k]).collect();
    }

    let particles = lon
        .into_iter()
        .zip(lat)
        .map(|(x, y)| LonLat::new(x, y))
        .collect();
    FilteredParticles {
        particles,
        original_indices: composed,
    }
}

/// Index of the first interval `[edges[k], edges[k+1]]` containing `value`.
///
/// Both ends are inclusive and the lowest index wins, so a value exactly
/// on a shared edge goes to the lower cell. Values outside the edge span
/// clamp to the first or last interval.
///
/// `edges` must be sorted ascending with at least two entries.
pub fn bin_axis(value: f64, edges: &[f64]) -> usize {
    debug_assert!(edges.len() >= 2, "need at least one interval");
    let intervals = edges.len().saturating_sub(1);
    let first_not_below = edges.partition_point(|&e| e < value);
    first_not_below
        .saturating_sub(1)
        .min(intervals.saturating_sub(1))
}

/// Parallel `(bin_x, bin_y)` cell indices, one pair per filtered particle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BinAssignment {
    bin_x: Vec<usize>,
    bin_y: Vec<usize>,
}

impl BinAssignment {
    /// Column index per particle.
    pub fn bin_x(&self) -> &[usize] {
        &self.bin_x
    }

    /// Row index per particle.
    pub fn bin_y(&self) -> &[usize] {
        &self.bin_y
    }

    /// Number of assigned particles.
    pub fn len(&self) -> usize {
        self.bin_x.len()
    }

    /// Whether no particle is assigned.
    pub fn is_empty(&self) -> bool {
        self.bin_x.is_empty()
    }

    /// `(bin_x, bin_y)` of particle `k`.
    pub fn get(&self, k: usize) -> Option<(usize, usize)> {
        Some((*self.bin_x.get(k)?, *self.bin_y.get(k)?))
    }

    /// Iterate `(bin_x, bin_y)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.bin_x.iter().copied().zip(self.bin_y.iter().copied())
    }
}

/// Assign every particle to a cell by its grid bin edges.
pub fn bin(particles: &ParticleSet, x_edges: &[f64], y_edges: &[f64]) -> BinAssignment {
    BinAssignment {
        bin_x: particles.lon().iter().map(|&v| bin_axis(v, x_edges)).collect(),
        bin_y: particles.lat().iter().map(|&v| bin_axis(v, y_edges)).collect(),
    }
}

/// Filtered particles, their bins and a per-cell histogram for one grid.
///
/// Valid only for the particle set it was built from: any mutation of that
/// set invalidates the original indices and must be followed by a rebuild.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleIndex {
    grid: GridSpec,
    filtered: FilteredParticles,
    bins: BinAssignment,
    counts: Vec<u32>,
}

impl ParticleIndex {
    /// Filter `particles` to the grid bounds and bin the survivors.
    pub fn build(particles: &ParticleSet, grid: &GridSpec) -> Self {
        let filtered = filter(particles, &grid.bounds());
        let bins = bin(&filtered.particles, &grid.x_edges(), &grid.y_edges());
        let mut counts = vec![0u32; grid.cell_count()];
        for (x, y) in bins.iter() {
            counts[grid.offset(x, y)] += 1;
        }
        Self {
            grid: *grid,
            filtered,
            bins,
            counts,
        }
    }

    /// Grid the index was built for.
    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    /// Particles inside the grid bounds.
    pub fn particles(&self) -> &ParticleSet {
        &self.filtered.particles
    }

    /// Filtered-to-original index mapping.
    pub fn original_indices(&self) -> &[usize] {
        &self.filtered.original_indices
    }

    /// Bin per filtered particle.
    pub fn bins(&self) -> &BinAssignment {
        &self.bins
    }

    /// Particle count per cell, row-major. Derived from the bins.
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// Count in cell `(x, y)`, zero outside the grid.
    pub fn count_at(&self, x: usize, y: usize) -> u32 {
        if !self.grid.contains_cell(x, y) {
            return 0;
        }
        self.counts[self.grid.offset(x, y)]
    }

    /// Original indices of every particle binned to `(x, y)`, ascending.
    pub fn originals_in_cell(&self, x: usize, y: usize) -> Vec<usize> {
        self.bins
            .iter()
            .zip(&self.filtered.original_indices)
            .filter(|((bx, by), _)| *bx == x && *by == y)
            .map(|(_, &orig)| orig)
            .collect()
    }
}
