//! The live oil-particle set.
//!
//! [`ParticleSet`] stores positions as two parallel coordinate arrays.
//! The arrays are private so the `lon.len() == lat.len()` invariant can
//! only be established through checked constructors.

use crate::error::LengthMismatch;
use crate::geo::{BoundingBox, LonLat};

/// Ordered set of oil-particle positions.
///
/// Order matters: bin assignments and consumption address particles by
/// their index in this ordering. Removal preserves the relative order of
/// the remaining particles.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParticleSet {
    lon: Vec<f64>,
    lat: Vec<f64>,
}

impl ParticleSet {
    /// An empty particle set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from parallel coordinate arrays.
    pub fn from_coords(lon: Vec<f64>, lat: Vec<f64>) -> Result<Self, LengthMismatch> {
        if lon.len() != lat.len() {
            return Err(LengthMismatch {
                lon: lon.len(),
                lat: lat.len(),
            });
        }
        Ok(Self { lon, lat })
    }

    /// Build a set from points.
    pub fn from_points(points: impl IntoIterator<Item = LonLat>) -> Self {
        let (lon, lat) = points.into_iter().map(|p| (p.lon, p.lat)).unzip();
        Self { lon, lat }
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.lon.len()
    }

    /// Whether the set holds no particles.
    pub fn is_empty(&self) -> bool {
        self.lon.is_empty()
    }

    /// Longitudes, in particle order.
    pub fn lon(&self) -> &[f64] {
        &self.lon
    }

    /// Latitudes, in particle order.
    pub fn lat(&self) -> &[f64] {
        &self.lat
    }

    /// Position of particle `i`.
    pub fn get(&self, i: usize) -> Option<LonLat> {
        Some(LonLat::new(*self.lon.get(i)?, *self.lat.get(i)?))
    }

    /// Iterate over positions in particle order.
    pub fn iter(&self) -> impl Iterator<Item = LonLat> + '_ {
        self.lon
            .iter()
            .zip(&self.lat)
            .map(|(&lon, &lat)| LonLat::new(lon, lat))
    }

    /// Append one particle.
    pub fn push(&mut self, p: LonLat) {
        self.lon.push(p.lon);
        self.lat.push(p.lat);
    }

    /// Append every particle of `other`, preserving its order.
    pub fn extend_from(&mut self, other: &ParticleSet) {
        self.lon.extend_from_slice(&other.lon);
        self.lat.extend_from_slice(&other.lat);
    }

    /// Particles at the given indices, in the order the indices are listed.
    ///
    /// Out-of-range indices are skipped.
    pub fn select(&self, indices: &[usize]) -> ParticleSet {
        indices.iter().filter_map(|&i| self.get(i)).collect()
    }

    /// Particles inside `window` (inclusive), in particle order.
    pub fn within(&self, window: &BoundingBox) -> ParticleSet {
        self.iter().filter(|p| window.contains(p)).collect()
    }

    /// Remove the particles at `indices` from both arrays.
    ///
    /// Duplicate and out-of-range indices are ignored. The relative order
    /// of the remaining particles is preserved. Returns the number of
    /// particles actually removed.
    pub fn remove_indices(&mut self, indices: &[usize]) -> usize {
        if indices.is_empty() {
            return 0;
        }
        let mut doomed = vec![false; self.len()];
        for &i in indices {
            if let Some(slot) = doomed.get_mut(i) {
                *slot = true;
            }
        }
        let removed = doomed.iter().filter(|&&d| d).count();
        let mut keep = doomed.iter().map(|&d| !d);
        self.lon.retain(|_| keep.next().unwrap_or(true));
        let mut keep = doomed.iter().map(|&d| !d);
        self.lat.retain(|_| keep.next().unwrap_or(true));
        removed
    }
}

impl FromIterator<LonLat> for ParticleSet {
    fn from_iter<I: IntoIterator<Item = LonLat>>(iter: I) -> Self {
        Self::from_points(iter)
    }
}
