//! Shared regions and particle sets for scenario tests.

use slick_core::{BoundingBox, LonLat, ParticleSet};
use slick_space::RegionShape;

/// The `(-1, -1, 1, 1)` square: a 2x2 grid at resolution 1.
pub const UNIT_SQUARE: BoundingBox = BoundingBox::new(-1.0, -1.0, 1.0, 1.0);

/// Axis-aligned rectangle as a region shape with no exclusions.
pub fn rectangle(bbox: &BoundingBox) -> RegionShape {
    RegionShape {
        outer: vec![
            LonLat::new(bbox.min_lon, bbox.min_lat),
            LonLat::new(bbox.max_lon, bbox.min_lat),
            LonLat::new(bbox.max_lon, bbox.max_lat),
            LonLat::new(bbox.min_lon, bbox.max_lat),
        ],
        inner: Vec::new(),
        coastline: None,
    }
}

pub fn unit_square() -> RegionShape {
    rectangle(&UNIT_SQUARE)
}

/// A region whose single exclusion covers the whole outer ring.
pub fn fully_excluded(bbox: &BoundingBox) -> RegionShape {
    let mut shape = rectangle(bbox);
    shape.inner.push(shape.outer.clone());
    shape
}

/// Particle set from `(lon, lat)` pairs.
pub fn particles(points: &[(f64, f64)]) -> ParticleSet {
    ParticleSet::from_points(points.iter().map(|&(lon, lat)| LonLat::new(lon, lat)))
}

/// `n` particles spread on a diagonal through `bbox`, clear of its edges.
pub fn diagonal(bbox: &BoundingBox, n: usize) -> ParticleSet {
    let step = 1.0 / (n as f64 + 1.0);
    ParticleSet::from_points((1..=n).map(|k| {
        let t = k as f64 * step;
        LonLat::new(
            bbox.min_lon + t * bbox.width(),
            bbox.min_lat + t * bbox.height(),
        )
    }))
}
