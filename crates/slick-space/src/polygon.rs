//! Polygon geometry: rings, regions and closed point-in-polygon tests.
//!
//! Containment is boundary-inclusive for every ring. A point exactly on an
//! outer edge is flyable; a point exactly on an exclusion edge is not.

use serde::{Deserialize, Serialize};
use slick_core::{BoundingBox, LonLat};
use smallvec::SmallVec;

use crate::error::SpaceError;

/// Perpendicular distance (degrees) under which a point counts as lying on
/// an edge.
const EDGE_TOLERANCE: f64 = 1e-9;

/// A closed polygon ring.
///
/// The closing edge from the last vertex back to the first is implicit. A
/// repeated first vertex at the end of the input is dropped.
#[derive(Clone, Debug, PartialEq)]
pub struct Ring {
    vertices: Vec<LonLat>,
    bbox: BoundingBox,
}

impl Ring {
    /// Build a ring from its vertices.
    ///
    /// # Errors
    ///
    /// [`SpaceError::EmptyRing`] for no vertices,
    /// [`SpaceError::InvalidBounds`] for a non-finite vertex, and
    /// [`SpaceError::DegenerateRing`] for fewer than three distinct vertices.
    pub fn new(mut vertices: Vec<LonLat>) -> Result<Self, SpaceError> {
        if vertices.is_empty() {
            return Err(SpaceError::EmptyRing);
        }
        if let Some(bad) = vertices.iter().find(|v| !v.is_finite()) {
            return Err(SpaceError::InvalidBounds {
                reason: format!("non-finite vertex ({}, {})", bad.lon, bad.lat),
            });
        }
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        let mut distinct: Vec<LonLat> = Vec::with_capacity(vertices.len());
        for v in &vertices {
            if !distinct.contains(v) {
                distinct.push(*v);
            }
        }
        if distinct.len() < 3 {
            return Err(SpaceError::DegenerateRing {
                vertices: distinct.len(),
            });
        }
        let bbox = BoundingBox::from_points(&vertices).ok_or(SpaceError::EmptyRing)?;
        Ok(Self { vertices, bbox })
    }

    /// The axis-aligned rectangle `bbox` as a counter-clockwise ring.
    ///
    /// # Errors
    ///
    /// Fails if `bbox` is invalid or has zero extent on either axis.
    pub fn rectangle(bbox: &BoundingBox) -> Result<Self, SpaceError> {
        if !bbox.is_valid() {
            return Err(SpaceError::InvalidBounds {
                reason: format!("{bbox:?}"),
            });
        }
        Self::new(vec![
            LonLat::new(bbox.min_lon, bbox.min_lat),
            LonLat::new(bbox.max_lon, bbox.min_lat),
            LonLat::new(bbox.max_lon, bbox.max_lat),
            LonLat::new(bbox.min_lon, bbox.max_lat),
        ])
    }

    /// Vertices in order, without the closing repeat.
    pub fn vertices(&self) -> &[LonLat] {
        &self.vertices
    }

    /// Bounding box of the vertices.
    pub fn bounding_box(&self) -> BoundingBox {
        self.bbox
    }

    fn edges(&self) -> impl Iterator<Item = (LonLat, LonLat)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |k| (self.vertices[k], self.vertices[(k + 1) % n]))
    }

    /// Whether `p` lies on one of the ring's edges.
    pub fn on_boundary(&self, p: &LonLat) -> bool {
        self.edges().any(|(a, b)| on_segment(p, &a, &b))
    }

    /// Closed containment: interior or boundary.
    ///
    /// Uses even-odd ray casting towards `+lon` for the interior, after an
    /// explicit edge test so boundary points never depend on which side
    /// of the crossing the ray happens to fall.
    pub fn contains(&self, p: &LonLat) -> bool {
        if !self.bbox.contains(p) {
            return false;
        }
        if self.on_boundary(p) {
            return true;
        }
        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.lat > p.lat) != (b.lat > p.lat) {
                let x = a.lon + (p.lat - a.lat) * (b.lon - a.lon) / (b.lat - a.lat);
                if p.lon < x {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

fn on_segment(p: &LonLat, a: &LonLat, b: &LonLat) -> bool {
    let (dx, dy) = (b.lon - a.lon, b.lat - a.lat);
    let (px, py) = (p.lon - a.lon, p.lat - a.lat);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return px * px + py * py <= EDGE_TOLERANCE * EDGE_TOLERANCE;
    }
    let cross = dx * py - dy * px;
    if cross.abs() > EDGE_TOLERANCE * len_sq.sqrt() {
        return false;
    }
    let dot = dx * px + dy * py;
    dot >= -EDGE_TOLERANCE && dot <= len_sq + EDGE_TOLERANCE
}

/// Plain-data region description, as loaded from configuration or disk.
///
/// `coastline` is the reference point cloud for coast-distance scoring.
/// When absent, the outer ring's vertices are used.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionShape {
    /// Outer boundary, `[lon, lat]` pairs.
    pub outer: Vec<LonLat>,
    /// Exclusion polygons inside the outer boundary.
    #[serde(default)]
    pub inner: Vec<Vec<LonLat>>,
    /// Optional coastline reference points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coastline: Option<Vec<LonLat>>,
}

/// A validated patrol region: outer ring, exclusion rings and coastline.
///
/// Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    outer: Ring,
    inner: SmallVec<[Ring; 4]>,
    coastline: Vec<LonLat>,
}

impl Region {
    /// Build a region whose coastline is the outer ring's vertices.
    pub fn new(outer: Ring, inner: impl IntoIterator<Item = Ring>) -> Self {
        let coastline = outer.vertices().to_vec();
        Self {
            outer,
            inner: inner.into_iter().collect(),
            coastline,
        }
    }

    /// Replace the coastline reference cloud.
    ///
    /// # Errors
    ///
    /// Fails for an empty cloud or a non-finite point.
    pub fn with_coastline(mut self, coastline: Vec<LonLat>) -> Result<Self, SpaceError> {
        if coastline.is_empty() {
            return Err(SpaceError::InvalidBounds {
                reason: "coastline has no points".into(),
            });
        }
        if coastline.iter().any(|p| !p.is_finite()) {
            return Err(SpaceError::InvalidBounds {
                reason: "coastline has a non-finite point".into(),
            });
        }
        self.coastline = coastline;
        Ok(self)
    }

    /// A rectangular region with no exclusions.
    pub fn rectangle(bbox: &BoundingBox) -> Result<Self, SpaceError> {
        Ok(Self::new(Ring::rectangle(bbox)?, []))
    }

    /// Validate a [`RegionShape`].
    pub fn from_shape(shape: &RegionShape) -> Result<Self, SpaceError> {
        let outer = Ring::new(shape.outer.clone())?;
        let inner = shape
            .inner
            .iter()
            .map(|r| Ring::new(r.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        let region = Self::new(outer, inner);
        match &shape.coastline {
            Some(c) => region.with_coastline(c.clone()),
            None => Ok(region),
        }
    }

    /// Back to plain data.
    pub fn to_shape(&self) -> RegionShape {
        RegionShape {
            outer: self.outer.vertices().to_vec(),
            inner: self.inner.iter().map(|r| r.vertices().to_vec()).collect(),
            coastline: Some(self.coastline.clone()),
        }
    }

    /// Outer boundary ring.
    pub fn outer(&self) -> &Ring {
        &self.outer
    }

    /// Exclusion rings.
    pub fn inner(&self) -> &[Ring] {
        &self.inner
    }

    /// Coastline reference points.
    pub fn coastline(&self) -> &[LonLat] {
        &self.coastline
    }

    /// Bounding box of the outer ring.
    pub fn bounding_box(&self) -> BoundingBox {
        self.outer.bounding_box()
    }

    /// Inside the outer ring and outside every exclusion ring.
    pub fn is_flyable(&self, p: &LonLat) -> bool {
        self.outer.contains(p) && !self.inner.iter().any(|r| r.contains(p))
    }
}
