//! Hazard features reduced to sensitivity points.
//!
//! The document is a list of features, each a geometry and a hazard value:
//!
//! ```json
//! {"features": [
//!     {"geometry": {"type": "Point", "coordinates": [-35.2, -9.6]}, "value": 4},
//!     {"geometry": {"type": "LineString", "coordinates": [[-35.1, -9.4], [-35.0, -9.3]]}, "value": 2}
//! ]}
//! ```
//!
//! Every feature becomes one point at its vertex centroid. Features with a
//! zero value carry no hazard and are dropped.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use slick_core::LonLat;
use slick_fields::SensitivityPoint;
use tracing::debug;

use crate::error::LoadError;

#[derive(Deserialize)]
struct Document {
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    geometry: Geometry,
    value: f64,
}

#[derive(Deserialize)]
#[serde(tag = "type", content = "coordinates")]
enum Geometry {
    Point(LonLat),
    MultiPoint(Vec<LonLat>),
    LineString(Vec<LonLat>),
    MultiLineString(Vec<Vec<LonLat>>),
    Polygon(Vec<Vec<LonLat>>),
}

impl Geometry {
    fn vertices(&self) -> Vec<LonLat> {
        match self {
            Self::Point(p) => vec![*p],
            Self::MultiPoint(ps) | Self::LineString(ps) => ps.clone(),
            Self::MultiLineString(lines) => lines.iter().flatten().copied().collect(),
            Self::Polygon(rings) => rings.iter().flat_map(|r| open_ring(r)).copied().collect(),
        }
    }
}

/// A ring without its closing vertex, so the start is not counted twice.
fn open_ring(ring: &[LonLat]) -> &[LonLat] {
    match ring {
        [first, .., last] if first == last => &ring[..ring.len() - 1],
        _ => ring,
    }
}

fn centroid(vertices: &[LonLat]) -> Option<LonLat> {
    if vertices.is_empty() {
        return None;
    }
    let n = vertices.len() as f64;
    let (lon, lat) = vertices
        .iter()
        .fold((0.0, 0.0), |(lon, lat), p| (lon + p.lon, lat + p.lat));
    Some(LonLat::new(lon / n, lat / n))
}

/// Read a hazard feature file.
pub fn load_sensitivity_points(path: impl AsRef<Path>) -> Result<Vec<SensitivityPoint>, LoadError> {
    parse_sensitivity_points(&fs::read_to_string(path)?)
}

/// Parse a hazard feature document.
///
/// # Errors
///
/// [`LoadError::Invalid`] for a negative or non-finite value, a geometry
/// with no vertices, or a non-finite coordinate.
pub fn parse_sensitivity_points(text: &str) -> Result<Vec<SensitivityPoint>, LoadError> {
    let doc: Document = serde_json::from_str(text)?;
    let total = doc.features.len();
    let mut points = Vec::with_capacity(total);

    for (index, feature) in doc.features.into_iter().enumerate() {
        if !(feature.value.is_finite() && feature.value >= 0.0) {
            return Err(LoadError::Invalid {
                reason: format!("feature {index}: hazard value {} is not a finite non-negative number", feature.value),
            });
        }
        let location = centroid(&feature.geometry.vertices()).ok_or_else(|| LoadError::Invalid {
            reason: format!("feature {index}: geometry has no vertices"),
        })?;
        if !location.is_finite() {
            return Err(LoadError::Invalid {
                reason: format!("feature {index}: non-finite coordinates"),
            });
        }
        if feature.value == 0.0 {
            continue;
        }
        points.push(SensitivityPoint {
            location,
            value: feature.value,
        });
    }

    debug!(features = total, kept = points.len(), "sensitivity features loaded");
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometries_reduce_to_centroids() {
        let points = parse_sensitivity_points(
            r#"{"features": [
                {"geometry": {"type": "Point", "coordinates": [1.0, 2.0]}, "value": 3},
                {"geometry": {"type": "LineString", "coordinates": [[0, 0], [2, 0]]}, "value": 1},
                {"geometry": {"type": "Polygon", "coordinates": [[[0, 0], [2, 0], [2, 2], [0, 2], [0, 0]]]}, "value": 2},
                {"geometry": {"type": "MultiLineString", "coordinates": [[[0, 0]], [[4, 4]]]}, "value": 5}
            ]}"#,
        )
        .unwrap();
        let locations: Vec<LonLat> = points.iter().map(|p| p.location).collect();
        assert_eq!(
            locations,
            vec![
                LonLat::new(1.0, 2.0),
                LonLat::new(1.0, 0.0),
                LonLat::new(1.0, 1.0),
                LonLat::new(2.0, 2.0),
            ]
        );
        assert_eq!(points[3].value, 5.0);
    }

    #[test]
    fn zero_values_are_dropped() {
        let points = parse_sensitivity_points(
            r#"{"features": [
                {"geometry": {"type": "Point", "coordinates": [0, 0]}, "value": 0},
                {"geometry": {"type": "MultiPoint", "coordinates": [[0, 0], [1, 1]]}, "value": 0.5}
            ]}"#,
        )
        .unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].location, LonLat::new(0.5, 0.5));
    }

    #[test]
    fn negative_value_is_rejected() {
        match parse_sensitivity_points(
            r#"{"features": [{"geometry": {"type": "Point", "coordinates": [0, 0]}, "value": -1}]}"#,
        ) {
            Err(LoadError::Invalid { reason }) => assert!(reason.starts_with("feature 0")),
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn empty_geometry_is_rejected() {
        match parse_sensitivity_points(
            r#"{"features": [{"geometry": {"type": "MultiPoint", "coordinates": []}, "value": 1}]}"#,
        ) {
            Err(LoadError::Invalid { .. }) => {}
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn unknown_geometry_is_a_parse_error() {
        match parse_sensitivity_points(
            r#"{"features": [{"geometry": {"type": "Circle", "coordinates": [0, 0]}, "value": 1}]}"#,
        ) {
            Err(LoadError::Parse(_)) => {}
            other => panic!("expected Parse, got {other:?}"),
        }
    }
}
