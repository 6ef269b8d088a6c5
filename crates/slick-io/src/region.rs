//! JSON patrol regions: `{"outer": [[lon, lat], ...], "inner": [...], "coastline": [...]}`.

use std::fs;
use std::path::Path;

use slick_space::{Region, RegionShape};

use crate::error::LoadError;

/// Read and validate a region file.
pub fn load_region(path: impl AsRef<Path>) -> Result<RegionShape, LoadError> {
    parse_region(&fs::read_to_string(path)?)
}

/// Parse and validate a region document.
///
/// The shape is returned as written; validation only checks that it
/// describes a usable [`Region`].
pub fn parse_region(text: &str) -> Result<RegionShape, LoadError> {
    let shape: RegionShape = serde_json::from_str(text)?;
    Region::from_shape(&shape).map_err(|e| LoadError::Invalid {
        reason: e.to_string(),
    })?;
    Ok(shape)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_outer_and_inner() {
        let shape = parse_region(
            r#"{
                "outer": [[-1, -1], [1, -1], [1, 1], [-1, 1]],
                "inner": [[[-0.5, -0.5], [0.5, -0.5], [0.5, 0.5]]]
            }"#,
        )
        .unwrap();
        assert_eq!(shape.outer.len(), 4);
        assert_eq!(shape.inner.len(), 1);
        assert!(shape.coastline.is_none());
    }

    #[test]
    fn degenerate_ring_is_invalid() {
        match parse_region(r#"{"outer": [[0, 0], [1, 1]]}"#) {
            Err(LoadError::Invalid { .. }) => {}
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        match parse_region(r#"{"outer": [[0, 0], [1, "#) {
            Err(LoadError::Parse(_)) => {}
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_io() {
        match load_region("/nonexistent/slick/region.json") {
            Err(LoadError::Io(_)) => {}
            other => panic!("expected Io, got {other:?}"),
        }
    }
}
