//! Error types for region and grid construction.

use std::fmt;

use slick_core::LengthMismatch;

/// Errors arising from region geometry or grid construction.
///
/// All of these are fatal at startup: a grid that cannot be built leaves
/// nothing for the engine to compute against.
#[derive(Debug, Clone, PartialEq)]
pub enum SpaceError {
    /// A polygon ring has no vertices.
    EmptyRing,
    /// A polygon ring has fewer than three distinct vertices.
    DegenerateRing {
        /// Distinct vertices found.
        vertices: usize,
    },
    /// Resolution (cells per degree) is not a positive finite number.
    InvalidResolution {
        /// The rejected value.
        value: f64,
    },
    /// The derived grid has zero cells on some axis.
    EmptyGrid {
        /// Columns derived from the longitude extent.
        width: usize,
        /// Rows derived from the latitude extent.
        height: usize,
    },
    /// The derived grid has more cells than [`MAX_CELLS`](crate::MAX_CELLS).
    GridTooLarge {
        /// Columns derived from the longitude extent.
        width: usize,
        /// Rows derived from the latitude extent.
        height: usize,
    },
    /// Bounds or vertices are not finite, or the extent is inverted.
    InvalidBounds {
        /// What went wrong.
        reason: String,
    },
    /// Parallel coordinate arrays differ in length.
    LengthMismatch {
        /// Longitudes supplied.
        lon: usize,
        /// Latitudes supplied.
        lat: usize,
    },
}

impl fmt::Display for SpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRing => write!(f, "polygon ring has no vertices"),
            Self::DegenerateRing { vertices } => {
                write!(f, "polygon ring needs at least 3 distinct vertices, got {vertices}")
            }
            Self::InvalidResolution { value } => {
                write!(f, "resolution must be positive and finite, got {value}")
            }
            Self::EmptyGrid { width, height } => {
                write!(f, "grid must have at least one cell, got {width}x{height}")
            }
            Self::GridTooLarge { width, height } => write!(
                f,
                "grid of {width}x{height} exceeds {} cells",
                crate::MAX_CELLS
            ),
            Self::InvalidBounds { reason } => write!(f, "invalid bounds: {reason}"),
            Self::LengthMismatch { lon, lat } => {
                write!(f, "coordinate arrays differ in length: {lon} vs {lat}")
            }
        }
    }
}

impl std::error::Error for SpaceError {}

impl From<LengthMismatch> for SpaceError {
    fn from(e: LengthMismatch) -> Self {
        Self::LengthMismatch {
            lon: e.lon,
            lat: e.lat,
        }
    }
}
