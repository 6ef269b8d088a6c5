//! Error types shared across the Slick workspace.
//!
//! Subsystem-specific errors (space construction, configuration, robot
//! feedback) live next to their subsystem; this module only holds the
//! errors produced at the boundary with external collaborators.

use std::error::Error;
use std::fmt;

/// Parallel longitude/latitude arrays of different lengths.
///
/// Every particle array at rest must satisfy `lon.len() == lat.len()`;
/// this error is returned wherever such a pair enters the system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LengthMismatch {
    /// Length of the longitude array.
    pub lon: usize,
    /// Length of the latitude array.
    pub lat: usize,
}

impl fmt::Display for LengthMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "coordinate arrays differ in length: {} longitudes, {} latitudes",
            self.lon, self.lat
        )
    }
}

impl Error for LengthMismatch {}

/// Errors reported by the oil-transport collaborator.
///
/// Returned by every [`Transport`](crate::Transport) method. The scheduler
/// treats these as per-tick failures: the tick is logged and abandoned,
/// and the next tick is still armed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportError {
    /// Reading or writing collaborator state failed.
    Io {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// The collaborator refused the request.
    Rejected {
        /// Human-readable description of the refusal.
        reason: String,
    },
    /// The collaborator produced or received mismatched coordinate arrays.
    LengthMismatch(LengthMismatch),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { reason } => write!(f, "transport i/o failed: {reason}"),
            Self::Rejected { reason } => write!(f, "transport rejected request: {reason}"),
            Self::LengthMismatch(e) => write!(f, "transport: {e}"),
        }
    }
}

impl Error for TransportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::LengthMismatch(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LengthMismatch> for TransportError {
    fn from(e: LengthMismatch) -> Self {
        Self::LengthMismatch(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_mismatch_display_names_both_lengths() {
        let e = LengthMismatch { lon: 3, lat: 2 };
        assert_eq!(
            e.to_string(),
            "coordinate arrays differ in length: 3 longitudes, 2 latitudes"
        );
    }

    #[test]
    fn transport_error_chains_length_mismatch() {
        let e = TransportError::from(LengthMismatch { lon: 1, lat: 0 });
        assert!(e.source().is_some());
        assert!(e.to_string().starts_with("transport: "));
    }

    #[test]
    fn io_error_has_no_source() {
        let e = TransportError::Io {
            reason: "disk full".into(),
        };
        assert!(e.source().is_none());
        assert_eq!(e.to_string(), "transport i/o failed: disk full");
    }
}
