//! Errors from reading collaborator files.

use std::error::Error;
use std::fmt;
use std::io;

use slick_core::TransportError;

/// A file could not be read, parsed or accepted.
#[derive(Debug)]
pub enum LoadError {
    /// The file could not be opened, read or written.
    Io(io::Error),
    /// The file is not valid JSON for the expected shape.
    Parse(serde_json::Error),
    /// The file parsed but its content is unusable.
    Invalid {
        /// What was wrong.
        reason: String,
    },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "i/o: {e}"),
            Self::Parse(e) => write!(f, "parse: {e}"),
            Self::Invalid { reason } => write!(f, "invalid content: {reason}"),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<io::Error> for LoadError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

impl From<LoadError> for TransportError {
    fn from(e: LoadError) -> Self {
        match e {
            LoadError::Invalid { reason } => TransportError::Rejected { reason },
            other => TransportError::Io {
                reason: other.to_string(),
            },
        }
    }
}
