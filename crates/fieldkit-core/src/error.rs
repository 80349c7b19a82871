//! Error handling for FieldKit core
//!
//! Provides error types for the geometry and unit layers:
//! - Geometry errors (degenerate input to a reshape)
//! - Unit errors (length and coordinate text that cannot be parsed)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Geometry error type
///
/// Geometry errors are always recoverable; callers fall back to leaving the
/// outline unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// The edge has zero length, so it has no direction to extend along
    #[error("Edge has zero length")]
    DegenerateEdge,
}

/// Unit parsing error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitsError {
    /// Length text could not be parsed
    #[error("Invalid length '{0}'")]
    InvalidLength(String),

    /// Length unit suffix is not recognised
    #[error("Unknown length unit '{0}'")]
    UnknownUnit(String),

    /// Coordinate text is not a valid `lat,lng` pair
    #[error("Invalid coordinate '{0}'")]
    InvalidCoordinate(String),
}

/// Main error type for FieldKit core
#[derive(Error, Debug)]
pub enum Error {
    /// Geometry error
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Unit error
    #[error(transparent)]
    Units(#[from] UnitsError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a geometry error
    pub fn is_geometry_error(&self) -> bool {
        matches!(self, Error::Geometry(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
