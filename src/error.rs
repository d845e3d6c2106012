//! Error types for trellis-viz operations.

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while planning or rendering a figure.
///
/// Every variant except [`Error::EmptySelection`] aborts the render call
/// before a figure is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Invalid layout or panel configuration (legend position, panel arity).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A requested dimension is not part of the table.
    #[error("Dimension '{name}' not found, table has dimensions {available:?}")]
    DimensionNotFound {
        /// Requested dimension name.
        name: String,
        /// Dimensions the table actually carries.
        available: Vec<String>,
    },

    /// More comparison roles were requested than the plot family supports.
    #[error("Too many dimensions: {count} requested, at most {max} supported")]
    TooManyDimensions {
        /// Number of requested dimensions.
        count: usize,
        /// Maximum supported by the plot family.
        max: usize,
    },

    /// No rows match a panel's coordinates.
    #[error("Empty selection: no rows match {coordinates}")]
    EmptySelection {
        /// Human readable panel coordinates.
        coordinates: String,
    },

    /// Table contents do not have the shape the operation expects.
    #[error("Data shape error: {0}")]
    DataShape(String),

    /// A row was pushed with the wrong number of keys or values.
    #[error("Data length mismatch: expected {expected} elements, got {actual}")]
    DataLengthMismatch {
        /// Expected element count.
        expected: usize,
        /// Provided element count.
        actual: usize,
    },

    /// Empty data provided where non-empty is required.
    #[error("Empty data provided")]
    EmptyData,

    /// Scale domain error (e.g., log of non-positive value).
    #[error("Scale domain error: {0}")]
    ScaleDomain(String),

    /// Invalid grid or matrix dimensions.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Width (columns).
        width: usize,
        /// Height (rows).
        height: usize,
    },
}

impl Error {
    /// Whether the caller may recover locally (render a blank panel and go on).
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::EmptySelection { .. })
    }
}
