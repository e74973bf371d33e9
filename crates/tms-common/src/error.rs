//! Error types for the tile grid engine.

use projection::ProjectionError;
use thiserror::Error;

/// Result type alias using TmsError.
pub type TmsResult<T> = Result<T, TmsError>;

/// Primary error type for tile matrix set operations.
///
/// Errors are `Clone` so that a failed lazy initialization can be handed
/// out again on every later call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TmsError {
    // === Configuration Errors ===
    #[error("Tile matrix at position {index} has no identifier")]
    MissingId { index: usize },

    #[error("Duplicate tile matrix identifier: {0}")]
    DuplicateId(String),

    #[error("Tile matrix identifier '{id}' does not match its zoom position {zoom}")]
    IdZoomMismatch { id: String, zoom: usize },

    #[error("Invalid tile matrix '{id}': {message}")]
    InvalidMatrix { id: String, message: String },

    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),

    #[error("Invalid tile matrix set document: {0}")]
    InvalidDocument(String),

    // === Range Errors ===
    #[error("Zoom {zoom} out of range (set has {levels} levels)")]
    ZoomOutOfRange { zoom: u32, levels: usize },

    #[error("Invalid zoom range min={min} max={max}")]
    InvalidZoomRange { min: u32, max: u32 },

    #[error("Tile out of matrix col={col} row={row}")]
    TileOutOfMatrix { col: u32, row: u32 },

    #[error("Tile out of row width col={col} row={row} (row width {width})")]
    TileOutOfRowWidth { col: u32, row: u32, width: u32 },

    #[error("Unknown tile matrix identifier: {0}")]
    UnknownId(String),

    #[error("No tile matrix matches resolution {0}")]
    NoMatchingResolution(f64),

    #[error("Tile matrix set has no tile matrices")]
    EmptySet,

    // === Transform Errors ===
    #[error("Projection error: {0}")]
    Projection(String),

    // === Geometry Errors ===
    #[error("Unsupported geometry: {0}")]
    UnsupportedGeometry(String),
}

impl TmsError {
    pub fn invalid_matrix(id: impl Into<String>, message: impl Into<String>) -> Self {
        TmsError::InvalidMatrix {
            id: id.into(),
            message: message.into(),
        }
    }

    pub fn unsupported_crs(message: impl Into<String>) -> Self {
        TmsError::UnsupportedCrs(message.into())
    }

    /// Wrap a projection failure with the operation it happened in.
    pub fn projection(context: impl Into<String>, err: ProjectionError) -> Self {
        TmsError::Projection(format!("{}: {}", context.into(), err))
    }

    /// Whether the error comes from an inconsistent document rather than
    /// from the arguments of a single call.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            TmsError::MissingId { .. }
                | TmsError::DuplicateId(_)
                | TmsError::IdZoomMismatch { .. }
                | TmsError::InvalidMatrix { .. }
                | TmsError::UnsupportedCrs(_)
                | TmsError::InvalidDocument(_)
        )
    }
}

impl From<ProjectionError> for TmsError {
    fn from(err: ProjectionError) -> Self {
        match err {
            ProjectionError::UnsupportedCrs(crs) => TmsError::UnsupportedCrs(crs),
            other => TmsError::Projection(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for TmsError {
    fn from(err: serde_json::Error) -> Self {
        TmsError::InvalidDocument(format!("JSON error: {}", err))
    }
}
