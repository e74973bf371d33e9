//! Error types for coordinate transforms.

use thiserror::Error;

/// Result type alias using ProjectionError.
pub type ProjectionResult<T> = Result<T, ProjectionError>;

/// Errors raised while resolving a CRS or transforming a coordinate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    /// The CRS identifier has no known projection definition.
    #[error("unsupported CRS: {0}")]
    UnsupportedCrs(String),

    /// The projection definition was rejected by the projection engine.
    #[error("invalid projection definition for {crs}: {message}")]
    InvalidDefinition { crs: String, message: String },

    /// The coordinate could not be transformed (e.g. outside the CRS domain).
    #[error("transform {source_crs} -> {target_crs} failed for ({x}, {y}): {message}")]
    TransformFailed {
        source_crs: String,
        target_crs: String,
        x: f64,
        y: f64,
        message: String,
    },
}
