//! Error types for the TileMatrixSet registry.

use thiserror::Error;

/// Result type alias using RegistryError.
pub type RegistryResult<T> = Result<T, RegistryError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("TileMatrixSet not found: {0}")]
    NotFound(String),

    #[error("Failed to parse TileMatrixSet '{name}': {message}")]
    Parse { name: String, message: String },
}

impl RegistryError {
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    pub fn parse(name: impl Into<String>, err: serde_json::Error) -> Self {
        Self::Parse {
            name: name.into(),
            message: err.to_string(),
        }
    }
}
