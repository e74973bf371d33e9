//! Structural validation of OGC TileMatrixSet and TileSet documents.
//!
//! Every rule is checked and all violations are reported together, each
//! located by a JSON pointer into the document.

mod checker;
pub mod error;
mod tile_matrix_set;
mod tile_set;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;
use tms_common::TileMatrixSetDocument;
use tracing::debug;

use checker::Checker;
pub use error::{ValidationError, ValidationResult, Violation};

/// Kind of document to validate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    TileMatrixSet,
    TileSet,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::TileMatrixSet => write!(f, "tile-matrix-set"),
            DocumentKind::TileSet => write!(f, "tile-set"),
        }
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tile-matrix-set" | "tilematrixset" | "tms" => Ok(DocumentKind::TileMatrixSet),
            "tile-set" | "tileset" => Ok(DocumentKind::TileSet),
            other => Err(format!(
                "unknown document kind '{}', expected tile-matrix-set or tile-set",
                other
            )),
        }
    }
}

/// Validate raw JSON bytes as a document of the given kind.
pub fn validate_document(kind: DocumentKind, bytes: &[u8]) -> ValidationResult<()> {
    let value: Value = serde_json::from_slice(bytes)?;
    validate_value(kind, &value)
}

/// Validate an already parsed JSON value.
pub fn validate_value(kind: DocumentKind, value: &Value) -> ValidationResult<()> {
    let mut checker = Checker::default();
    match kind {
        DocumentKind::TileMatrixSet => tile_matrix_set::check(&mut checker, value),
        DocumentKind::TileSet => tile_set::check(&mut checker, value),
    }
    let result = checker.finish();
    if let Err(err) = &result {
        debug!(%kind, violations = err.violations().len(), "document failed validation");
    }
    result
}

pub fn validate_tile_matrix_set_json(bytes: &[u8]) -> ValidationResult<()> {
    validate_document(DocumentKind::TileMatrixSet, bytes)
}

pub fn validate_tile_set_json(bytes: &[u8]) -> ValidationResult<()> {
    validate_document(DocumentKind::TileSet, bytes)
}

/// Serialize a document model and validate the result.
pub fn validate_tile_matrix_set(document: &TileMatrixSetDocument) -> ValidationResult<()> {
    let value =
        serde_json::to_value(document).map_err(|e| ValidationError::Serialize(e.to_string()))?;
    validate_value(DocumentKind::TileMatrixSet, &value)
}

/// Serialize any TileSet representation and validate the result.
pub fn validate_tile_set<T: Serialize>(tile_set: &T) -> ValidationResult<()> {
    let value =
        serde_json::to_value(tile_set).map_err(|e| ValidationError::Serialize(e.to_string()))?;
    validate_value(DocumentKind::TileSet, &value)
}
