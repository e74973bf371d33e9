//! Error types for document validation.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Result type alias using ValidationError.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// A single rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// JSON pointer to the offending member ("" is the document root)
    pub path: String,
    /// JSON Schema keyword of the OGC schema rule that failed (`type`,
    /// `required`, `enum`, ...), or `ordering` for min/max range checks
    pub keyword: &'static str,
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, keyword: &'static str, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            keyword,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        write!(f, "{}: {} [{}]", path, self.message, self.keyword)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Failed to serialize document: {0}")]
    Serialize(String),

    #[error("Document is invalid ({} violation(s)): {}", .0.len(), summarize(.0))]
    Invalid(Vec<Violation>),
}

impl ValidationError {
    /// Violations of an invalid document; empty for other errors.
    pub fn violations(&self) -> &[Violation] {
        match self {
            ValidationError::Invalid(violations) => violations,
            _ => &[],
        }
    }
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        ValidationError::InvalidJson(err.to_string())
    }
}

fn summarize(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
