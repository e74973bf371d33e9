//! Violation collector and reusable member checks.
//!
//! Checks never stop at the first problem. Each one records what it found
//! wrong and returns the decoded value when it is usable, so callers can
//! keep walking the document.

use serde_json::{Map, Value};

use crate::error::{ValidationError, ValidationResult, Violation};

/// Keyword of the row/column range rule, which the OGC schemas cannot
/// express.
pub(crate) const ORDERING: &str = "ordering";

/// Append a member name to a JSON pointer.
pub(crate) fn child(path: &str, key: &str) -> String {
    format!("{}/{}", path, key.replace('~', "~0").replace('/', "~1"))
}

/// Append an array index to a JSON pointer.
pub(crate) fn item(path: &str, index: usize) -> String {
    format!("{}/{}", path, index)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Default)]
pub(crate) struct Checker {
    violations: Vec<Violation>,
}

impl Checker {
    pub fn fail(
        &mut self,
        path: impl Into<String>,
        keyword: &'static str,
        message: impl Into<String>,
    ) {
        self.violations.push(Violation::new(path, keyword, message));
    }

    pub fn finish(self) -> ValidationResult<()> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Invalid(self.violations))
        }
    }

    pub fn object<'a>(&mut self, path: &str, value: &'a Value) -> Option<&'a Map<String, Value>> {
        match value {
            Value::Object(map) => Some(map),
            other => {
                self.fail(path, "type", format!("expected an object, got {}", kind(other)));
                None
            }
        }
    }

    /// A required member; records a violation when it is absent.
    pub fn required<'a>(
        &mut self,
        path: &str,
        map: &'a Map<String, Value>,
        key: &str,
    ) -> Option<&'a Value> {
        let value = map.get(key);
        if value.is_none() {
            self.fail(child(path, key), "required", "is required");
        }
        value
    }

    pub fn string<'a>(&mut self, path: &str, value: &'a Value) -> Option<&'a str> {
        match value {
            Value::String(s) => Some(s),
            other => {
                self.fail(path, "type", format!("expected a string, got {}", kind(other)));
                None
            }
        }
    }

    pub fn array<'a>(&mut self, path: &str, value: &'a Value) -> Option<&'a [Value]> {
        match value {
            Value::Array(items) => Some(items),
            other => {
                self.fail(path, "type", format!("expected an array, got {}", kind(other)));
                None
            }
        }
    }

    pub fn number(&mut self, path: &str, value: &Value) -> Option<f64> {
        match value.as_f64() {
            Some(n) => Some(n),
            None => {
                self.fail(path, "type", format!("expected a number, got {}", kind(value)));
                None
            }
        }
    }

    pub fn positive_number(&mut self, path: &str, value: &Value) -> Option<f64> {
        let n = self.number(path, value)?;
        if n <= 0.0 {
            self.fail(path, "exclusiveMinimum", format!("must be greater than 0, got {}", n));
            return None;
        }
        Some(n)
    }

    /// A non-negative integer no smaller than `min`.
    pub fn integer_at_least(&mut self, path: &str, value: &Value, min: u64) -> Option<u64> {
        let Some(n) = value.as_u64() else {
            self.fail(
                path,
                "type",
                format!("expected a non-negative integer, got {}", value),
            );
            return None;
        };
        if n < min {
            self.fail(path, "minimum", format!("must be at least {}, got {}", min, n));
            return None;
        }
        Some(n)
    }

    pub fn one_of(&mut self, path: &str, value: &Value, allowed: &[&str]) {
        if let Some(s) = self.string(path, value) {
            if !allowed.contains(&s) {
                self.fail(
                    path,
                    "enum",
                    format!("must be one of {}, got '{}'", allowed.join(", "), s),
                );
            }
        }
    }

    /// An array of exactly `len` numbers.
    pub fn number_tuple(&mut self, path: &str, value: &Value, len: usize) {
        let Some(items) = self.array(path, value) else {
            return;
        };
        if items.len() != len {
            let keyword = if items.len() < len { "minItems" } else { "maxItems" };
            self.fail(
                path,
                keyword,
                format!("expected {} numbers, got {}", len, items.len()),
            );
        }
        for (i, n) in items.iter().enumerate() {
            self.number(&item(path, i), n);
        }
    }

    /// `min_key <= max_key` when both decoded.
    pub fn ordered_pair(
        &mut self,
        path: &str,
        (min_key, min): (&str, Option<u64>),
        (max_key, max): (&str, Option<u64>),
    ) {
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                self.fail(
                    path,
                    ORDERING,
                    format!("{} ({}) is greater than {} ({})", min_key, min, max_key, max),
                );
            }
        }
    }

    /// A CRS reference: a string, or an object with `uri`, `wkt` or
    /// `referenceSystem`.
    pub fn crs(&mut self, path: &str, value: &Value) {
        match value {
            Value::String(s) if s.trim().is_empty() => {
                self.fail(path, "minLength", "must not be empty")
            }
            Value::String(_) => {}
            Value::Object(map) => {
                let known = ["uri", "wkt", "referenceSystem"];
                if !known.iter().any(|k| map.contains_key(*k)) {
                    self.fail(
                        path,
                        "anyOf",
                        "must contain one of uri, wkt, referenceSystem",
                    );
                }
                if let Some(uri) = map.get("uri") {
                    self.string(&child(path, "uri"), uri);
                }
            }
            other => self.fail(
                path,
                "type",
                format!("expected a string or an object, got {}", kind(other)),
            ),
        }
    }
}
