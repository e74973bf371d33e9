//! Resolution of a document's `crs` member into a CRS identifier.
//!
//! The identifier is what the projection layer consumes: `EPSG:<code>` when
//! an EPSG code can be recognised, otherwise the original text (an OGC URI, a
//! WKT string or a serialized PROJJSON object).

use serde_json::Value;

use crate::document::{CrsField, CrsObject};
use crate::error::{TmsError, TmsResult};

const EPSG_URI_SEGMENT: &str = "/epsg/0/";
const EPSG_URN_PREFIX: &str = "urn:ogc:def:crs:epsg::";

/// Resolve the `crs` member of a tile matrix set document.
pub fn resolve_crs(field: &CrsField) -> TmsResult<String> {
    match field {
        CrsField::Text(s) => Ok(normalize_crs(s)),
        CrsField::Object(object) => resolve_object(object),
        CrsField::Other(Value::Null) => Err(TmsError::unsupported_crs("crs is missing")),
        CrsField::Other(other) => Err(TmsError::unsupported_crs(format!(
            "unsupported crs shape: {}",
            json_kind(other)
        ))),
    }
}

fn resolve_object(object: &CrsObject) -> TmsResult<String> {
    if let Some(uri) = object.uri.as_deref().filter(|u| !u.is_empty()) {
        return Ok(normalize_crs(uri));
    }

    if let Some(wkt) = &object.wkt {
        return match wkt {
            Value::String(s) => Ok(s.clone()),
            Value::Object(_) => Ok(serde_json::to_string(wkt)?),
            other => Err(TmsError::unsupported_crs(format!(
                "unsupported wkt shape: {}",
                json_kind(other)
            ))),
        };
    }

    if object.reference_system.is_some() {
        return Err(TmsError::unsupported_crs(
            "referenceSystem definitions are not supported",
        ));
    }

    Err(TmsError::unsupported_crs("crs object has no uri or wkt"))
}

/// Normalize a textual CRS reference.
///
/// `EPSG:` prefixes are uppercased, OGC URIs with an `/EPSG/0/<code>` path
/// and `urn:ogc:def:crs:epsg::<code>` URNs become `EPSG:<code>`. Anything
/// else is returned unchanged.
pub fn normalize_crs(s: &str) -> String {
    let lower = s.to_ascii_lowercase();

    if lower.starts_with("epsg:") {
        return s.to_ascii_uppercase();
    }

    if let Some(pos) = lower.find(EPSG_URI_SEGMENT) {
        let code = s[pos + EPSG_URI_SEGMENT.len()..]
            .split('/')
            .next()
            .unwrap_or_default();
        if !code.is_empty() {
            return format!("EPSG:{}", code);
        }
    }

    if let Some(code) = lower.strip_prefix(EPSG_URN_PREFIX) {
        if !code.is_empty() {
            return format!("EPSG:{}", code);
        }
    }

    s.to_string()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
