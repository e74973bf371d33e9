//! Built-in OGC TileMatrixSet definitions.
//!
//! The documents are embedded at compile time and parsed on demand, so every
//! [`load`] returns a fresh, independently initialized [`TileMatrixSet`].

pub mod error;

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use tms_common::{TileMatrixSet, TileMatrixSetDocument};
use tracing::debug;

pub use error::{RegistryError, RegistryResult};

/// Embedded documents keyed by TileMatrixSet name.
static DOCUMENTS: Lazy<BTreeMap<&'static str, &'static str>> = Lazy::new(|| {
    BTreeMap::from([
        (
            "WebMercatorQuad",
            include_str!("../data/tilematrixset/WebMercatorQuad.json"),
        ),
        (
            "WorldCRS84Quad",
            include_str!("../data/tilematrixset/WorldCRS84Quad.json"),
        ),
        (
            "WorldMercatorWGS84Quad",
            include_str!("../data/tilematrixset/WorldMercatorWGS84Quad.json"),
        ),
        (
            "UTM31WGS84Quad",
            include_str!("../data/tilematrixset/UTM31WGS84Quad.json"),
        ),
    ])
});

/// Names of the built-in sets, sorted.
pub fn available_names() -> Vec<String> {
    DOCUMENTS.keys().map(|name| name.to_string()).collect()
}

/// Whether a built-in set with this exact name exists.
pub fn contains(name: &str) -> bool {
    DOCUMENTS.contains_key(name)
}

/// Raw JSON of a built-in set.
pub fn raw_document(name: &str) -> RegistryResult<&'static str> {
    DOCUMENTS
        .get(name)
        .copied()
        .ok_or_else(|| RegistryError::not_found(name))
}

/// Parse the document of a built-in set.
pub fn load_document(name: &str) -> RegistryResult<TileMatrixSetDocument> {
    let json = raw_document(name)?;
    let document = serde_json::from_str(json).map_err(|e| RegistryError::parse(name, e))?;
    debug!(name, "loaded built-in tile matrix set document");
    Ok(document)
}

/// Load a built-in set by name.
pub fn load(name: &str) -> RegistryResult<TileMatrixSet> {
    load_document(name).map(TileMatrixSet::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_names_sorted() {
        let names = available_names();
        assert_eq!(
            names,
            vec![
                "UTM31WGS84Quad",
                "WebMercatorQuad",
                "WorldCRS84Quad",
                "WorldMercatorWGS84Quad"
            ]
        );
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert!(contains("WebMercatorQuad"));
        assert!(!contains("webmercatorquad"));
        assert_eq!(
            load_document("webmercatorquad").unwrap_err(),
            RegistryError::NotFound("webmercatorquad".to_string())
        );
    }

    #[test]
    fn test_every_document_parses() {
        for name in available_names() {
            let doc = load_document(&name).unwrap();
            assert_eq!(doc.id.as_deref(), Some(name.as_str()));
            assert!(!doc.tile_matrices.is_empty());
        }
    }

    #[test]
    fn test_parse_error_carries_name() {
        let err = serde_json::from_str::<TileMatrixSetDocument>("{").unwrap_err();
        let err = RegistryError::parse("Broken", err);
        assert!(matches!(err, RegistryError::Parse { ref name, .. } if name == "Broken"));
        assert!(err.to_string().starts_with("Failed to parse TileMatrixSet 'Broken'"));
    }
}
