//! Path utilities for locating workspace data files in tests.

use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;

/// Returns the workspace root directory.
///
/// This is determined by walking up from the test-utils manifest directory.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Directory holding the built-in TileMatrixSet documents.
pub fn registry_data_dir() -> PathBuf {
    workspace_root()
        .join("crates")
        .join("tms-registry")
        .join("data")
        .join("tilematrixset")
}

/// Path of a built-in TileMatrixSet document by name.
pub fn registry_document_path(name: &str) -> PathBuf {
    registry_data_dir().join(format!("{}.json", name))
}

/// Write `contents` to a temporary `.json` file that lives as long as the
/// returned handle.
pub fn temp_json_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write temp file");
    file
}
