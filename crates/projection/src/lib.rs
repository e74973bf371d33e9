//! Coordinate reference system transformations.
//!
//! Maps CRS identifiers (EPSG codes, OGC URIs, raw PROJ strings) onto
//! projection definitions and runs point transforms through `proj4rs`.

pub mod definitions;
pub mod error;
pub mod transform;

pub use definitions::{lookup, CrsDefinition, WGS84};
pub use error::{ProjectionError, ProjectionResult};
pub use transform::Transformer;
