//! OGC TileMatrixSet tile grid engine.
//!
//! Maps between geographic or projected coordinates and the tile grid of a
//! tile matrix set, and computes the tiles covering a geometry across a
//! range of zoom levels.

pub mod bounds;
pub mod clip;
pub mod crs;
pub mod document;
pub mod error;
pub mod projector;
pub mod tile;
pub mod tile_matrix;
pub mod tile_matrix_set;

pub use bounds::{Bounds, BoundsParseError};
pub use clip::clip_geometry;
pub use crs::{normalize_crs, resolve_crs};
pub use document::{
    BoundingBox2D, CornerOfOrigin, CrsField, CrsObject, TileMatrix, TileMatrixSetDocument,
    VariableMatrixWidth,
};
pub use error::{TmsError, TmsResult};
pub use projector::{project_geometry, ProjProjector, Projector};
pub use tile::{Tile, TileIndex, TileRange};
pub use tile_matrix_set::TileMatrixSet;
