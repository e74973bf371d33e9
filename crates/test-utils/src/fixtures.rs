//! Common TileMatrixSet fixtures for tests.
//!
//! Each fixture returns a JSON document string so that tests exercise the
//! same deserialization path as real documents.

use serde_json::{json, Value};

/// Half the circumference of the Web Mercator sphere in meters.
pub const WEB_MERCATOR_HALF_EXTENT: f64 = 20037508.3427892;

/// Cell size of Web Mercator zoom 0 for 256 pixel tiles.
pub const WEB_MERCATOR_CELL_SIZE_0: f64 = 156543.033928041;

/// Common CRS identifiers.
pub mod crs {
    /// WGS84 geographic
    pub const EPSG_4326: &str = "EPSG:4326";

    /// Web Mercator
    pub const EPSG_3857: &str = "EPSG:3857";

    /// OGC CRS84 (lon/lat order)
    pub const CRS84_URI: &str = "http://www.opengis.net/def/crs/OGC/1.3/CRS84";
}

/// Common bounding box definitions as (min_x, min_y, max_x, max_y).
pub mod bbox {
    /// Global geographic extent
    pub const GLOBAL: (f64, f64, f64, f64) = (-180.0, -90.0, 180.0, 90.0);

    /// Berlin in degrees
    pub const BERLIN: (f64, f64, f64, f64) = (13.088, 52.338, 13.761, 52.675);

    /// Single point (degenerate bbox)
    pub const POINT: (f64, f64, f64, f64) = (0.0, 0.0, 0.0, 0.0);
}

/// One tile matrix level as JSON.
pub fn level(
    id: &str,
    cell_size: f64,
    origin: [f64; 2],
    tile_size: u32,
    matrix_width: u32,
    matrix_height: u32,
) -> Value {
    json!({
        "id": id,
        "cellSize": cell_size,
        "cornerOfOrigin": "topLeft",
        "pointOfOrigin": origin,
        "tileWidth": tile_size,
        "tileHeight": tile_size,
        "matrixWidth": matrix_width,
        "matrixHeight": matrix_height
    })
}

/// Wrap levels into a TileMatrixSet document.
pub fn document(crs: Value, levels: Vec<Value>) -> String {
    json!({
        "id": "TestSet",
        "crs": crs,
        "tileMatrices": levels
    })
    .to_string()
}

/// A Web Mercator quad tree with zooms `0..levels`.
pub fn web_mercator(levels: u32) -> String {
    let matrices = (0..levels)
        .map(|z| {
            let n = 1u32 << z;
            level(
                &z.to_string(),
                WEB_MERCATOR_CELL_SIZE_0 / n as f64,
                [-WEB_MERCATOR_HALF_EXTENT, WEB_MERCATOR_HALF_EXTENT],
                256,
                n,
                n,
            )
        })
        .collect();
    document(json!("EPSG:3857"), matrices)
}

/// A single 4x4 level of 10x10 unit tiles with origin (0, 40) where rows 0
/// and 1 coalesce two columns into one tile.
pub fn coalesced_4x4() -> String {
    let mut matrix = level("0", 1.0, [0.0, 40.0], 10, 4, 4);
    matrix["variableMatrixWidths"] = json!([
        {"coalesce": 2, "minTileRow": 0, "maxTileRow": 1}
    ]);
    document(json!("EPSG:3857"), vec![matrix])
}

/// Three levels listed out of order with numeric ids "2", "0", "1".
pub fn shuffled_ids() -> String {
    document(
        json!("EPSG:3857"),
        vec![
            level("2", 1.0, [0.0, 4.0], 1, 4, 4),
            level("0", 4.0, [0.0, 4.0], 1, 1, 1),
            level("1", 2.0, [0.0, 4.0], 1, 2, 2),
        ],
    )
}

/// Two levels that share the id "A".
pub fn duplicate_ids() -> String {
    document(
        json!("EPSG:3857"),
        vec![
            level("A", 2.0, [0.0, 2.0], 1, 1, 1),
            level("A", 1.0, [0.0, 2.0], 1, 2, 2),
        ],
    )
}

/// Levels with non-numeric ids, zoom follows document order.
pub fn named_ids() -> String {
    document(
        json!("EPSG:3857"),
        vec![
            level("coarse", 4.0, [0.0, 4.0], 1, 1, 1),
            level("medium", 2.0, [0.0, 4.0], 1, 2, 2),
            level("fine", 1.0, [0.0, 4.0], 1, 4, 4),
        ],
    )
}

/// A set with a bottom-left origin at (0, 0).
pub fn bottom_left_origin() -> String {
    let mut matrix = level("0", 1.0, [0.0, 0.0], 10, 4, 2);
    matrix["cornerOfOrigin"] = json!("bottomLeft");
    document(json!("EPSG:3857"), vec![matrix])
}

/// A set without tile matrices.
pub fn empty_set() -> String {
    document(json!("EPSG:3857"), Vec::new())
}
