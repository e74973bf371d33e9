//! Tests for the built-in TileMatrixSet definitions.

use std::collections::HashSet;

use geo::{polygon, Geometry};
use test_utils::fixtures::{self, WEB_MERCATOR_CELL_SIZE_0, WEB_MERCATOR_HALF_EXTENT};
use test_utils::{assert_approx_eq, assert_bounds_approx_eq, registry_document_path};
use tms_common::{Bounds, Tile, TileMatrixSetDocument};
use tms_registry::{available_names, load, load_document, RegistryError};

// ============================================================================
// Embedded documents
// ============================================================================

#[test]
fn test_embedded_documents_match_files_on_disk() {
    for name in available_names() {
        let path = registry_document_path(&name);
        let json = std::fs::read_to_string(&path).unwrap();
        let on_disk: TileMatrixSetDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(load_document(&name).unwrap(), on_disk, "{name} differs");
    }
}

#[test]
fn test_unknown_name() {
    assert_eq!(
        load("NoSuchSet").unwrap_err(),
        RegistryError::NotFound("NoSuchSet".to_string())
    );
}

#[test]
fn test_every_set_initializes() {
    for name in available_names() {
        let tms = load(&name).unwrap();
        tms.ensure_initialized()
            .unwrap_or_else(|e| panic!("{name} failed to initialize: {e}"));
        assert!(tms.crs().is_ok());
    }
}

// ============================================================================
// WebMercatorQuad
// ============================================================================

#[test]
fn test_web_mercator_quad_levels() {
    let tms = load("WebMercatorQuad").unwrap();
    assert_eq!(tms.max_zoom(), 24);
    assert_eq!(tms.crs().unwrap(), "EPSG:3857");
    assert_approx_eq!(tms.resolution_for_zoom(0).unwrap(), WEB_MERCATOR_CELL_SIZE_0, 1e-6);

    let z10 = tms.tile_matrix(10).unwrap();
    assert_eq!(z10.matrix_width, 1024);
    assert_eq!(z10.matrix_height, 1024);
}

#[test]
fn test_web_mercator_quad_bbox() {
    let tms = load("WebMercatorQuad").unwrap();
    let expected = Bounds::new(
        -WEB_MERCATOR_HALF_EXTENT,
        -WEB_MERCATOR_HALF_EXTENT,
        WEB_MERCATOR_HALF_EXTENT,
        WEB_MERCATOR_HALF_EXTENT,
    );
    assert_bounds_approx_eq!(tms.xy_bbox().unwrap(), expected, 1e-6);
}

#[test]
fn test_web_mercator_quad_berlin_tile() {
    let tms = load("WebMercatorQuad").unwrap();
    let tile = tms.tile_for_lon_lat(13.405, 52.52, 10, None).unwrap();
    assert_eq!(tile, Some(Tile::new(10, 550, 335)));

    let bounds = tms.bounds(Tile::new(10, 550, 335), None).unwrap();
    assert!(bounds.contains_point(13.405, 52.52));
}

#[test]
fn test_web_mercator_quad_berlin_coverage() {
    let tms = load("WebMercatorQuad").unwrap();
    let (min_lon, min_lat, max_lon, max_lat) = fixtures::bbox::BERLIN;
    let berlin = Geometry::Polygon(polygon![
        (x: min_lon, y: min_lat),
        (x: max_lon, y: min_lat),
        (x: max_lon, y: max_lat),
        (x: min_lon, y: max_lat),
        (x: min_lon, y: min_lat),
    ]);

    let tiles = tms
        .tiles_for_geometry_with_crs(&berlin, fixtures::crs::EPSG_4326, 10, 11, 0.0)
        .unwrap();
    assert!(tiles.contains(&Tile::new(10, 550, 335)));

    let parents: HashSet<(u32, u32)> = tiles
        .iter()
        .filter(|t| t.zoom == 10)
        .map(|t| (t.col(), t.row()))
        .collect();
    for child in tiles.iter().filter(|t| t.zoom == 11) {
        assert!(
            parents.contains(&(child.col() / 2, child.row() / 2)),
            "parent of {child} missing"
        );
    }
}

// ============================================================================
// WorldCRS84Quad
// ============================================================================

#[test]
fn test_world_crs84_quad() {
    let tms = load("WorldCRS84Quad").unwrap();
    assert_eq!(tms.max_zoom(), 17);
    assert_eq!(tms.xy_bbox().unwrap(), Bounds::new(-180.0, -90.0, 180.0, 90.0));

    let z0 = tms.tile_matrix(0).unwrap();
    assert_eq!((z0.matrix_width, z0.matrix_height), (2, 1));
    assert_eq!(
        tms.tile_for_lon_lat(10.0, 10.0, 0, None).unwrap(),
        Some(Tile::new(0, 1, 0))
    );
    assert_eq!(
        tms.tile_for_lon_lat(-10.0, -10.0, 1, None).unwrap(),
        Some(Tile::new(1, 1, 1))
    );
}

// ============================================================================
// UTM31WGS84Quad
// ============================================================================

#[test]
fn test_utm31_crs_object() {
    let tms = load("UTM31WGS84Quad").unwrap();
    assert_eq!(tms.crs().unwrap(), "EPSG:32631");

    // Central meridian on the equator sits inside the root tile
    assert_eq!(
        tms.tile_for_lon_lat(3.0, 0.0, 0, None).unwrap(),
        Some(Tile::new(0, 0, 0))
    );
}
