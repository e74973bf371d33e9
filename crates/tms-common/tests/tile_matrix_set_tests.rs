//! Tests for multi-level TileMatrixSet behavior.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use geo::{line_string, polygon, Geometry};
use serde_json::json;
use test_utils::fixtures::{self, WEB_MERCATOR_HALF_EXTENT};
use test_utils::{assert_approx_eq, assert_bounds_approx_eq};
use tms_common::{Bounds, Tile, TileIndex, TileMatrixSet, TmsError};

fn load(json: String) -> TileMatrixSet {
    TileMatrixSet::from_json(&json).unwrap()
}

fn horizontal_line() -> Geometry<f64> {
    Geometry::LineString(line_string![(x: -1e6, y: 0.0), (x: 1e6, y: 0.0)])
}

// ============================================================================
// Single-level grid properties
// ============================================================================

#[test]
fn test_round_trip_tile_centers() {
    let tms = load(fixtures::web_mercator(3));
    let level = tms.tile_matrix(2).unwrap();

    for row in 0..4 {
        for col in 0..4 {
            let index = TileIndex::new(col, row);
            let b = level.bounds_for_tile(index).unwrap();
            let (x, y) = (b.min_x + b.width() / 2.0, b.min_y + b.height() / 2.0);
            assert_eq!(level.tile_for_xy(x, y), Some(index));
            assert!(b.contains_point(x, y));
        }
    }
}

#[test]
fn test_partition_covers_extent_without_gaps() {
    let tms = load(fixtures::web_mercator(3));
    let level = tms.tile_matrix(2).unwrap();

    let mut union: Option<Bounds> = None;
    for row in 0..4 {
        for col in 0..4 {
            let b = level.bounds_for_tile(TileIndex::new(col, row)).unwrap();
            if col < 3 {
                let right = level.bounds_for_tile(TileIndex::new(col + 1, row)).unwrap();
                assert_approx_eq!(b.max_x, right.min_x, 1e-6);
            }
            if row < 3 {
                let below = level.bounds_for_tile(TileIndex::new(col, row + 1)).unwrap();
                assert_approx_eq!(b.min_y, below.max_y, 1e-6);
            }
            union = Some(union.map_or(b, |u| u.union(&b)));
        }
    }

    assert_bounds_approx_eq!(union.unwrap(), level.extent(), 1e-6);
}

#[test]
fn test_coalesced_rows() {
    let tms = load(fixtures::coalesced_4x4());
    let level = tms.tile_matrix(0).unwrap();

    assert_eq!(level.row_info(0), (2, 2));
    let first = level.bounds_for_tile(TileIndex::new(0, 0)).unwrap();
    let second = level.bounds_for_tile(TileIndex::new(1, 0)).unwrap();
    assert_eq!(first.width(), 20.0);
    assert_eq!(second.width(), 20.0);
    assert!(matches!(
        level.bounds_for_tile(TileIndex::new(2, 0)),
        Err(TmsError::TileOutOfRowWidth { width: 2, .. })
    ));

    // Uncoalesced columns 2 and 3 of row 0
    assert_eq!(level.tile_for_xy(25.0, 35.0), None);
    assert_eq!(level.tile_for_xy(35.0, 35.0), None);

    // Uncoalesced column 1 belongs to merged tile 0
    let index = level.tile_for_xy(15.0, 35.0).unwrap();
    assert_eq!(index, TileIndex::new(0, 0));
    assert!(level.bounds_for_tile(index).unwrap().contains_point(15.0, 35.0));

    // Rows outside the rule keep the full width
    assert_eq!(level.row_info(3), (4, 1));
    assert_eq!(level.tile_for_xy(35.0, 5.0), Some(TileIndex::new(3, 3)));
}

#[test]
fn test_coalesced_geometry_coverage_maps_onto_merged_tiles() {
    let tms = load(fixtures::coalesced_4x4());
    let point = Geometry::Point(geo::point!(x: 35.0, y: 35.0));

    let tiles = tms.tiles_for_geometry(&point, 0, 0, 0.0).unwrap();
    assert_eq!(tiles, vec![Tile::new(0, 1, 0)]);
}

#[test]
fn test_bottom_left_origin() {
    let tms = load(fixtures::bottom_left_origin());
    let level = tms.tile_matrix(0).unwrap();

    assert_eq!(level.tile_for_xy(5.0, 15.0), Some(TileIndex::new(0, 1)));
    assert_eq!(
        level.bounds_for_tile(TileIndex::new(0, 1)).unwrap(),
        Bounds::new(0.0, 10.0, 10.0, 20.0)
    );
    assert_eq!(tms.xy_bbox().unwrap(), Bounds::new(0.0, 0.0, 40.0, 20.0));
}

// ============================================================================
// Zoom and identifier resolution
// ============================================================================

#[test]
fn test_monotonic_zoom_ordering() {
    let tms = load(fixtures::shuffled_ids());
    assert_eq!(tms.zoom_for_id("0").unwrap(), 0);
    assert_eq!(tms.zoom_for_id("1").unwrap(), 1);
    assert_eq!(tms.min_zoom(), 0);
    assert_eq!(tms.max_zoom(), 2);
    assert_eq!(tms.resolution_for_zoom(0).unwrap(), 4.0);
    assert_eq!(tms.tile_matrix(2).unwrap().id, "2");
}

#[test]
fn test_named_ids_follow_document_order() {
    let tms = load(fixtures::named_ids());
    assert_eq!(tms.zoom_for_id("coarse").unwrap(), 0);
    assert_eq!(tms.zoom_for_id("fine").unwrap(), 2);
    assert_eq!(tms.resolution_for_id("medium").unwrap(), 2.0);
    assert_eq!(tms.tile_matrix_for_id("fine").unwrap().matrix_width, 4);
    assert_eq!(
        tms.zoom_for_id("missing").unwrap_err(),
        TmsError::UnknownId("missing".to_string())
    );
}

#[test]
fn test_duplicate_id_rejection_is_permanent() {
    let tms = load(fixtures::duplicate_ids());
    let expected = TmsError::DuplicateId("A".to_string());

    assert_eq!(tms.resolution_for_zoom(0).unwrap_err(), expected);
    assert_eq!(tms.zoom_for_id("A").unwrap_err(), expected);
    assert_eq!(tms.xy_bbox().unwrap_err(), expected);
    assert_eq!(
        tms.tiles_for_geometry(&horizontal_line(), 0, 0, 0.0)
            .unwrap_err(),
        expected
    );
    assert!(expected.is_configuration());

    // Zoom accessors degrade instead of failing
    assert_eq!(tms.min_zoom(), 0);
    assert_eq!(tms.max_zoom(), 0);
}

#[test]
fn test_zoom_for_resolution() {
    let tms = load(fixtures::web_mercator(3));
    let z1 = tms.resolution_for_zoom(1).unwrap();
    assert_eq!(tms.zoom_for_resolution(z1, 0.0).unwrap(), 1);
    assert_eq!(tms.zoom_for_resolution(z1 * 1.2, 0.0).unwrap(), 1);
    assert_eq!(tms.zoom_for_resolution(z1 * 0.9, z1).unwrap(), 1);
    assert!(matches!(
        tms.zoom_for_resolution(1.0, 0.0),
        Err(TmsError::NoMatchingResolution(_))
    ));
}

#[test]
fn test_level_validation_runs_at_initialization() {
    let mut bad = fixtures::level("0", 1.0, [0.0, 0.0], 256, 1, 1);
    bad["cellSize"] = json!(-1.0);
    let tms = load(fixtures::document(json!("EPSG:3857"), vec![bad]));
    assert!(matches!(
        tms.ensure_initialized(),
        Err(TmsError::InvalidMatrix { .. })
    ));
}

// ============================================================================
// Empty set degradation
// ============================================================================

#[test]
fn test_empty_set() {
    let tms = load(fixtures::empty_set());
    assert!(tms.is_empty());
    assert!(tms.ensure_initialized().is_ok());
    assert_eq!(tms.min_zoom(), 0);
    assert_eq!(tms.max_zoom(), 0);
    assert_eq!(tms.xy_bbox().unwrap_err(), TmsError::EmptySet);
    assert_eq!(
        tms.zoom_for_resolution(1.0, 0.0).unwrap_err(),
        TmsError::EmptySet
    );
    assert!(matches!(
        tms.resolution_for_zoom(0),
        Err(TmsError::ZoomOutOfRange { zoom: 0, levels: 0 })
    ));
}

// ============================================================================
// Bounds
// ============================================================================

#[test]
fn test_xy_bbox_from_level_zero() {
    let tms = load(fixtures::web_mercator(2));
    let bbox = tms.xy_bbox().unwrap();
    let expected = Bounds::new(
        -WEB_MERCATOR_HALF_EXTENT,
        -WEB_MERCATOR_HALF_EXTENT,
        WEB_MERCATOR_HALF_EXTENT,
        WEB_MERCATOR_HALF_EXTENT,
    );
    assert_bounds_approx_eq!(bbox, expected, 1e-3);
}

#[test]
fn test_xy_bbox_prefers_declared_box() {
    let mut doc: serde_json::Value = serde_json::from_str(&fixtures::web_mercator(1)).unwrap();
    doc["boundingBox"] = json!({"lowerLeft": [-10.0, -20.0], "upperRight": [10.0, 20.0]});
    let tms = load(doc.to_string());
    assert_eq!(tms.xy_bbox().unwrap(), Bounds::new(-10.0, -20.0, 10.0, 20.0));
}

#[test]
fn test_xy_bounds_out_of_range_zoom() {
    let tms = load(fixtures::web_mercator(2));
    assert!(matches!(
        tms.xy_bounds(Tile::new(5, 0, 0)),
        Err(TmsError::ZoomOutOfRange { zoom: 5, levels: 2 })
    ));
    assert!(matches!(
        tms.xy_bounds(Tile::new(1, 2, 0)),
        Err(TmsError::TileOutOfMatrix { col: 2, row: 0 })
    ));
}

#[test]
fn test_xy_bounds_for_id_matches_zoom() {
    let tms = load(fixtures::shuffled_ids());
    let by_id = tms.xy_bounds_for_id(TileIndex::new(1, 1), "1").unwrap();
    let by_zoom = tms.xy_bounds(Tile::new(1, 1, 1)).unwrap();
    assert_eq!(by_id, by_zoom);
}

#[test]
fn test_geographic_bounds_of_root_tile() {
    let tms = load(fixtures::web_mercator(1));
    let b = tms.bounds(Tile::new(0, 0, 0), None).unwrap();
    assert_approx_eq!(b.min_x, -180.0, 1e-6);
    assert_approx_eq!(b.max_x, 180.0, 1e-6);
    assert_approx_eq!(b.min_y, -85.0511287798, 1e-6);
    assert_approx_eq!(b.max_y, 85.0511287798, 1e-6);

    let by_id = tms.bounds_for_id(TileIndex::new(0, 0), "0", None).unwrap();
    assert_eq!(by_id, b);
}

// ============================================================================
// Point lookups
// ============================================================================

#[test]
fn test_tile_for_lon_lat() {
    let tms = load(fixtures::web_mercator(3));
    assert_eq!(
        tms.tile_for_lon_lat(13.4, 52.5, 2, None).unwrap(),
        Some(Tile::new(2, 2, 1))
    );
    assert_eq!(
        tms.tile_for_lon_lat_id(13.4, 52.5, "1", None).unwrap(),
        Some(Tile::new(1, 1, 0))
    );
}

#[test]
fn test_tile_for_lon_lat_outside_grid() {
    let tms = load(fixtures::web_mercator(3));
    // Beyond the Web Mercator latitude limit
    assert_eq!(tms.tile_for_lon_lat(0.0, 89.9, 1, None).unwrap(), None);
    // Unprojectable input
    assert_eq!(tms.tile_for_lon_lat(f64::NAN, 0.0, 1, None).unwrap(), None);
    // Zoom outside the set is still an error
    assert!(tms.tile_for_lon_lat(0.0, 0.0, 7, None).is_err());
}

// ============================================================================
// Geometry coverage
// ============================================================================

#[test]
fn test_buffered_coverage_is_superset() {
    let tms = load(fixtures::web_mercator(3));
    let line = horizontal_line();

    let plain = tms.tiles_for_geometry(&line, 0, 1, 0.0).unwrap();
    let buffered = tms.tiles_for_geometry(&line, 0, 1, 500_000.0).unwrap();

    assert!(!plain.is_empty());
    assert!(buffered.len() >= plain.len());
    for tile in &plain {
        assert!(buffered.contains(tile), "missing {tile} in buffered result");
    }

    for tiles in [&plain, &buffered] {
        let zooms: BTreeSet<u32> = tiles.iter().map(|t| t.zoom).collect();
        assert_eq!(zooms.into_iter().collect::<Vec<_>>(), vec![0, 1]);
    }
}

#[test]
fn test_negative_buffer_does_not_shrink_coverage() {
    let tms = load(fixtures::web_mercator(3));
    let line = horizontal_line();

    let plain = tms.tiles_for_geometry(&line, 2, 2, 0.0).unwrap();
    let negative = tms.tiles_for_geometry(&line, 2, 2, -500_000.0).unwrap();

    assert!(!plain.is_empty());
    assert_eq!(negative, plain);
}

#[test]
fn test_coverage_order_is_zoom_row_col() {
    let tms = load(fixtures::web_mercator(3));
    let everything = Geometry::Polygon(polygon![
        (x: -1.5e7, y: -1.5e7),
        (x: 1.5e7, y: -1.5e7),
        (x: 1.5e7, y: 1.5e7),
        (x: -1.5e7, y: 1.5e7),
        (x: -1.5e7, y: -1.5e7),
    ]);

    let tiles = tms.tiles_for_geometry(&everything, 1, 2, 0.0).unwrap();
    assert_eq!(tiles.len(), 4 + 16);

    let keys: Vec<(u32, u32, u32)> = tiles.iter().map(|t| (t.zoom, t.row(), t.col())).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

#[test]
fn test_geometry_outside_grid_yields_nothing() {
    let tms = load(fixtures::web_mercator(2));
    let far = Geometry::Point(geo::point!(x: 1e8, y: 1e8));
    assert!(tms.tiles_for_geometry(&far, 0, 1, 0.0).unwrap().is_empty());
}

#[test]
fn test_out_of_range_zooms_rejected() {
    let tms = load(fixtures::web_mercator(2));
    let line = horizontal_line();

    assert_eq!(
        tms.tiles_for_geometry(&line, 1, 0, 0.0).unwrap_err(),
        TmsError::InvalidZoomRange { min: 1, max: 0 }
    );
    assert_eq!(
        tms.tiles_for_geometry(&line, 0, 2, 0.0).unwrap_err(),
        TmsError::ZoomOutOfRange { zoom: 2, levels: 2 }
    );
}

#[test]
fn test_coverage_with_source_crs() {
    let tms = load(fixtures::web_mercator(3));
    let (min_lon, min_lat, max_lon, max_lat) = fixtures::bbox::BERLIN;
    let berlin = Geometry::Polygon(polygon![
        (x: min_lon, y: min_lat),
        (x: max_lon, y: min_lat),
        (x: max_lon, y: max_lat),
        (x: min_lon, y: max_lat),
        (x: min_lon, y: min_lat),
    ]);

    let tiles = tms
        .tiles_for_geometry_with_crs(&berlin, fixtures::crs::EPSG_4326, 0, 2, 0.0)
        .unwrap();
    assert_eq!(
        tiles,
        vec![Tile::new(0, 0, 0), Tile::new(1, 1, 0), Tile::new(2, 2, 1)]
    );
}

#[test]
fn test_coverage_with_unsupported_set_crs() {
    let doc = fixtures::document(
        json!({"referenceSystem": {"type": "custom"}}),
        vec![fixtures::level("0", 1.0, [0.0, 1.0], 1, 1, 1)],
    );
    let tms = load(doc);
    assert!(matches!(
        tms.tiles_for_geometry_with_crs(&horizontal_line(), "EPSG:4326", 0, 0, 0.0),
        Err(TmsError::UnsupportedCrs(_))
    ));
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_concurrent_initialization_shares_result() {
    let tms = Arc::new(load(fixtures::shuffled_ids()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let tms = Arc::clone(&tms);
            thread::spawn(move || tms.zoom_for_id("2").unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 2);
    }
}

#[test]
fn test_concurrent_initialization_shares_failure() {
    let tms = Arc::new(load(fixtures::duplicate_ids()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let tms = Arc::clone(&tms);
            thread::spawn(move || tms.ensure_initialized().unwrap_err())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), TmsError::DuplicateId("A".to_string()));
    }
}

// ============================================================================
// Serialization
// ============================================================================

#[test]
fn test_document_round_trip() {
    let tms = load(fixtures::coalesced_4x4());
    let again = TileMatrixSet::from_json(&tms.to_json().unwrap()).unwrap();
    assert_eq!(again.document(), tms.document());
    assert_eq!(tms.crs().unwrap(), "EPSG:3857");
}
