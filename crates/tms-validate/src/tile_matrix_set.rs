//! TileMatrixSet document rules.

use serde_json::{Map, Value};

use crate::checker::{child, item, Checker};

pub(crate) fn check(checker: &mut Checker, root: &Value) {
    let Some(map) = checker.object("", root) else {
        return;
    };

    if let Some(crs) = checker.required("", map, "crs") {
        checker.crs("/crs", crs);
    }

    if let Some(matrices) = checker.required("", map, "tileMatrices") {
        if let Some(items) = checker.array("/tileMatrices", matrices) {
            if items.is_empty() {
                checker.fail(
                    "/tileMatrices",
                    "minItems",
                    "must contain at least one tile matrix",
                );
            }
            for (i, matrix) in items.iter().enumerate() {
                check_tile_matrix(checker, &item("/tileMatrices", i), matrix);
            }
        }
    }

    if let Some(bbox) = map.get("boundingBox") {
        check_bounding_box(checker, "/boundingBox", bbox);
    }

    for key in ["id", "title", "description", "uri"] {
        if let Some(value) = map.get(key) {
            checker.string(&child("", key), value);
        }
    }
}

fn check_tile_matrix(checker: &mut Checker, path: &str, value: &Value) {
    let Some(map) = checker.object(path, value) else {
        return;
    };

    if let Some(id) = checker.required(path, map, "id") {
        checker.string(&child(path, "id"), id);
    }
    for key in ["scaleDenominator", "cellSize"] {
        if let Some(n) = checker.required(path, map, key) {
            checker.positive_number(&child(path, key), n);
        }
    }
    if let Some(corner) = map.get("cornerOfOrigin") {
        checker.one_of(
            &child(path, "cornerOfOrigin"),
            corner,
            &["topLeft", "bottomLeft"],
        );
    }
    if let Some(origin) = checker.required(path, map, "pointOfOrigin") {
        checker.number_tuple(&child(path, "pointOfOrigin"), origin, 2);
    }
    for key in ["tileWidth", "tileHeight", "matrixWidth", "matrixHeight"] {
        if let Some(n) = checker.required(path, map, key) {
            checker.integer_at_least(&child(path, key), n, 1);
        }
    }
    if let Some(widths) = map.get("variableMatrixWidths") {
        check_variable_widths(checker, &child(path, "variableMatrixWidths"), widths);
    }
}

fn check_variable_widths(checker: &mut Checker, path: &str, value: &Value) {
    let Some(items) = checker.array(path, value) else {
        return;
    };
    for (i, rule) in items.iter().enumerate() {
        let path = item(path, i);
        let Some(map) = checker.object(&path, rule) else {
            continue;
        };
        if let Some(coalesce) = checker.required(&path, map, "coalesce") {
            checker.integer_at_least(&child(&path, "coalesce"), coalesce, 2);
        }
        let min = row_bound(checker, &path, map, "minTileRow");
        let max = row_bound(checker, &path, map, "maxTileRow");
        checker.ordered_pair(&path, ("minTileRow", min), ("maxTileRow", max));
    }
}

fn row_bound(
    checker: &mut Checker,
    path: &str,
    map: &Map<String, Value>,
    key: &str,
) -> Option<u64> {
    let value = checker.required(path, map, key)?;
    checker.integer_at_least(&child(path, key), value, 0)
}

fn check_bounding_box(checker: &mut Checker, path: &str, value: &Value) {
    let Some(map) = checker.object(path, value) else {
        return;
    };
    for key in ["lowerLeft", "upperRight"] {
        if let Some(corner) = checker.required(path, map, key) {
            checker.number_tuple(&child(path, key), corner, 2);
        }
    }
    if let Some(crs) = map.get("crs") {
        checker.crs(&child(path, "crs"), crs);
    }
}
