//! TileSet metadata document rules.

use serde_json::Value;

use crate::checker::{child, item, Checker};

pub(crate) fn check(checker: &mut Checker, root: &Value) {
    let Some(map) = checker.object("", root) else {
        return;
    };

    if let Some(data_type) = checker.required("", map, "dataType") {
        checker.one_of("/dataType", data_type, &["map", "vector", "coverage"]);
    }

    if let Some(crs) = checker.required("", map, "crs") {
        checker.crs("/crs", crs);
    }

    if let Some(links) = checker.required("", map, "links") {
        if let Some(items) = checker.array("/links", links) {
            for (i, link) in items.iter().enumerate() {
                let path = item("/links", i);
                let Some(link) = checker.object(&path, link) else {
                    continue;
                };
                for key in ["href", "rel"] {
                    if let Some(value) = checker.required(&path, link, key) {
                        checker.string(&child(&path, key), value);
                    }
                }
            }
        }
    }

    if let Some(limits) = map.get("tileMatrixSetLimits") {
        if let Some(items) = checker.array("/tileMatrixSetLimits", limits) {
            for (i, limit) in items.iter().enumerate() {
                check_limit(checker, &item("/tileMatrixSetLimits", i), limit);
            }
        }
    }
}

fn check_limit(checker: &mut Checker, path: &str, value: &Value) {
    let Some(map) = checker.object(path, value) else {
        return;
    };

    if let Some(id) = checker.required(path, map, "tileMatrix") {
        checker.string(&child(path, "tileMatrix"), id);
    }

    let mut bound = |key: &str| {
        let value = checker.required(path, map, key)?;
        checker.integer_at_least(&child(path, key), value, 0)
    };
    let min_row = bound("minTileRow");
    let max_row = bound("maxTileRow");
    let min_col = bound("minTileCol");
    let max_col = bound("maxTileCol");

    checker.ordered_pair(path, ("minTileRow", min_row), ("maxTileRow", max_row));
    checker.ordered_pair(path, ("minTileCol", min_col), ("maxTileCol", max_col));
}
