//! OGC TileMatrixSet document model (JSON encoding, version 2.0).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::bounds::Bounds;

/// A TileMatrixSet document as published by the OGC or supplied by callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileMatrixSetDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    /// Coordinate reference system of every tile matrix
    #[serde(default)]
    pub crs: CrsField,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordered_axes: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub well_known_scale_set: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox2D>,

    /// Tile matrices in document order
    #[serde(default)]
    pub tile_matrices: Vec<TileMatrix>,
}

/// The `crs` member of a document.
///
/// Decoded once from its JSON shape so that the resolver can match on it
/// exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum CrsField {
    /// A plain identifier: EPSG code, URI or URN.
    Text(String),
    /// An object carrying `uri`, `wkt` or `referenceSystem`.
    Object(CrsObject),
    /// Any other JSON shape, including a missing member.
    Other(Value),
}

impl Default for CrsField {
    fn default() -> Self {
        CrsField::Other(Value::Null)
    }
}

impl From<&str> for CrsField {
    fn from(s: &str) -> Self {
        CrsField::Text(s.to_string())
    }
}

impl From<Value> for CrsField {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => CrsField::Text(s),
            Value::Object(map) => match CrsObject::from_map(&map) {
                Some(object) => CrsField::Object(object),
                None => CrsField::Other(Value::Object(map)),
            },
            other => CrsField::Other(other),
        }
    }
}

impl From<CrsField> for Value {
    fn from(field: CrsField) -> Self {
        match field {
            CrsField::Text(s) => Value::String(s),
            CrsField::Object(object) => object.into_value(),
            CrsField::Other(value) => value,
        }
    }
}

/// Structured CRS reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrsObject {
    pub uri: Option<String>,
    /// WKT string or PROJJSON object
    pub wkt: Option<Value>,
    pub reference_system: Option<Value>,
}

impl CrsObject {
    pub fn from_uri(uri: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            ..Self::default()
        }
    }

    fn from_map(map: &Map<String, Value>) -> Option<Self> {
        let uri = match map.get("uri") {
            None => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return None,
        };
        let object = Self {
            uri,
            wkt: map.get("wkt").cloned(),
            reference_system: map.get("referenceSystem").cloned(),
        };
        if object.uri.is_none() && object.wkt.is_none() && object.reference_system.is_none() {
            return None;
        }
        Some(object)
    }

    fn into_value(self) -> Value {
        let mut map = Map::new();
        if let Some(uri) = self.uri {
            map.insert("uri".to_string(), Value::String(uri));
        }
        if let Some(wkt) = self.wkt {
            map.insert("wkt".to_string(), wkt);
        }
        if let Some(reference_system) = self.reference_system {
            map.insert("referenceSystem".to_string(), reference_system);
        }
        Value::Object(map)
    }
}

/// Corner of the matrix the point of origin refers to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CornerOfOrigin {
    #[default]
    TopLeft,
    BottomLeft,
}

/// One zoom level of a tile matrix set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileMatrix {
    /// Identifier (usually the zoom level as a string)
    #[serde(default)]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_denominator: Option<f64>,

    /// Ground units per pixel
    pub cell_size: f64,

    #[serde(default)]
    pub corner_of_origin: CornerOfOrigin,

    pub point_of_origin: [f64; 2],

    /// Tile width in pixels
    pub tile_width: u32,

    /// Tile height in pixels
    pub tile_height: u32,

    /// Number of tile columns
    pub matrix_width: u32,

    /// Number of tile rows
    pub matrix_height: u32,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variable_matrix_widths: Vec<VariableMatrixWidth>,
}

/// Column coalescing rule for a range of rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableMatrixWidth {
    pub coalesce: u32,
    pub min_tile_row: u32,
    pub max_tile_row: u32,
}

impl VariableMatrixWidth {
    pub fn covers(&self, row: u32) -> bool {
        row >= self.min_tile_row && row <= self.max_tile_row
    }
}

/// Overall bounding box of a tile matrix set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox2D {
    pub lower_left: [f64; 2],
    pub upper_right: [f64; 2],

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crs: Option<CrsField>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordered_axes: Option<Vec<String>>,
}

impl BoundingBox2D {
    pub fn to_bounds(&self) -> Bounds {
        Bounds::from_corners(
            (self.lower_left[0], self.lower_left[1]),
            (self.upper_right[0], self.upper_right[1]),
        )
    }
}
