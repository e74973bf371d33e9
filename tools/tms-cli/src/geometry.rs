//! GeoJSON geometry input.

use std::fs;

use anyhow::{bail, Context, Result};
use geo::{Geometry, GeometryCollection};
use geojson::GeoJson;

/// Read a geometry argument: inline GeoJSON, or `@path` to a GeoJSON file.
pub fn read_geometry_arg(arg: &str) -> Result<Geometry<f64>> {
    let text = match arg.strip_prefix('@') {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read geometry file {}", path))?,
        None => arg.to_string(),
    };
    parse_geometry(&text)
}

/// Parse a GeoJSON geometry, feature or feature collection.
///
/// Feature collections become a geometry collection of their features'
/// geometries.
pub fn parse_geometry(text: &str) -> Result<Geometry<f64>> {
    let geojson: GeoJson = text.trim().parse().context("Invalid GeoJSON")?;

    match geojson {
        GeoJson::Geometry(geometry) => convert(geometry),
        GeoJson::Feature(feature) => match feature.geometry {
            Some(geometry) => convert(geometry),
            None => bail!("GeoJSON feature has no geometry"),
        },
        GeoJson::FeatureCollection(collection) => {
            let geometries = collection
                .features
                .into_iter()
                .filter_map(|feature| feature.geometry)
                .map(convert)
                .collect::<Result<Vec<_>>>()?;
            if geometries.is_empty() {
                bail!("GeoJSON feature collection has no geometries");
            }
            Ok(Geometry::GeometryCollection(GeometryCollection::from(
                geometries,
            )))
        }
    }
}

fn convert(geometry: geojson::Geometry) -> Result<Geometry<f64>> {
    Geometry::<f64>::try_from(geometry).context("Unsupported GeoJSON geometry")
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::temp_json_file;

    #[test]
    fn test_parse_point() {
        let geometry = parse_geometry(r#"{"type":"Point","coordinates":[13.4,52.5]}"#).unwrap();
        assert_eq!(geometry, Geometry::Point(geo::point!(x: 13.4, y: 52.5)));
    }

    #[test]
    fn test_parse_feature() {
        let geometry = parse_geometry(
            r#"{"type":"Feature","properties":{},"geometry":{"type":"LineString","coordinates":[[0,0],[1,1]]}}"#,
        )
        .unwrap();
        assert!(matches!(geometry, Geometry::LineString(_)));
    }

    #[test]
    fn test_parse_feature_collection() {
        let geometry = parse_geometry(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{},"geometry":{"type":"Point","coordinates":[0,0]}},
                {"type":"Feature","properties":{},"geometry":{"type":"Point","coordinates":[1,1]}}
            ]}"#,
        )
        .unwrap();
        match geometry {
            Geometry::GeometryCollection(collection) => assert_eq!(collection.0.len(), 2),
            other => panic!("expected a collection, got {:?}", other),
        }
    }

    #[test]
    fn test_feature_without_geometry() {
        let err = parse_geometry(r#"{"type":"Feature","properties":{},"geometry":null}"#)
            .unwrap_err();
        assert!(err.to_string().contains("no geometry"));
    }

    #[test]
    fn test_invalid_geojson() {
        assert!(parse_geometry("{not json").is_err());
    }

    #[test]
    fn test_read_from_file() {
        let file = temp_json_file(r#"{"type":"Point","coordinates":[1,2]}"#);
        let arg = format!("@{}", file.path().display());
        let geometry = read_geometry_arg(&arg).unwrap();
        assert_eq!(geometry, Geometry::Point(geo::point!(x: 1.0, y: 2.0)));
    }
}
