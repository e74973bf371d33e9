//! Command implementations.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tms_common::{Bounds, Tile, TileMatrixSet};
use tms_validate::{validate_document, DocumentKind, ValidationError, Violation};
use tracing::{debug, info};

use crate::geometry::read_geometry_arg;
use crate::output::{emit, OutputFormat};

/// Resolve `--tms`: a registry name first, then a path on disk.
pub fn load_tile_matrix_set(name_or_path: &str) -> Result<TileMatrixSet> {
    if tms_registry::contains(name_or_path) {
        debug!(name = name_or_path, "using built-in tile matrix set");
        return Ok(tms_registry::load(name_or_path)?);
    }

    let path = Path::new(name_or_path);
    if !path.exists() {
        bail!(
            "Unknown TileMatrixSet '{}' (built-in sets: {})",
            name_or_path,
            tms_registry::available_names().join(", ")
        );
    }

    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read TileMatrixSet document {}", path.display()))?;
    let tms = TileMatrixSet::from_json(&json)
        .with_context(|| format!("Failed to parse TileMatrixSet document {}", path.display()))?;
    info!(path = %path.display(), "loaded custom tile matrix set");
    Ok(tms)
}

// ============================================================================
// list / info
// ============================================================================

pub fn list(format: OutputFormat) -> Result<()> {
    emit(format, &tms_registry::available_names(), |names| names.join("\n"))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelReport {
    pub zoom: u32,
    pub id: String,
    pub cell_size: f64,
    pub matrix_width: u32,
    pub matrix_height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoReport {
    pub id: Option<String>,
    pub title: Option<String>,
    pub crs: String,
    pub min_zoom: u32,
    pub max_zoom: u32,
    pub bbox: Bounds,
    pub levels: Vec<LevelReport>,
}

pub fn info_report(tms: &TileMatrixSet) -> Result<InfoReport> {
    tms.ensure_initialized()?;

    let levels = (tms.min_zoom()..=tms.max_zoom())
        .map(|zoom| -> Result<LevelReport> {
            let m = tms.tile_matrix(zoom)?;
            Ok(LevelReport {
                zoom,
                id: m.id,
                cell_size: m.cell_size,
                matrix_width: m.matrix_width,
                matrix_height: m.matrix_height,
                tile_width: m.tile_width,
                tile_height: m.tile_height,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let document = tms.document();
    Ok(InfoReport {
        id: document.id.clone(),
        title: document.title.clone(),
        crs: tms.crs()?,
        min_zoom: tms.min_zoom(),
        max_zoom: tms.max_zoom(),
        bbox: tms.xy_bbox()?,
        levels,
    })
}

fn format_info(report: &InfoReport) -> String {
    let mut lines = vec![
        format!("id:       {}", report.id.as_deref().unwrap_or("-")),
        format!("title:    {}", report.title.as_deref().unwrap_or("-")),
        format!("crs:      {}", report.crs),
        format!("zooms:    {}..={}", report.min_zoom, report.max_zoom),
        format!("bbox:     {}", format_bounds(&report.bbox)),
        "levels:".to_string(),
    ];
    lines.extend(report.levels.iter().map(|l| {
        format!(
            "  {:>3}  id={:<8} cellSize={:<20} matrix={}x{} tile={}x{}",
            l.zoom, l.id, l.cell_size, l.matrix_width, l.matrix_height, l.tile_width, l.tile_height
        )
    }));
    lines.join("\n")
}

pub fn info(tms_arg: &str, format: OutputFormat) -> Result<()> {
    let tms = load_tile_matrix_set(tms_arg)?;
    let report = info_report(&tms)?;
    emit(format, &report, format_info)
}

// ============================================================================
// tile / bounds
// ============================================================================

pub fn tile(tms_arg: &str, lon: f64, lat: f64, zoom: u32, format: OutputFormat) -> Result<()> {
    let tms = load_tile_matrix_set(tms_arg)?;
    let tile = tms.tile_for_lon_lat(lon, lat, zoom, None)?;
    emit(format, &tile, |tile| match tile {
        Some(tile) => tile.to_string(),
        None => format!("no tile at zoom {} contains ({}, {})", zoom, lon, lat),
    })
}

fn format_bounds(b: &Bounds) -> String {
    format!("{},{},{},{}", b.min_x, b.min_y, b.max_x, b.max_y)
}

pub fn tile_bounds(
    tms: &TileMatrixSet,
    zoom: u32,
    col: u32,
    row: u32,
    geographic: bool,
) -> Result<Bounds> {
    let tile = Tile::new(zoom, col, row);
    let bounds = if geographic {
        tms.bounds(tile, None)?
    } else {
        tms.xy_bounds(tile)?
    };
    Ok(bounds)
}

pub fn bounds(
    tms_arg: &str,
    zoom: u32,
    col: u32,
    row: u32,
    geographic: bool,
    format: OutputFormat,
) -> Result<()> {
    let tms = load_tile_matrix_set(tms_arg)?;
    let bounds = tile_bounds(&tms, zoom, col, row, geographic)?;
    emit(format, &bounds, format_bounds)
}

// ============================================================================
// cover
// ============================================================================

#[derive(Debug)]
pub struct CoverRequest<'a> {
    pub geometry: &'a str,
    pub crs: &'a str,
    pub min_zoom: u32,
    pub max_zoom: u32,
    pub buffer: f64,
}

pub fn cover_tiles(tms: &TileMatrixSet, request: &CoverRequest<'_>) -> Result<Vec<Tile>> {
    let geometry = read_geometry_arg(request.geometry)?;
    let tiles = tms.tiles_for_geometry_with_crs(
        &geometry,
        request.crs,
        request.min_zoom,
        request.max_zoom,
        request.buffer,
    )?;
    info!(tiles = tiles.len(), "computed coverage");
    Ok(tiles)
}

pub fn cover(tms_arg: &str, request: &CoverRequest<'_>, format: OutputFormat) -> Result<()> {
    let tms = load_tile_matrix_set(tms_arg)?;
    let tiles = cover_tiles(&tms, request)?;
    emit(format, &tiles, |tiles| {
        tiles
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    })
}

// ============================================================================
// validate
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub file: String,
    pub kind: String,
    pub valid: bool,
    pub violations: Vec<Violation>,
}

pub fn validation_report(file: &Path, kind: DocumentKind) -> Result<ValidationReport> {
    let bytes = fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;

    let violations = match validate_document(kind, &bytes) {
        Ok(()) => Vec::new(),
        Err(ValidationError::Invalid(violations)) => violations,
        Err(err) => return Err(err).with_context(|| format!("Cannot validate {}", file.display())),
    };

    Ok(ValidationReport {
        file: file.display().to_string(),
        kind: kind.to_string(),
        valid: violations.is_empty(),
        violations,
    })
}

fn format_validation(report: &ValidationReport) -> String {
    if report.valid {
        return format!("{}: valid {}", report.file, report.kind);
    }
    let mut lines = vec![format!(
        "{}: invalid {} ({} violation(s))",
        report.file,
        report.kind,
        report.violations.len()
    )];
    lines.extend(report.violations.iter().map(|v| format!("  {}", v)));
    lines.join("\n")
}

pub fn validate(file: &Path, kind: DocumentKind, format: OutputFormat) -> Result<()> {
    let report = validation_report(file, kind)?;
    emit(format, &report, format_validation)?;
    if !report.valid {
        bail!("{} is not a valid {}", report.file, report.kind);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{assert_approx_eq, fixtures, temp_json_file};

    #[test]
    fn test_load_by_name() {
        let tms = load_tile_matrix_set("WorldCRS84Quad").unwrap();
        assert_eq!(tms.document().id.as_deref(), Some("WorldCRS84Quad"));
    }

    #[test]
    fn test_load_by_path() {
        let file = temp_json_file(&fixtures::web_mercator(2));
        let tms = load_tile_matrix_set(&file.path().display().to_string()).unwrap();
        assert_eq!(tms.max_zoom(), 1);
    }

    #[test]
    fn test_load_unknown() {
        let err = load_tile_matrix_set("NoSuchSet").unwrap_err();
        assert!(err.to_string().contains("WebMercatorQuad"));
    }

    #[test]
    fn test_info_report() {
        let tms = load_tile_matrix_set("WebMercatorQuad").unwrap();
        let report = info_report(&tms).unwrap();
        assert_eq!(report.crs, "EPSG:3857");
        assert_eq!(report.levels.len(), 25);
        assert_eq!(report.levels[3].matrix_width, 8);

        let text = format_info(&report);
        assert!(text.contains("zooms:    0..=24"));
    }

    #[test]
    fn test_info_report_empty_set() {
        let tms = TileMatrixSet::from_json(&fixtures::empty_set()).unwrap();
        assert!(info_report(&tms).is_err());
    }

    #[test]
    fn test_tile_bounds_geographic() {
        let tms = load_tile_matrix_set("WebMercatorQuad").unwrap();
        let b = tile_bounds(&tms, 1, 1, 0, true).unwrap();
        assert_approx_eq!(b.min_x, 0.0, 1e-6);
        assert_approx_eq!(b.max_x, 180.0, 1e-6);
        assert_approx_eq!(b.min_y, 0.0, 1e-6);
        assert_approx_eq!(b.max_y, 85.0511287798, 1e-6);
    }

    #[test]
    fn test_cover_point() {
        let tms = load_tile_matrix_set("WebMercatorQuad").unwrap();
        let request = CoverRequest {
            geometry: r#"{"type":"Point","coordinates":[13.405,52.52]}"#,
            crs: "EPSG:4326",
            min_zoom: 10,
            max_zoom: 10,
            buffer: 0.0,
        };
        let tiles = cover_tiles(&tms, &request).unwrap();
        assert_eq!(tiles, vec![Tile::new(10, 550, 335)]);
    }

    #[test]
    fn test_validation_report() {
        let file = temp_json_file(r#"{"crs":"EPSG:3857","tileMatrices":[]}"#);
        let report = validation_report(file.path(), DocumentKind::TileMatrixSet).unwrap();
        assert!(!report.valid);
        assert_eq!(report.violations.len(), 1);
        assert!(format_validation(&report).contains("/tileMatrices"));

        let file = temp_json_file(tms_registry::raw_document("UTM31WGS84Quad").unwrap());
        let report = validation_report(file.path(), DocumentKind::TileMatrixSet).unwrap();
        assert!(report.valid);
    }

    #[test]
    fn test_validation_of_malformed_file() {
        let file = temp_json_file("{");
        assert!(validation_report(file.path(), DocumentKind::TileSet).is_err());
    }
}
