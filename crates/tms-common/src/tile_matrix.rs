//! Tile math for a single zoom level.
//!
//! Converts between grid CRS coordinates and tile indices, computes tile
//! bounds and the tiles covering a box or a geometry. Rows covered by a
//! variable matrix width rule merge `coalesce` adjacent columns into one
//! wider tile.

use std::borrow::Cow;

use geo::{BoundingRect, Geometry};
use tracing::trace;

use crate::bounds::Bounds;
use crate::clip::clip_geometry;
use crate::document::{CornerOfOrigin, TileMatrix};
use crate::error::{TmsError, TmsResult};
use crate::projector::Projector;
use crate::tile::{TileIndex, TileRange};

impl TileMatrix {
    /// Ground resolution (units per pixel), i.e. the cell size.
    pub fn resolution(&self) -> f64 {
        self.cell_size
    }

    /// Tile dimensions in ground units.
    pub fn tile_size(&self) -> (f64, f64) {
        (self.tile_size_x(), self.tile_size_y())
    }

    fn tile_size_x(&self) -> f64 {
        self.cell_size * self.tile_width as f64
    }

    fn tile_size_y(&self) -> f64 {
        self.cell_size * self.tile_height as f64
    }

    /// Number of addressable columns in `row` and the coalesce factor
    /// applying to it.
    pub fn row_info(&self, row: u32) -> (u32, u32) {
        self.variable_matrix_widths
            .iter()
            .find(|rule| rule.covers(row))
            .map(|rule| {
                let coalesce = rule.coalesce.max(1);
                (self.matrix_width / coalesce, coalesce)
            })
            .unwrap_or((self.matrix_width, 1))
    }

    /// Full extent of the matrix in the grid CRS.
    pub fn extent(&self) -> Bounds {
        let [origin_x, origin_y] = self.point_of_origin;
        let width = self.tile_size_x() * self.matrix_width as f64;
        let height = self.tile_size_y() * self.matrix_height as f64;
        match self.corner_of_origin {
            CornerOfOrigin::TopLeft => {
                Bounds::new(origin_x, origin_y - height, origin_x + width, origin_y)
            }
            CornerOfOrigin::BottomLeft => {
                Bounds::new(origin_x, origin_y, origin_x + width, origin_y + height)
            }
        }
    }

    /// Check the level definition for values the tile math cannot work with.
    pub fn validate(&self) -> TmsResult<()> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(TmsError::invalid_matrix(
                &self.id,
                format!("cellSize must be positive, got {}", self.cell_size),
            ));
        }
        if self.tile_width == 0 || self.tile_height == 0 {
            return Err(TmsError::invalid_matrix(&self.id, "tile dimensions must be positive"));
        }
        if self.matrix_width == 0 || self.matrix_height == 0 {
            return Err(TmsError::invalid_matrix(&self.id, "matrix dimensions must be positive"));
        }
        if !self.point_of_origin.iter().all(|v| v.is_finite()) {
            return Err(TmsError::invalid_matrix(&self.id, "pointOfOrigin must be finite"));
        }
        for rule in &self.variable_matrix_widths {
            if rule.coalesce == 0 {
                return Err(TmsError::invalid_matrix(&self.id, "coalesce must be at least 1"));
            }
            if rule.min_tile_row > rule.max_tile_row {
                return Err(TmsError::invalid_matrix(
                    &self.id,
                    format!(
                        "variable matrix width rows {}..{} are reversed",
                        rule.min_tile_row, rule.max_tile_row
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Fractional column and row of a grid CRS coordinate.
    fn fractional_position(&self, x: f64, y: f64) -> (f64, f64) {
        let [origin_x, origin_y] = self.point_of_origin;
        let col = (x - origin_x) / self.tile_size_x();
        let row = match self.corner_of_origin {
            CornerOfOrigin::BottomLeft => (y - origin_y) / self.tile_size_y(),
            CornerOfOrigin::TopLeft => (origin_y - y) / self.tile_size_y(),
        };
        (col, row)
    }

    /// Tile containing a grid CRS coordinate.
    ///
    /// In a coalesced row the raw column is mapped onto the merged tile that
    /// contains it. Raw columns at or past the row's addressable column count
    /// yield `None` even when they lie inside the matrix width.
    pub fn tile_for_xy(&self, x: f64, y: f64) -> Option<TileIndex> {
        let (col, row) = self.fractional_position(x, y);
        let (col, row) = (col.floor(), row.floor());

        if !(col >= 0.0 && row >= 0.0) {
            return None;
        }
        if col >= self.matrix_width as f64 || row >= self.matrix_height as f64 {
            return None;
        }

        let (col, row) = (col as u32, row as u32);
        let (columns, coalesce) = self.row_info(row);
        if coalesce > 1 {
            if col >= columns {
                return None;
            }
            return Some(TileIndex::new(col / coalesce, row));
        }

        Some(TileIndex::new(col, row))
    }

    /// Tile containing a geographic coordinate.
    ///
    /// A projection failure is reported as no tile.
    pub fn tile_for_lon_lat(
        &self,
        lon: f64,
        lat: f64,
        projector: &dyn Projector,
    ) -> Option<TileIndex> {
        let (x, y) = projector.forward(lon, lat).ok()?;
        self.tile_for_xy(x, y)
    }

    /// Bounds of a tile in the grid CRS.
    pub fn bounds_for_tile(&self, index: TileIndex) -> TmsResult<Bounds> {
        let TileIndex { col, row } = index;
        if col >= self.matrix_width || row >= self.matrix_height {
            return Err(TmsError::TileOutOfMatrix { col, row });
        }

        let (columns, coalesce) = self.row_info(row);
        if col >= columns {
            return Err(TmsError::TileOutOfRowWidth {
                col,
                row,
                width: columns,
            });
        }

        let [origin_x, origin_y] = self.point_of_origin;
        let tile_width = self.tile_size_x() * coalesce as f64;
        let tile_height = self.tile_size_y();

        let min_x = origin_x + col as f64 * tile_width;
        let max_x = min_x + tile_width;

        let (min_y, max_y) = match self.corner_of_origin {
            CornerOfOrigin::BottomLeft => {
                let min_y = origin_y + row as f64 * tile_height;
                (min_y, min_y + tile_height)
            }
            CornerOfOrigin::TopLeft => {
                let max_y = origin_y - row as f64 * tile_height;
                (max_y - tile_height, max_y)
            }
        };

        Ok(Bounds::new(min_x, min_y, max_x, max_y))
    }

    /// Bounds of a tile in geographic degrees.
    ///
    /// Only the lower-left and upper-right corners are inverse projected, so
    /// the result approximates the true footprint for curved projections.
    pub fn bounds_for_tile_geographic(
        &self,
        index: TileIndex,
        projector: &dyn Projector,
    ) -> TmsResult<Bounds> {
        let b = self.bounds_for_tile(index)?;
        let lower_left = projector.inverse(b.min_x, b.min_y)?;
        let upper_right = projector.inverse(b.max_x, b.max_y)?;
        Ok(Bounds::from_corners(lower_left, upper_right))
    }

    /// Inclusive range of tiles overlapping a box in the grid CRS, clamped to
    /// the matrix.
    ///
    /// The range is computed on the uncoalesced grid. A zero-width or
    /// zero-height box sitting on a tile edge resolves to the tile
    /// [`TileMatrix::tile_for_xy`] would pick.
    pub fn tile_range_for_bounds(&self, bounds: &Bounds) -> Option<TileRange> {
        if !bounds.is_valid() {
            return None;
        }

        let (min_col, max_col) = {
            let [origin_x, _] = self.point_of_origin;
            let size = self.tile_size_x();
            let min = ((bounds.min_x - origin_x) / size).floor();
            let max = ((bounds.max_x - origin_x) / size).ceil() - 1.0;
            (min, max.max(min))
        };

        let (min_row, max_row) = {
            let [_, origin_y] = self.point_of_origin;
            let size = self.tile_size_y();
            let (min, max) = match self.corner_of_origin {
                CornerOfOrigin::BottomLeft => (
                    ((bounds.min_y - origin_y) / size).floor(),
                    ((bounds.max_y - origin_y) / size).ceil() - 1.0,
                ),
                CornerOfOrigin::TopLeft => (
                    ((origin_y - bounds.max_y) / size).floor(),
                    ((origin_y - bounds.min_y) / size).ceil() - 1.0,
                ),
            };
            (min, max.max(min))
        };

        let width = self.matrix_width as f64;
        let height = self.matrix_height as f64;
        if max_col < 0.0 || max_row < 0.0 || min_col >= width || min_row >= height {
            return None;
        }

        Some(TileRange::new(
            min_col.max(0.0) as u32,
            max_col.min(width - 1.0) as u32,
            min_row.max(0.0) as u32,
            max_row.min(height - 1.0) as u32,
        ))
    }

    /// All tiles overlapping a box in the grid CRS.
    pub fn tiles_for_bounds(&self, bounds: &Bounds) -> Vec<TileIndex> {
        self.tile_range_for_bounds(bounds)
            .map(|range| range.iter().collect())
            .unwrap_or_default()
    }

    /// Tiles covering a geometry given in the grid CRS.
    ///
    /// A positive `buffer` (grid units) grows the geometry's bounding box
    /// and the grown box stands in for the geometry. A zero or negative
    /// buffer leaves the geometry as it is; coverage is never shrunk. A candidate tile is
    /// kept when the geometry clips to something inside it or when the tile
    /// touches the geometry's bounding box. In coalesced rows the candidate
    /// columns are mapped onto the merged tiles. Results are ordered row by
    /// row, left to right.
    pub fn tiles_for_geometry(&self, geometry: &Geometry<f64>, buffer: f64) -> Vec<TileIndex> {
        let Some(rect) = geometry.bounding_rect() else {
            return Vec::new();
        };

        let mut envelope = Bounds::from(rect);
        let target: Cow<'_, Geometry<f64>> = if buffer > 0.0 {
            envelope = envelope.expand(buffer);
            Cow::Owned(Geometry::Polygon(envelope.to_polygon()))
        } else {
            Cow::Borrowed(geometry)
        };

        let Some(range) = self.tile_range_for_bounds(&envelope) else {
            return Vec::new();
        };

        let mut tiles = Vec::new();
        for row in range.min_row..=range.max_row {
            let (columns, coalesce) = self.row_info(row);
            if columns == 0 {
                continue;
            }
            let first = range.min_col / coalesce;
            let last = (range.max_col / coalesce).min(columns - 1);

            for col in first..=last {
                let index = TileIndex::new(col, row);
                let Ok(tile_bounds) = self.bounds_for_tile(index) else {
                    continue;
                };
                if clip_geometry(&target, &tile_bounds).is_some()
                    || tile_bounds.intersects_or_touches(&envelope)
                {
                    tiles.push(index);
                }
            }
        }

        trace!(matrix = %self.id, tiles = tiles.len(), "computed geometry coverage");
        tiles
    }
}
