//! Multi-level tile matrix set.
//!
//! Wraps a [`TileMatrixSetDocument`] and orders its tile matrices by zoom.
//! The ordered, duplicate-checked view is built lazily on first use, exactly
//! once per instance, and shared by every later call. A failed build is
//! remembered and returned again by every operation that needs the view.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use geo::Geometry;
use parking_lot::{Condvar, Mutex};
use tracing::{debug, warn};

use crate::bounds::Bounds;
use crate::crs::resolve_crs;
use crate::document::{TileMatrix, TileMatrixSetDocument};
use crate::error::{TmsError, TmsResult};
use crate::projector::{project_geometry, ProjProjector, Projector};
use crate::tile::{Tile, TileIndex};

/// Zoom-ordered view of the tile matrices.
#[derive(Debug)]
struct Snapshot {
    matrices: Vec<TileMatrix>,
    zoom_by_id: HashMap<String, u32>,
}

#[derive(Debug)]
enum InitState {
    Uninitialized,
    Initializing,
    Ready(Arc<Snapshot>),
    Failed(TmsError),
}

/// Puts an unfinished build back to `Uninitialized` when the building
/// thread unwinds, so that waiters retry instead of blocking forever.
struct InitGuard<'a> {
    set: &'a TileMatrixSet,
}

impl Drop for InitGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.set.state.lock();
        if matches!(*state, InitState::Initializing) {
            *state = InitState::Uninitialized;
            self.set.initialized.notify_all();
        }
    }
}

/// A tile matrix set: tile matrices sharing one CRS, indexed by zoom.
pub struct TileMatrixSet {
    document: TileMatrixSetDocument,
    state: Mutex<InitState>,
    initialized: Condvar,
}

impl fmt::Debug for TileMatrixSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TileMatrixSet")
            .field("id", &self.document.id)
            .field("levels", &self.document.tile_matrices.len())
            .finish_non_exhaustive()
    }
}

impl From<TileMatrixSetDocument> for TileMatrixSet {
    fn from(document: TileMatrixSetDocument) -> Self {
        Self::new(document)
    }
}

impl TileMatrixSet {
    pub fn new(document: TileMatrixSetDocument) -> Self {
        Self {
            document,
            state: Mutex::new(InitState::Uninitialized),
            initialized: Condvar::new(),
        }
    }

    /// Parse a TileMatrixSet JSON document.
    pub fn from_json(json: &str) -> TmsResult<Self> {
        let document: TileMatrixSetDocument = serde_json::from_str(json)?;
        Ok(Self::new(document))
    }

    /// Serialize the underlying document.
    pub fn to_json(&self) -> TmsResult<String> {
        Ok(serde_json::to_string_pretty(&self.document)?)
    }

    pub fn document(&self) -> &TileMatrixSetDocument {
        &self.document
    }

    /// Number of tile matrices in the document.
    pub fn len(&self) -> usize {
        self.document.tile_matrices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document.tile_matrices.is_empty()
    }

    // ------------------------------------------------------------------
    // Lazy initialization
    // ------------------------------------------------------------------

    /// Build the zoom-ordered view if that has not happened yet.
    ///
    /// Concurrent callers block until the single build finishes and then
    /// all observe its outcome.
    pub fn ensure_initialized(&self) -> TmsResult<()> {
        self.snapshot().map(|_| ())
    }

    fn snapshot(&self) -> TmsResult<Arc<Snapshot>> {
        let mut state = self.state.lock();
        loop {
            match &*state {
                InitState::Ready(snapshot) => return Ok(Arc::clone(snapshot)),
                InitState::Failed(err) => return Err(err.clone()),
                InitState::Uninitialized => break,
                InitState::Initializing => {}
            }
            self.initialized.wait(&mut state);
        }
        *state = InitState::Initializing;
        drop(state);

        let _guard = InitGuard { set: self };
        let result = build_snapshot(&self.document).map(Arc::new);

        let mut state = self.state.lock();
        *state = match &result {
            Ok(snapshot) => {
                debug!(
                    id = ?self.document.id,
                    levels = snapshot.matrices.len(),
                    "initialized tile matrix set"
                );
                InitState::Ready(Arc::clone(snapshot))
            }
            Err(err) => {
                warn!(
                    id = ?self.document.id,
                    error = %err,
                    "tile matrix set initialization failed"
                );
                InitState::Failed(err.clone())
            }
        };
        self.initialized.notify_all();
        result
    }

    fn level(&self, zoom: u32) -> TmsResult<TileMatrix> {
        let snapshot = self.snapshot()?;
        snapshot
            .matrices
            .get(zoom as usize)
            .cloned()
            .ok_or(TmsError::ZoomOutOfRange {
                zoom,
                levels: snapshot.matrices.len(),
            })
    }

    // ------------------------------------------------------------------
    // Zoom and identifier resolution
    // ------------------------------------------------------------------

    /// Lowest zoom index; always 0.
    pub fn min_zoom(&self) -> u32 {
        0
    }

    /// Highest zoom index, or 0 when the set is empty or invalid.
    pub fn max_zoom(&self) -> u32 {
        self.snapshot()
            .map(|s| s.matrices.len().saturating_sub(1) as u32)
            .unwrap_or(0)
    }

    /// Tile matrix at a zoom index.
    pub fn tile_matrix(&self, zoom: u32) -> TmsResult<TileMatrix> {
        self.level(zoom)
    }

    /// Tile matrix with the given identifier.
    pub fn tile_matrix_for_id(&self, id: &str) -> TmsResult<TileMatrix> {
        let zoom = self.zoom_for_id(id)?;
        self.level(zoom)
    }

    /// Zoom index of the tile matrix with the given identifier.
    pub fn zoom_for_id(&self, id: &str) -> TmsResult<u32> {
        self.snapshot()?
            .zoom_by_id
            .get(id)
            .copied()
            .ok_or_else(|| TmsError::UnknownId(id.to_string()))
    }

    pub fn resolution_for_zoom(&self, zoom: u32) -> TmsResult<f64> {
        Ok(self.level(zoom)?.cell_size)
    }

    pub fn resolution_for_id(&self, id: &str) -> TmsResult<f64> {
        let zoom = self.zoom_for_id(id)?;
        self.resolution_for_zoom(zoom)
    }

    /// Zoom whose cell size is closest to `resolution` among the levels with
    /// a cell size no larger than `resolution + tolerance`.
    pub fn zoom_for_resolution(&self, resolution: f64, tolerance: f64) -> TmsResult<u32> {
        let snapshot = self.snapshot()?;
        if snapshot.matrices.is_empty() {
            return Err(TmsError::EmptySet);
        }

        snapshot
            .matrices
            .iter()
            .enumerate()
            .filter(|(_, m)| m.cell_size <= resolution + tolerance)
            .map(|(zoom, m)| (zoom, (m.cell_size - resolution).abs()))
            .fold(None, |best: Option<(usize, f64)>, candidate| match best {
                Some((_, best_diff)) if best_diff <= candidate.1 => best,
                _ => Some(candidate),
            })
            .map(|(zoom, _)| zoom as u32)
            .ok_or(TmsError::NoMatchingResolution(resolution))
    }

    // ------------------------------------------------------------------
    // CRS
    // ------------------------------------------------------------------

    /// Resolved CRS identifier of the set.
    pub fn crs(&self) -> TmsResult<String> {
        resolve_crs(&self.document.crs)
    }

    /// Projector from WGS84 degrees into the set's CRS.
    pub fn projector(&self) -> TmsResult<ProjProjector> {
        ProjProjector::from_wgs84(&self.crs()?)
    }

    // ------------------------------------------------------------------
    // Bounds
    // ------------------------------------------------------------------

    /// Extent of the set in its own CRS.
    ///
    /// A declared bounding box wins; otherwise the extent spans the first and
    /// last tile of zoom 0.
    pub fn xy_bbox(&self) -> TmsResult<Bounds> {
        let snapshot = self.snapshot()?;
        let first = snapshot.matrices.first().ok_or(TmsError::EmptySet)?;

        if let Some(bbox) = &self.document.bounding_box {
            return Ok(bbox.to_bounds());
        }

        let last_row = first.matrix_height - 1;
        let (columns, _) = first.row_info(last_row);
        let min = first.bounds_for_tile(TileIndex::new(0, 0))?;
        let max = first.bounds_for_tile(TileIndex::new(columns.saturating_sub(1), last_row))?;
        Ok(min.union(&max))
    }

    /// Bounds of a tile in the set's CRS.
    pub fn xy_bounds(&self, tile: Tile) -> TmsResult<Bounds> {
        self.level(tile.zoom)?.bounds_for_tile(tile.index)
    }

    pub fn xy_bounds_for_id(&self, index: TileIndex, id: &str) -> TmsResult<Bounds> {
        self.tile_matrix_for_id(id)?.bounds_for_tile(index)
    }

    /// Bounds of a tile in geographic degrees.
    ///
    /// Without a projector, one from WGS84 into the set's CRS is built.
    pub fn bounds(&self, tile: Tile, projector: Option<&dyn Projector>) -> TmsResult<Bounds> {
        let level = self.level(tile.zoom)?;
        self.with_projector(projector, |p| level.bounds_for_tile_geographic(tile.index, p))
    }

    pub fn bounds_for_id(
        &self,
        index: TileIndex,
        id: &str,
        projector: Option<&dyn Projector>,
    ) -> TmsResult<Bounds> {
        let zoom = self.zoom_for_id(id)?;
        self.bounds(Tile { zoom, index }, projector)
    }

    // ------------------------------------------------------------------
    // Point and geometry lookups
    // ------------------------------------------------------------------

    /// Tile containing a geographic coordinate at `zoom`.
    ///
    /// `Ok(None)` when the point falls outside the matrix or cannot be
    /// projected.
    pub fn tile_for_lon_lat(
        &self,
        lon: f64,
        lat: f64,
        zoom: u32,
        projector: Option<&dyn Projector>,
    ) -> TmsResult<Option<Tile>> {
        let level = self.level(zoom)?;
        self.with_projector(projector, |p| {
            Ok(level
                .tile_for_lon_lat(lon, lat, p)
                .map(|index| Tile { zoom, index }))
        })
    }

    pub fn tile_for_lon_lat_id(
        &self,
        lon: f64,
        lat: f64,
        id: &str,
        projector: Option<&dyn Projector>,
    ) -> TmsResult<Option<Tile>> {
        let zoom = self.zoom_for_id(id)?;
        self.tile_for_lon_lat(lon, lat, zoom, projector)
    }

    /// Tiles covering a geometry (in the set's CRS) for every zoom in
    /// `min_zoom..=max_zoom`.
    ///
    /// Tiles are ordered by zoom, then row, then column. Only a positive
    /// `buffer` has an effect, see [`TileMatrix::tiles_for_geometry`].
    pub fn tiles_for_geometry(
        &self,
        geometry: &Geometry<f64>,
        min_zoom: u32,
        max_zoom: u32,
        buffer: f64,
    ) -> TmsResult<Vec<Tile>> {
        if max_zoom < min_zoom {
            return Err(TmsError::InvalidZoomRange {
                min: min_zoom,
                max: max_zoom,
            });
        }
        let snapshot = self.snapshot()?;
        let levels = snapshot.matrices.len();
        if max_zoom as usize >= levels {
            return Err(TmsError::ZoomOutOfRange {
                zoom: max_zoom,
                levels,
            });
        }

        let mut tiles = Vec::new();
        for zoom in min_zoom..=max_zoom {
            let level = &snapshot.matrices[zoom as usize];
            tiles.extend(
                level
                    .tiles_for_geometry(geometry, buffer)
                    .into_iter()
                    .map(|index| Tile { zoom, index }),
            );
        }
        Ok(tiles)
    }

    /// Like [`TileMatrixSet::tiles_for_geometry`] for a geometry given in
    /// `source_crs`.
    pub fn tiles_for_geometry_with_crs(
        &self,
        geometry: &Geometry<f64>,
        source_crs: &str,
        min_zoom: u32,
        max_zoom: u32,
        buffer: f64,
    ) -> TmsResult<Vec<Tile>> {
        let target_crs = self.crs()?;
        let projected = project_geometry(geometry, source_crs, &target_crs)?;
        self.tiles_for_geometry(&projected, min_zoom, max_zoom, buffer)
    }

    fn with_projector<T>(
        &self,
        projector: Option<&dyn Projector>,
        f: impl FnOnce(&dyn Projector) -> TmsResult<T>,
    ) -> TmsResult<T> {
        match projector {
            Some(p) => f(p),
            None => {
                let default = self.projector()?;
                f(&default)
            }
        }
    }
}

fn numeric_id(id: &str) -> Option<u32> {
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    id.parse().ok()
}

fn build_snapshot(document: &TileMatrixSetDocument) -> TmsResult<Snapshot> {
    let mut matrices = document.tile_matrices.clone();

    {
        let mut seen = HashSet::with_capacity(matrices.len());
        for (index, matrix) in matrices.iter().enumerate() {
            if matrix.id.is_empty() {
                return Err(TmsError::MissingId { index });
            }
            if !seen.insert(matrix.id.as_str()) {
                return Err(TmsError::DuplicateId(matrix.id.clone()));
            }
            matrix.validate()?;
        }
    }

    if !matrices.is_empty() && matrices.iter().all(|m| numeric_id(&m.id).is_some()) {
        matrices.sort_by_key(|m| numeric_id(&m.id));
        for (zoom, matrix) in matrices.iter().enumerate() {
            if numeric_id(&matrix.id) != Some(zoom as u32) {
                return Err(TmsError::IdZoomMismatch {
                    id: matrix.id.clone(),
                    zoom,
                });
            }
        }
    }

    let zoom_by_id = matrices
        .iter()
        .enumerate()
        .map(|(zoom, m)| (m.id.clone(), zoom as u32))
        .collect();

    Ok(Snapshot {
        matrices,
        zoom_by_id,
    })
}
