//! Tile addressing value types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A tile position inside one tile matrix (zero-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileIndex {
    /// Column (x)
    pub col: u32,
    /// Row (y)
    pub row: u32,
}

impl TileIndex {
    pub fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

/// A tile inside a tile matrix set: zoom level plus position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub zoom: u32,
    #[serde(flatten)]
    pub index: TileIndex,
}

impl Tile {
    pub fn new(zoom: u32, col: u32, row: u32) -> Self {
        Self {
            zoom,
            index: TileIndex::new(col, row),
        }
    }

    pub fn col(&self) -> u32 {
        self.index.col
    }

    pub fn row(&self) -> u32 {
        self.index.row
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.index.col, self.index.row)
    }
}

/// Inclusive rectangular span of tile indices.
///
/// Ranges are only built with `min <= max` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRange {
    pub min_col: u32,
    pub max_col: u32,
    pub min_row: u32,
    pub max_row: u32,
}

impl TileRange {
    pub fn new(min_col: u32, max_col: u32, min_row: u32, max_row: u32) -> Self {
        Self {
            min_col,
            max_col,
            min_row,
            max_row,
        }
    }

    pub fn cols(&self) -> u32 {
        self.max_col - self.min_col + 1
    }

    pub fn rows(&self) -> u32 {
        self.max_row - self.min_row + 1
    }

    /// Number of tiles in the range.
    pub fn tile_count(&self) -> usize {
        self.cols() as usize * self.rows() as usize
    }

    pub fn contains(&self, index: TileIndex) -> bool {
        index.col >= self.min_col
            && index.col <= self.max_col
            && index.row >= self.min_row
            && index.row <= self.max_row
    }

    /// Iterate row by row, columns left to right within a row.
    pub fn iter(&self) -> impl Iterator<Item = TileIndex> {
        let (min_col, max_col) = (self.min_col, self.max_col);
        (self.min_row..=self.max_row)
            .flat_map(move |row| (min_col..=max_col).map(move |col| TileIndex::new(col, row)))
    }
}
