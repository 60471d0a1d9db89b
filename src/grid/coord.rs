//! Hex tile coordinates and position snapping
//!
//! Tiles sit on rows of "pointy-top" hexes. Odd rows are staggered to the right
//! by half a tile width so that rows mesh together. Coordinates are stored in
//! offset form `(col, row)`; cube form is derived when a step distance is needed.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::config::GridConfig;

/// Offset hex coordinate of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct TileCoord {
    pub col: i32,
    pub row: i32,
}

impl TileCoord {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Is this row shifted right by half a tile?
    pub fn is_staggered_row(&self) -> bool {
        self.row.rem_euclid(2) == 1
    }

    /// All 6 neighbouring coordinates (some may not exist on a map)
    pub fn neighbors(&self) -> [TileCoord; 6] {
        let (c, r) = (self.col, self.row);
        if self.is_staggered_row() {
            [
                TileCoord::new(c + 1, r),
                TileCoord::new(c - 1, r),
                TileCoord::new(c, r - 1),
                TileCoord::new(c + 1, r - 1),
                TileCoord::new(c, r + 1),
                TileCoord::new(c + 1, r + 1),
            ]
        } else {
            [
                TileCoord::new(c + 1, r),
                TileCoord::new(c - 1, r),
                TileCoord::new(c - 1, r - 1),
                TileCoord::new(c, r - 1),
                TileCoord::new(c - 1, r + 1),
                TileCoord::new(c, r + 1),
            ]
        }
    }

    /// Cube coordinates (x, y, z) with x + y + z = 0
    pub fn to_cube(&self) -> (i32, i32, i32) {
        let x = self.col - (self.row - (self.row & 1)) / 2;
        let z = self.row;
        (x, -x - z, z)
    }

    /// Number of steps between two tiles on an unobstructed grid
    pub fn steps_to(&self, other: &TileCoord) -> u32 {
        let (x1, y1, z1) = self.to_cube();
        let (x2, y2, z2) = other.to_cube();
        (((x1 - x2).abs() + (y1 - y2).abs() + (z1 - z2).abs()) / 2) as u32
    }

    pub fn is_adjacent(&self, other: &TileCoord) -> bool {
        self.steps_to(other) == 1
    }
}

/// Converts between continuous local positions and the tile lattice
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    pub tile_width: f32,
    pub row_height: f32,
}

impl Default for GridGeometry {
    fn default() -> Self {
        GridConfig::default().into()
    }
}

impl From<GridConfig> for GridGeometry {
    fn from(config: GridConfig) -> Self {
        Self {
            tile_width: config.tile_width,
            row_height: config.row_height,
        }
    }
}

impl GridGeometry {
    pub fn new(tile_width: f32, row_height: f32) -> Self {
        Self {
            tile_width,
            row_height,
        }
    }

    fn row_offset(&self, row: i32) -> f32 {
        if row.rem_euclid(2) == 1 {
            self.tile_width / 2.0
        } else {
            0.0
        }
    }

    /// Snap a position to the nearest lattice point.
    ///
    /// The row is chosen first; x is then snapped within that row's stagger.
    pub fn snap(&self, position: Vec2) -> Vec2 {
        self.center(self.coord_of(position))
    }

    /// Tile coordinate that owns a position
    pub fn coord_of(&self, position: Vec2) -> TileCoord {
        let row = (position.y / self.row_height).round() as i32;
        let offset = self.row_offset(row);
        let col = ((position.x - offset) / self.tile_width).round() as i32;
        TileCoord::new(col, row)
    }

    /// Center of a tile in local space
    pub fn center(&self, coord: TileCoord) -> Vec2 {
        Vec2::new(
            coord.col as f32 * self.tile_width + self.row_offset(coord.row),
            coord.row as f32 * self.row_height,
        )
    }

    /// Straight-line distance between two tile centers
    pub fn distance(&self, a: TileCoord, b: TileCoord) -> f32 {
        self.center(a).distance(self.center(b))
    }
}
