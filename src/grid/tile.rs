//! Tiles and their terrain
//!
//! Traversal time between two tiles scales with the sum of both terrain costs.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::grid::coord::TileCoord;

/// Ground type of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    #[default]
    Soil, // Packed earth, the baseline
    Grass,  // Slight drag
    Sand,   // Loose footing
    Mud,    // Heavy drag
    Stone,  // Climbing over rubble
}

impl Terrain {
    /// Traversal cost (nonnegative, 1.0 = normal)
    pub fn movement_cost(&self) -> f32 {
        match self {
            Terrain::Soil => 1.0,
            Terrain::Grass => 1.5,
            Terrain::Sand => 2.0,
            Terrain::Mud => 3.0,
            Terrain::Stone => 4.0,
        }
    }

    pub fn all() -> [Terrain; 5] {
        [
            Terrain::Soil,
            Terrain::Grass,
            Terrain::Sand,
            Terrain::Mud,
            Terrain::Stone,
        ]
    }
}

/// A single grid cell. Created at map load and never destroyed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    pub coord: TileCoord,
    pub center: Vec2,
    pub terrain: Terrain,
}

impl Tile {
    pub fn new(coord: TileCoord, center: Vec2, terrain: Terrain) -> Self {
        Self {
            coord,
            center,
            terrain,
        }
    }

    pub fn terrain_cost(&self) -> f32 {
        self.terrain.movement_cost()
    }
}
