//! Tile store with explicit occupancy and selection marks
//!
//! Occupancy is a mapping from tile to the single unit standing on it. A unit
//! claims a tile when it commits to stepping there and releases it when it
//! leaves, so two units can never both believe the same tile is theirs.

use ahash::{AHashMap, AHashSet};
use glam::Vec2;

use crate::core::types::EntityId;
use crate::grid::coord::{GridGeometry, TileCoord};
use crate::grid::tile::{Terrain, Tile};

/// Result of trying to claim a tile for a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// The tile was free and now belongs to the claimant
    Claimed,
    /// The claimant already held the tile
    AlreadyOurs,
    /// Another unit holds the tile
    Taken(EntityId),
}

impl Claim {
    pub fn is_held(&self) -> bool {
        matches!(self, Claim::Claimed | Claim::AlreadyOurs)
    }
}

/// All tiles of a map plus who stands on and who highlights each one
#[derive(Debug, Clone)]
pub struct GridIndex {
    geometry: GridGeometry,
    tiles: AHashMap<TileCoord, Tile>,
    occupants: AHashMap<TileCoord, EntityId>,
    marks: AHashMap<TileCoord, AHashSet<EntityId>>,
}

impl GridIndex {
    pub fn new(geometry: GridGeometry) -> Self {
        Self {
            geometry,
            tiles: AHashMap::new(),
            occupants: AHashMap::new(),
            marks: AHashMap::new(),
        }
    }

    /// Create a rectangular map filled with one terrain
    pub fn filled(geometry: GridGeometry, cols: i32, rows: i32, terrain: Terrain) -> Self {
        let mut grid = Self::new(geometry);
        for row in 0..rows {
            for col in 0..cols {
                grid.insert_tile(TileCoord::new(col, row), terrain);
            }
        }
        grid
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Add a tile (or replace the terrain of an existing one)
    pub fn insert_tile(&mut self, coord: TileCoord, terrain: Terrain) {
        let center = self.geometry.center(coord);
        self.tiles.insert(coord, Tile::new(coord, center, terrain));
    }

    /// Change terrain of an existing tile. Returns false if the tile doesn't exist.
    pub fn set_terrain(&mut self, coord: TileCoord, terrain: Terrain) -> bool {
        match self.tiles.get_mut(&coord) {
            Some(tile) => {
                tile.terrain = terrain;
                true
            }
            None => false,
        }
    }

    pub fn tile(&self, coord: TileCoord) -> Option<&Tile> {
        self.tiles.get(&coord)
    }

    /// Tile owning a continuous position, if the map has one there
    pub fn tile_at(&self, position: Vec2) -> Option<&Tile> {
        self.tile(self.geometry.coord_of(position))
    }

    pub fn contains(&self, coord: TileCoord) -> bool {
        self.tiles.contains_key(&coord)
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Up to six neighbours of a tile. Map edges simply yield fewer.
    pub fn adjacent_tiles(&self, coord: TileCoord) -> Vec<&Tile> {
        coord
            .neighbors()
            .iter()
            .filter_map(|n| self.tiles.get(n))
            .collect()
    }

    /// Terrain cost of a tile; missing tiles cost nothing
    pub fn terrain_cost(&self, coord: TileCoord) -> f32 {
        self.tile(coord).map(|t| t.terrain_cost()).unwrap_or(0.0)
    }

    /// Straight-line distance between two tile centers
    pub fn heuristic(&self, from: TileCoord, to: TileCoord) -> f32 {
        self.geometry.distance(from, to)
    }

    // ---- Occupancy ----

    pub fn occupant(&self, coord: TileCoord) -> Option<EntityId> {
        self.occupants.get(&coord).copied()
    }

    /// Compare-and-set claim of a tile for a unit
    pub fn try_claim(&mut self, coord: TileCoord, id: EntityId) -> Claim {
        match self.occupants.get(&coord) {
            Some(holder) if *holder == id => Claim::AlreadyOurs,
            Some(holder) => Claim::Taken(*holder),
            None => {
                self.occupants.insert(coord, id);
                Claim::Claimed
            }
        }
    }

    /// Release a tile, but only if `id` is the one holding it
    pub fn release(&mut self, coord: TileCoord, id: EntityId) -> bool {
        if self.occupants.get(&coord) == Some(&id) {
            self.occupants.remove(&coord);
            true
        } else {
            false
        }
    }

    /// Drop every claim a unit holds (used when it is destroyed)
    pub fn release_all(&mut self, id: EntityId) {
        self.occupants.retain(|_, holder| *holder != id);
    }

    // ---- Selection marks ----

    pub fn mark(&mut self, coord: TileCoord, id: EntityId) {
        if self.tiles.contains_key(&coord) {
            self.marks.entry(coord).or_default().insert(id);
        }
    }

    pub fn unmark_all(&mut self, id: EntityId) {
        self.marks.retain(|_, ids| {
            ids.remove(&id);
            !ids.is_empty()
        });
    }

    pub fn is_marked(&self, coord: TileCoord) -> bool {
        self.marks.get(&coord).is_some_and(|ids| !ids.is_empty())
    }

    /// Entities currently highlighting a tile, in id order
    pub fn marked_by(&self, coord: TileCoord) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self
            .marks
            .get(&coord)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        ids.sort();
        ids
    }
}
