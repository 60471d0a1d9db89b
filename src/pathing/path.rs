//! Cost-annotated tile sequences
//!
//! A path only grows at its tail while a search builds it and only shrinks at
//! its head while a unit walks it.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::grid::{Tile, TileCoord};

/// Ordered tiles plus running cost and the heuristic of the last tile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    tiles: VecDeque<TileCoord>,
    cost: f32,
    heuristic: f32,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path holding a single tile
    pub fn starting_at(tile: &Tile, heuristic: f32) -> Self {
        let mut path = Self::new();
        path.append(Some(tile), heuristic, 0.0);
        path
    }

    /// Copy of another path's tiles, cost and heuristic
    pub fn continuation(other: &Path) -> Self {
        Self {
            tiles: other.tiles.clone(),
            cost: other.cost,
            heuristic: other.heuristic,
        }
    }

    /// Extend the path at its tail. A missing tile leaves the path untouched.
    pub fn append(&mut self, tile: Option<&Tile>, heuristic: f32, edge_cost: f32) {
        let Some(tile) = tile else {
            return;
        };

        // NaN fails the comparison and is clamped too
        let edge_cost = if edge_cost >= 0.0 { edge_cost } else { 0.0 };

        self.tiles.push_back(tile.coord);
        self.cost += edge_cost;
        self.heuristic = heuristic;
    }

    /// Priority key: cost so far plus estimate to the goal
    pub fn total(&self) -> f32 {
        self.cost + self.heuristic
    }

    pub fn cost(&self) -> f32 {
        self.cost
    }

    pub fn heuristic(&self) -> f32 {
        self.heuristic
    }

    pub fn pop_front(&mut self) -> Option<TileCoord> {
        self.tiles.pop_front()
    }

    pub fn peek_front(&self) -> Option<TileCoord> {
        self.tiles.front().copied()
    }

    pub fn last_tile(&self) -> Option<TileCoord> {
        self.tiles.back().copied()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn contains(&self, coord: TileCoord) -> bool {
        self.tiles.contains(&coord)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TileCoord> {
        self.tiles.iter()
    }

    /// Empty the path, cancelling movement along it
    pub fn clear(&mut self) {
        self.tiles.clear();
        self.cost = 0.0;
        self.heuristic = 0.0;
    }

    /// Swap in the tile queue of another path while keeping this one alive
    pub fn replace_tiles(&mut self, other: Path) {
        self.tiles = other.tiles;
        self.cost = other.cost;
        self.heuristic = other.heuristic;
    }
}
