//! Food spawners
//!
//! Every interval each spawner rolls against
//! `open_adjacent / (food_adjacent + 1) * rarity` percent and, on success,
//! drops food on one of its open neighbours. Only the side holding combat
//! authority rolls; a host sends each new food to its peer.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::core::config::SpawnerConfig;
use crate::core::types::EntityId;
use crate::grid::{GridIndex, TileCoord};
use crate::net::Authority;
use crate::objects::{MapObjects, ObjectKind, ObjectTag};

/// A tile is open when nothing but scent paths lies on it and no unit holds it
pub fn is_open(tile: TileCoord, grid: &GridIndex, objects: &MapObjects) -> bool {
    grid.occupant(tile).is_none() && objects.at(tile).all(|o| o.tag() == ObjectTag::Scentpath)
}

/// What a spawner sees around itself
#[derive(Debug, Clone, PartialEq)]
pub struct Surroundings {
    pub open_tiles: Vec<TileCoord>,
    pub food_tiles: usize,
}

impl Surroundings {
    pub fn survey(spawner_tile: TileCoord, grid: &GridIndex, objects: &MapObjects) -> Self {
        let mut open_tiles = Vec::new();
        let mut food_tiles = 0;
        for tile in grid.adjacent_tiles(spawner_tile) {
            if is_open(tile.coord, grid, objects) {
                open_tiles.push(tile.coord);
            }
            if objects.has_tag_at(tile.coord, ObjectTag::Food) {
                food_tiles += 1;
            }
        }
        Self {
            open_tiles,
            food_tiles,
        }
    }

    /// Percent chance of a spawn this roll
    pub fn chance(&self, rarity: f32) -> f32 {
        spawn_chance(self.open_tiles.len(), self.food_tiles, rarity)
    }
}

pub fn spawn_chance(open_tiles: usize, food_tiles: usize, rarity: f32) -> f32 {
    open_tiles as f32 / (food_tiles as f32 + 1.0) * rarity
}

/// Food the spawners want placed this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnRequest {
    pub spawner: EntityId,
    pub tile: TileCoord,
}

/// Interval timers and the random stream for every spawner on the map
#[derive(Debug, Clone)]
pub struct SpawnerSystem {
    config: SpawnerConfig,
    timers: BTreeMap<EntityId, f32>,
    rng: ChaCha8Rng,
}

impl SpawnerSystem {
    pub fn new(config: SpawnerConfig, seed: u64) -> Self {
        Self {
            config,
            timers: BTreeMap::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn food_value(&self) -> u32 {
        self.config.food_value
    }

    /// Advance every spawner's timer and roll the ones that are due
    pub fn update(
        &mut self,
        dt: f32,
        grid: &GridIndex,
        objects: &MapObjects,
        authority: Option<&Authority>,
    ) -> Vec<SpawnRequest> {
        let mut requests = Vec::new();

        for object in objects.iter() {
            let ObjectKind::FoodSpawner { rarity, .. } = &object.kind else {
                continue;
            };
            let Some(tile) = object.tile else {
                continue;
            };

            let timer = self.timers.entry(object.id).or_insert(0.0);
            *timer += dt;
            if *timer < self.config.interval {
                continue;
            }
            *timer -= self.config.interval;

            if authority.is_none() {
                continue;
            }

            let around = Surroundings::survey(tile, grid, objects);
            if around.open_tiles.is_empty() {
                continue;
            }

            // Two spawners must not pick the same tile in one tick
            let free: Vec<TileCoord> = around
                .open_tiles
                .iter()
                .copied()
                .filter(|t| !requests.iter().any(|r: &SpawnRequest| r.tile == *t))
                .collect();
            if free.is_empty() {
                continue;
            }

            let chance = around.chance(*rarity);
            if self.rng.gen_range(0.0..100.0) < chance {
                let tile = free[self.rng.gen_range(0..free.len())];
                debug!("Spawner {} grew food at {:?}", object.id, tile);
                requests.push(SpawnRequest {
                    spawner: object.id,
                    tile,
                });
            }
        }

        self.timers.retain(|id, _| objects.contains(*id));
        requests
    }
}
