//! Load a starting map from a TOML file
//!
//! A map names its grid size and base terrain, optional per-tile terrain
//! overrides, and the units and objects standing on it. Entities are placed
//! either by `tile = [col, row]` or by a continuous `position = [x, y]` that is
//! snapped to the nearest tile. Ids are handed out in file order, so two peers
//! loading the same file agree on every id.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::battle::CombatStats;
use crate::core::config::SimConfig;
use crate::core::error::{ColoniesError, Result};
use crate::core::types::{Owner, PlayerId};
use crate::grid::{Claim, GridGeometry, GridIndex, Terrain, TileCoord};
use crate::objects::{Anthill, MapObject, ObjectKind};
use crate::units::{Unit, UnitVariant};
use crate::world::World;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSection {
    pub cols: i32,
    pub rows: i32,
    #[serde(default)]
    pub terrain: Terrain,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileEntry {
    pub tile: [i32; 2],
    pub terrain: Terrain,
}

/// Where an entity starts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Placement {
    pub tile: Option<[i32; 2]>,
    pub position: Option<[f32; 2]>,
}

impl Placement {
    fn resolve(&self, grid: &GridIndex) -> Result<TileCoord> {
        let coord = match (self.tile, self.position) {
            (Some([col, row]), _) => TileCoord::new(col, row),
            (None, Some([x, y])) => grid.geometry().coord_of(Vec2::new(x, y)),
            (None, None) => {
                return Err(ColoniesError::InvalidMap("entity has neither tile nor position".into()));
            }
        };
        if !grid.contains(coord) {
            return Err(ColoniesError::InvalidMap(format!(
                "({}, {}) is outside the map",
                coord.col, coord.row
            )));
        }
        Ok(coord)
    }
}

/// Combat numbers in a map file. Hit points start full unless given.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsEntry {
    pub max_hp: f32,
    pub attack: f32,
    pub defense: f32,
    pub current_hp: Option<f32>,
}

impl Default for StatsEntry {
    fn default() -> Self {
        let stats = CombatStats::default();
        Self {
            max_hp: stats.max_hp,
            attack: stats.attack,
            defense: stats.defense,
            current_hp: None,
        }
    }
}

impl StatsEntry {
    fn to_stats(self) -> CombatStats {
        let mut stats = CombatStats::new(self.max_hp, self.attack, self.defense);
        if let Some(current_hp) = self.current_hp {
            stats.current_hp = current_hp;
        }
        stats.sanitized()
    }
}

fn owner_from(player: u8) -> Owner {
    match player {
        0 => Owner::Neutral,
        n => Owner::Player(PlayerId(n)),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitEntry {
    pub variant: UnitVariant,
    /// Player number; 0 is neutral
    #[serde(default)]
    pub owner: u8,
    #[serde(flatten)]
    pub placement: Placement,
    pub stats: Option<StatsEntry>,
    pub speed: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectEntryKind {
    Food,
    Scentpath,
    Anthill,
    Ruin,
    Spawner,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectEntry {
    pub kind: ObjectEntryKind,
    #[serde(default)]
    pub owner: u8,
    #[serde(flatten)]
    pub placement: Placement,
    /// Food value
    pub value: Option<u32>,
    /// Anthill stats
    pub stats: Option<StatsEntry>,
    #[serde(default)]
    pub food_points: u32,
    /// Spawner rate multiplier
    pub rarity: Option<f32>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl ObjectEntry {
    fn to_kind(&self) -> Result<ObjectKind> {
        Ok(match self.kind {
            ObjectEntryKind::Food => ObjectKind::Food {
                value: self.value.unwrap_or(1),
            },
            ObjectEntryKind::Scentpath => ObjectKind::Scentpath,
            ObjectEntryKind::Anthill => ObjectKind::Anthill(Anthill {
                stats: self.stats.map(StatsEntry::to_stats).unwrap_or_default(),
                food_points: self.food_points,
            }),
            ObjectEntryKind::Ruin => ObjectKind::AnthillRuin,
            ObjectEntryKind::Spawner => {
                let rarity = self.rarity.unwrap_or(1.0);
                if !(rarity >= 0.0) {
                    return Err(ColoniesError::InvalidMap(format!("spawner rarity {} is negative", rarity)));
                }
                ObjectKind::FoodSpawner {
                    rarity,
                    name: self.name.clone(),
                    description: self.description.clone(),
                }
            }
        })
    }
}

/// A whole map file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapFile {
    pub grid: GridSection,
    #[serde(default)]
    pub tiles: Vec<TileEntry>,
    #[serde(default)]
    pub units: Vec<UnitEntry>,
    #[serde(default)]
    pub objects: Vec<ObjectEntry>,
}

impl MapFile {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Build the tile grid described by the `[grid]` and `[[tiles]]` sections
    pub fn build_grid(&self, geometry: GridGeometry) -> Result<GridIndex> {
        if self.grid.cols <= 0 || self.grid.rows <= 0 {
            return Err(ColoniesError::InvalidMap(format!(
                "grid must be at least 1x1, got {}x{}",
                self.grid.cols, self.grid.rows
            )));
        }
        let mut grid = GridIndex::filled(geometry, self.grid.cols, self.grid.rows, self.grid.terrain);
        for entry in &self.tiles {
            let [col, row] = entry.tile;
            if !grid.set_terrain(TileCoord::new(col, row), entry.terrain) {
                return Err(ColoniesError::InvalidMap(format!(
                    "terrain override at ({}, {}) is outside the map",
                    col, row
                )));
            }
        }
        Ok(grid)
    }

    /// Build a ready-to-tick world
    pub fn into_world(self, config: SimConfig) -> Result<World> {
        config.validate()?;
        let grid = self.build_grid(GridGeometry::from(config.grid.clone()))?;
        let mut world = World::new(config, grid);

        for entry in &self.objects {
            let tile = entry.placement.resolve(&world.board.grid)?;
            let kind = entry.to_kind()?;
            let id = world.allocate_id();
            world
                .board
                .add_object(MapObject::new(id, owner_from(entry.owner), kind, tile));
        }

        for entry in &self.units {
            let tile = entry.placement.resolve(&world.board.grid)?;
            let id = world.allocate_id();
            let position = world.board.grid.geometry().center(tile);
            let mut unit = Unit::new(id, owner_from(entry.owner), entry.variant, tile, position);
            if let Some(stats) = entry.stats {
                unit = unit.with_stats(stats.to_stats());
            }
            if let Some(speed) = entry.speed {
                unit = unit.with_speed(speed);
            }
            if let Claim::Taken(holder) = world.board.add_unit(unit) {
                return Err(ColoniesError::InvalidMap(format!(
                    "unit {} placed on ({}, {}) already held by {}",
                    id, tile.col, tile.row, holder
                )));
            }
        }

        debug!(
            "Loaded map: {} tiles, {} units, {} objects",
            world.board.grid.len(),
            world.board.units.len(),
            world.board.objects.len()
        );
        Ok(world)
    }
}
