//! Map objects: food, scent paths, anthills, ruins and food spawners
//!
//! Objects sit on tiles and never move by themselves. Food is the exception in
//! that a gatherer can lift it off the map and carry it; carried food has no tile.

pub mod spawner;

use std::collections::BTreeMap;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::battle::combatant::{Attackable, CombatStats};
use crate::core::types::{EntityId, Owner};
use crate::grid::TileCoord;

/// Walkability tag of an object, without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectTag {
    Food,
    Scentpath,
    Anthill,
    AnthillRuin,
    FoodSpawner,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjectKind {
    Food {
        value: u32,
    },
    /// Non-blocking trail marker
    Scentpath,
    Anthill(Anthill),
    /// What is left of a destroyed anthill
    AnthillRuin,
    FoodSpawner {
        /// 1.0 is the standard rate; 3.0 spawns three times as often
        rarity: f32,
        name: String,
        description: String,
    },
}

impl ObjectKind {
    pub fn tag(&self) -> ObjectTag {
        match self {
            ObjectKind::Food { .. } => ObjectTag::Food,
            ObjectKind::Scentpath => ObjectTag::Scentpath,
            ObjectKind::Anthill(_) => ObjectTag::Anthill,
            ObjectKind::AnthillRuin => ObjectTag::AnthillRuin,
            ObjectKind::FoodSpawner { .. } => ObjectTag::FoodSpawner,
        }
    }

    /// A fresh anthill with default stats and no food
    pub fn anthill() -> Self {
        ObjectKind::Anthill(Anthill::default())
    }
}

/// A colony's home. Fights back when besieged and stores delivered food.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Anthill {
    pub stats: CombatStats,
    pub food_points: u32,
}

impl Attackable for Anthill {
    fn stats(&self) -> &CombatStats {
        &self.stats
    }

    fn stats_mut(&mut self) -> &mut CombatStats {
        &mut self.stats
    }

    fn is_structure(&self) -> bool {
        true
    }

    fn fight_sprite(&self) -> &'static str {
        "anthillSprite"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapObject {
    pub id: EntityId,
    pub owner: Owner,
    pub kind: ObjectKind,
    /// None while the object is carried
    pub tile: Option<TileCoord>,
}

impl MapObject {
    pub fn new(id: EntityId, owner: Owner, kind: ObjectKind, tile: TileCoord) -> Self {
        Self {
            id,
            owner,
            kind,
            tile: Some(tile),
        }
    }

    pub fn tag(&self) -> ObjectTag {
        self.kind.tag()
    }

    pub fn is_anthill(&self) -> bool {
        matches!(self.kind, ObjectKind::Anthill(_))
    }

    pub fn as_anthill(&self) -> Option<&Anthill> {
        match &self.kind {
            ObjectKind::Anthill(anthill) => Some(anthill),
            _ => None,
        }
    }

    pub fn as_anthill_mut(&mut self) -> Option<&mut Anthill> {
        match &mut self.kind {
            ObjectKind::Anthill(anthill) => Some(anthill),
            _ => None,
        }
    }

    /// Credit delivered food to an anthill. Returns false for other objects.
    pub fn add_food_points(&mut self, points: u32) -> bool {
        match self.as_anthill_mut() {
            Some(anthill) => {
                anthill.food_points += points;
                true
            }
            None => false,
        }
    }
}

/// All objects on the map, indexed by id and by tile
#[derive(Debug, Clone, Default)]
pub struct MapObjects {
    objects: BTreeMap<EntityId, MapObject>,
    by_tile: AHashMap<TileCoord, Vec<EntityId>>,
}

impl MapObjects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, object: MapObject) {
        if let Some(tile) = object.tile {
            self.by_tile.entry(tile).or_default().push(object.id);
        }
        self.objects.insert(object.id, object);
    }

    pub fn remove(&mut self, id: EntityId) -> Option<MapObject> {
        let object = self.objects.remove(&id)?;
        if let Some(tile) = object.tile {
            self.unindex(tile, id);
        }
        Some(object)
    }

    fn unindex(&mut self, tile: TileCoord, id: EntityId) {
        if let Some(ids) = self.by_tile.get_mut(&tile) {
            ids.retain(|other| *other != id);
            if ids.is_empty() {
                self.by_tile.remove(&tile);
            }
        }
    }

    pub fn get(&self, id: EntityId) -> Option<&MapObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut MapObject> {
        self.objects.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MapObject> {
        self.objects.values()
    }

    /// Objects lying on a tile, in insertion order
    pub fn at(&self, tile: TileCoord) -> impl Iterator<Item = &MapObject> {
        self.by_tile
            .get(&tile)
            .into_iter()
            .flatten()
            .filter_map(|id| self.objects.get(id))
    }

    pub fn has_tag_at(&self, tile: TileCoord, tag: ObjectTag) -> bool {
        self.at(tile).any(|o| o.tag() == tag)
    }

    pub fn first_with_tag(&self, tile: TileCoord, tag: ObjectTag) -> Option<EntityId> {
        self.at(tile).find(|o| o.tag() == tag).map(|o| o.id)
    }

    /// Take an object off its tile (it keeps existing, e.g. while carried)
    pub fn lift(&mut self, id: EntityId) -> bool {
        let Some(tile) = self.objects.get_mut(&id).and_then(|o| o.tile.take()) else {
            return false;
        };
        self.unindex(tile, id);
        true
    }

    /// Put an object onto a tile, moving it if it was elsewhere
    pub fn place(&mut self, id: EntityId, tile: TileCoord) -> bool {
        let previous = match self.objects.get_mut(&id) {
            Some(object) => object.tile.replace(tile),
            None => return false,
        };
        if let Some(previous) = previous {
            self.unindex(previous, id);
        }
        self.by_tile.entry(tile).or_default().push(id);
        true
    }

    /// The anthill with this id, if `id` is one
    pub fn anthill(&self, id: EntityId) -> Option<&Anthill> {
        self.objects.get(&id).and_then(|o| o.as_anthill())
    }

    pub fn anthill_mut(&mut self, id: EntityId) -> Option<&mut Anthill> {
        self.objects.get_mut(&id).and_then(|o| o.as_anthill_mut())
    }
}
