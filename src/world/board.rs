//! Everything standing on the map: tiles, units and objects

use std::collections::BTreeMap;

use glam::Vec2;

use crate::battle::combatant::Attackable;
use crate::core::types::{EntityId, Owner};
use crate::grid::{Claim, GridIndex, TileCoord};
use crate::objects::{MapObject, MapObjects, ObjectKind};
use crate::units::movement::{refresh_marks, traversal_velocity};
use crate::units::unit::Unit;
use crate::units::walkability::can_walk_to;

#[derive(Debug, Clone)]
pub struct Board {
    pub grid: GridIndex,
    /// Ordered by id so every pass over units is deterministic
    pub units: BTreeMap<EntityId, Unit>,
    pub objects: MapObjects,
}

impl Board {
    pub fn new(grid: GridIndex) -> Self {
        Self {
            grid,
            units: BTreeMap::new(),
            objects: MapObjects::new(),
        }
    }

    pub fn unit(&self, id: EntityId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn unit_mut(&mut self, id: EntityId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    pub fn unit_ids(&self) -> Vec<EntityId> {
        self.units.keys().copied().collect()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.units.contains_key(&id) || self.objects.contains(id)
    }

    /// Place a unit on the board and claim its tile.
    ///
    /// Returns the claim result so loaders can reject stacked units.
    pub fn add_unit(&mut self, unit: Unit) -> Claim {
        let claim = self.grid.try_claim(unit.current_tile, unit.id);
        self.units.insert(unit.id, unit);
        claim
    }

    /// Take a unit off the board together with whatever it carries
    pub fn remove_unit(&mut self, id: EntityId) -> Option<Unit> {
        let unit = self.units.remove(&id)?;
        self.grid.release_all(id);
        self.grid.unmark_all(id);
        if let Some(food) = unit.gatherer().and_then(|g| g.carried_food) {
            self.objects.remove(food);
        }
        Some(unit)
    }

    pub fn add_object(&mut self, object: MapObject) {
        self.objects.insert(object);
    }

    /// Tile an entity currently stands on
    pub fn tile_of(&self, id: EntityId) -> Option<TileCoord> {
        match self.units.get(&id) {
            Some(unit) => Some(unit.current_tile),
            None => self.objects.get(id).and_then(|o| o.tile),
        }
    }

    /// Continuous position of an entity
    pub fn position_of(&self, id: EntityId) -> Option<Vec2> {
        match self.units.get(&id) {
            Some(unit) => Some(unit.position),
            None => self
                .objects
                .get(id)
                .and_then(|o| o.tile)
                .map(|tile| self.grid.geometry().center(tile)),
        }
    }

    /// Units and anthills can be fought
    pub fn combatant(&self, id: EntityId) -> Option<&dyn Attackable> {
        if let Some(unit) = self.units.get(&id) {
            return Some(unit as &dyn Attackable);
        }
        self.objects.anthill(id).map(|a| a as &dyn Attackable)
    }

    pub fn combatant_mut(&mut self, id: EntityId) -> Option<&mut dyn Attackable> {
        if let Some(unit) = self.units.get_mut(&id) {
            return Some(unit as &mut dyn Attackable);
        }
        self.objects.anthill_mut(id).map(|a| a as &mut dyn Attackable)
    }

    /// Unit standing on a tile, preferring the one holding it
    pub fn unit_at(&self, tile: TileCoord) -> Option<EntityId> {
        self.grid.occupant(tile).or_else(|| {
            self.units
                .values()
                .find(|u| u.current_tile == tile)
                .map(|u| u.id)
        })
    }

    pub fn set_selected(&mut self, id: EntityId, selected: bool) {
        if let Some(unit) = self.units.get_mut(&id) {
            unit.selected = selected;
            refresh_marks(unit, &mut self.grid);
        }
    }

    /// Make sure a unit holds the tile it stands on.
    ///
    /// A unit left on a tile someone else holds moves onto the first free
    /// neighbour instead. Returns the tile the unit ends up holding.
    pub fn settle(&mut self, id: EntityId) -> Option<TileCoord> {
        let Board { grid, units, objects } = self;
        let unit = units.get_mut(&id)?;
        let here = unit.current_tile;
        if let Claim::Claimed | Claim::AlreadyOurs = grid.try_claim(here, id) {
            return Some(here);
        }

        let walker: &Unit = unit;
        let free = grid
            .adjacent_tiles(here)
            .into_iter()
            .map(|tile| tile.coord)
            .find(|&coord| grid.occupant(coord).is_none() && can_walk_to(walker, coord, grid, objects))?;
        grid.try_claim(free, id);
        unit.current_tile = free;
        unit.target_tile = free;
        unit.velocity = traversal_velocity(grid, here, free, unit.speed);
        unit.path.clear();
        refresh_marks(unit, grid);
        Some(free)
    }

    /// Replace a destroyed anthill with a ruin. Returns the ruin's tile.
    pub fn ruin_anthill(&mut self, anthill: EntityId, ruin: EntityId) -> Option<TileCoord> {
        let object = self.objects.remove(anthill)?;
        let tile = object.tile?;
        self.objects.insert(MapObject::new(ruin, Owner::Neutral, ObjectKind::AnthillRuin, tile));
        Some(tile)
    }
}
