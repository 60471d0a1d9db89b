//! Player commands: selection, move and attack orders, dropping food
//!
//! Commands never fail loudly. Anything that cannot be carried out right now
//! comes back as [`CommandOutcome::Dropped`] and leaves the world untouched.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::types::EntityId;
use crate::grid::TileCoord;
use crate::units::{begin_search, drop_food, FoodDrop, UnitVariant};
use crate::world::board::Board;
use crate::world::World;

/// What a click landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    Unit(EntityId),
    Object(EntityId),
    Tile(TileCoord),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropReason {
    /// The unit is still calculating its previous path
    SearchInFlight,
    /// Unknown unit, unknown tile, or nothing to attack
    InvalidTarget,
    InBattle,
    NotWarrior,
    NotCarrying,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandOutcome {
    Accepted,
    Dropped(DropReason),
}

impl CommandOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, CommandOutcome::Accepted)
    }
}

impl World {
    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Select whatever is on top at `position`: a unit, else an object, else
    /// the tile itself. Units hidden in a combat cloud cannot be picked.
    pub fn select_at(&mut self, position: Vec2) -> Option<Selection> {
        if let Some(Selection::Unit(previous)) = self.selection.take() {
            self.board.set_selected(previous, false);
        }

        let tile = self.board.grid.tile_at(position)?.coord;
        let unit = self
            .board
            .units
            .values()
            .find(|u| !u.hidden && (u.current_tile == tile || u.target_tile == tile))
            .map(|u| u.id);

        let selection = match unit {
            Some(id) => {
                self.board.set_selected(id, true);
                Selection::Unit(id)
            }
            None => match self.board.objects.at(tile).next() {
                Some(object) => Selection::Object(object.id),
                None => Selection::Tile(tile),
            },
        };

        self.selection = Some(selection);
        Some(selection)
    }

    /// Send `unit` to the tile under `position`.
    ///
    /// A warrior given a move order forgets its attack target, and a siege it
    /// leads ends at the next exchange.
    pub fn issue_move_order(&mut self, unit: EntityId, position: Vec2) -> CommandOutcome {
        let Some(goal) = self.board.grid.tile_at(position).map(|t| t.coord) else {
            return CommandOutcome::Dropped(DropReason::InvalidTarget);
        };
        let Board { grid, units, .. } = &mut self.board;
        let Some(ant) = units.get_mut(&unit) else {
            return CommandOutcome::Dropped(DropReason::InvalidTarget);
        };
        if ant.in_battle {
            return CommandOutcome::Dropped(DropReason::InBattle);
        }
        if ant.is_calculating_path() {
            debug!("Unit {} is still searching, dropping move to {:?}", unit, goal);
            return CommandOutcome::Dropped(DropReason::SearchInFlight);
        }

        if let Some(warrior) = ant.warrior_mut() {
            warrior.attack_target = None;
            warrior.last_known_target_tile = None;
            warrior.has_set_new_path = true;
        }
        begin_search(ant, grid, goal);
        debug!("Unit {} ordered to {:?}", unit, goal);
        CommandOutcome::Accepted
    }

    /// Point a warrior at something to fight. Its behaviour does the chasing.
    pub fn issue_attack_order(&mut self, unit: EntityId, target: EntityId) -> CommandOutcome {
        let Some(ant) = self.board.unit(unit) else {
            return CommandOutcome::Dropped(DropReason::InvalidTarget);
        };
        if ant.variant() != UnitVariant::Warrior {
            return CommandOutcome::Dropped(DropReason::NotWarrior);
        }
        if ant.in_battle {
            return CommandOutcome::Dropped(DropReason::InBattle);
        }
        let owner = ant.owner;

        let attackable = target != unit && self.board.combatant(target).is_some();
        let target_owner = self
            .board
            .unit(target)
            .map(|u| u.owner)
            .or_else(|| self.board.objects.get(target).map(|o| o.owner));
        if !attackable || target_owner == Some(owner) {
            return CommandOutcome::Dropped(DropReason::InvalidTarget);
        }

        if let Some(warrior) = self.board.unit_mut(unit).and_then(|u| u.warrior_mut()) {
            warrior.attack_target = Some(target);
            warrior.last_known_target_tile = None;
        }
        debug!("Warrior {} ordered to attack {}", unit, target);
        CommandOutcome::Accepted
    }

    /// Have a gatherer put down what it carries
    pub fn drop_food(&mut self, unit: EntityId) -> CommandOutcome {
        let Some(ant) = self.board.unit(unit) else {
            return CommandOutcome::Dropped(DropReason::InvalidTarget);
        };
        if ant.in_battle {
            return CommandOutcome::Dropped(DropReason::InBattle);
        }

        match drop_food(&mut self.board, unit) {
            Some(FoodDrop::Delivered { anthill, value }) => {
                debug!("Unit {} fed anthill {} with {}", unit, anthill, value);
                CommandOutcome::Accepted
            }
            Some(FoodDrop::Dropped { .. }) => CommandOutcome::Accepted,
            None => CommandOutcome::Dropped(DropReason::NotCarrying),
        }
    }
}
