//! Per-variant behaviour that runs after movement each tick
//!
//! Warriors chase their attack target and decide when a battle starts.
//! Gatherers pick food up and drop it off. Queens found colonies on ruins.
//! Anything that needs the battle coordinator or new ids is returned as a
//! [`BehaviorEvent`] for the world to carry out.

use tracing::debug;

use crate::core::types::EntityId;
use crate::grid::TileCoord;
use crate::objects::{ObjectKind, ObjectTag};
use crate::units::movement::{begin_search, cancel_movement};
use crate::units::unit::UnitVariant;
use crate::world::board::Board;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BehaviorEvent {
    CommenceBattle {
        attacker: EntityId,
        defender: EntityId,
    },
    FoundColony {
        queen: EntityId,
        ruin: EntityId,
        tile: TileCoord,
    },
    PickedUpFood {
        gatherer: EntityId,
        food: EntityId,
    },
}

/// Run the behaviour of one unit
pub fn run_behavior(board: &mut Board, id: EntityId) -> Option<BehaviorEvent> {
    let unit = board.unit(id)?;
    if unit.in_battle {
        return None;
    }

    match unit.variant() {
        UnitVariant::Warrior => warrior_targeting(board, id),
        UnitVariant::Gatherer => gatherer_pickup(board, id),
        UnitVariant::Queen => queen_founding(board, id),
        UnitVariant::Worker => None,
    }
}

fn clear_attack_target(board: &mut Board, id: EntityId) {
    if let Some(warrior) = board.unit_mut(id).and_then(|u| u.warrior_mut()) {
        warrior.attack_target = None;
        warrior.last_known_target_tile = None;
    }
}

fn warrior_targeting(board: &mut Board, id: EntityId) -> Option<BehaviorEvent> {
    let unit = board.unit(id)?;
    let target = unit.attack_target()?;

    let Some(target_tile) = board.tile_of(target) else {
        debug!("Warrior {} lost its target {}", id, target);
        clear_attack_target(board, id);
        return None;
    };

    if unit.current_tile == target_tile {
        clear_attack_target(board, id);
        return Some(BehaviorEvent::CommenceBattle {
            attacker: id,
            defender: target,
        });
    }

    let last_known = unit.warrior().and_then(|w| w.last_known_target_tile);
    if last_known != Some(target_tile) || unit.path.is_empty() {
        let Board { grid, units, .. } = &mut *board;
        let unit = units.get_mut(&id)?;
        if let Some(warrior) = unit.warrior_mut() {
            warrior.last_known_target_tile = Some(target_tile);
            // Chasing a target counts as choosing a new path
            warrior.has_set_new_path = true;
        }
        if begin_search(unit, grid, target_tile) {
            debug!("Warrior {} routing to target {} at {:?}", id, target, target_tile);
        }
    }

    // Structures are attacked from the neighbouring tile
    let unit = board.unit(id)?;
    let next = unit.path.peek_front()?;
    let target_is_here = board
        .objects
        .at(next)
        .any(|o| o.id == target && o.tag() == ObjectTag::Anthill);
    if target_is_here {
        let Board { grid, units, .. } = &mut *board;
        if let Some(unit) = units.get_mut(&id) {
            cancel_movement(unit, grid);
        }
        clear_attack_target(board, id);
        return Some(BehaviorEvent::CommenceBattle {
            attacker: id,
            defender: target,
        });
    }

    None
}

fn gatherer_pickup(board: &mut Board, id: EntityId) -> Option<BehaviorEvent> {
    let unit = board.unit_mut(id)?;
    let moving = unit.is_moving();
    let at_rest = unit.is_at_rest() && !unit.is_calculating_path();
    let tile = unit.current_tile;
    let state = unit.gatherer_mut()?;

    if moving {
        state.dropped_food = false;
        return None;
    }
    if state.dropped_food || state.carried_food.is_some() || !at_rest {
        return None;
    }

    let food = board.objects.first_with_tag(tile, ObjectTag::Food)?;
    board.objects.lift(food);

    let unit = board.unit_mut(id)?;
    unit.speed /= 2.0;
    if let Some(state) = unit.gatherer_mut() {
        state.carried_food = Some(food);
    }
    debug!("Gatherer {} picked up food {}", id, food);

    Some(BehaviorEvent::PickedUpFood { gatherer: id, food })
}

/// Result of a gatherer putting its food down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoodDrop {
    /// Food went into a friendly anthill and is gone
    Delivered { anthill: EntityId, value: u32 },
    /// Food lies on the map again
    Dropped { tile: TileCoord },
}

/// Put down carried food. Returns None if the unit carries nothing.
pub fn drop_food(board: &mut Board, id: EntityId) -> Option<FoodDrop> {
    let unit = board.unit(id)?;
    let food = unit.gatherer()?.carried_food?;
    let owner = unit.owner;

    // Snap to where the gatherer actually is, which may be mid-step
    let snapped = board.grid.geometry().coord_of(unit.position);
    let tile = if board.grid.contains(snapped) {
        snapped
    } else {
        unit.current_tile
    };

    let unit = board.unit_mut(id)?;
    unit.speed *= 2.0;
    if let Some(state) = unit.gatherer_mut() {
        state.carried_food = None;
        state.dropped_food = true;
    }

    let value = match board.objects.get(food).map(|o| &o.kind) {
        Some(ObjectKind::Food { value }) => *value,
        _ => 0,
    };

    let nearby = std::iter::once(tile)
        .chain(tile.neighbors())
        .flat_map(|t| board.objects.at(t))
        .find(|o| o.is_anthill() && o.owner == owner)
        .map(|o| o.id);

    match nearby {
        Some(anthill) => {
            board.objects.remove(food);
            if let Some(object) = board.objects.get_mut(anthill) {
                object.add_food_points(value);
            }
            debug!("Gatherer {} delivered {} food to anthill {}", id, value, anthill);
            Some(FoodDrop::Delivered { anthill, value })
        }
        None => {
            board.objects.place(food, tile);
            debug!("Gatherer {} dropped food at {:?}", id, tile);
            Some(FoodDrop::Dropped { tile })
        }
    }
}

fn queen_founding(board: &mut Board, id: EntityId) -> Option<BehaviorEvent> {
    let unit = board.unit(id)?;
    if !unit.is_at_rest() || unit.is_calculating_path() {
        return None;
    }
    let tile = unit.current_tile;
    let ruin = board.objects.first_with_tag(tile, ObjectTag::AnthillRuin)?;
    Some(BehaviorEvent::FoundColony {
        queen: id,
        ruin,
        tile,
    })
}
