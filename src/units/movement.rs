//! Per-tick unit movement along paths
//!
//! Each tick a unit either walks towards its target tile, or (once there)
//! commits the tile transition and picks the next tile off its path.
//! Traversal time between two tiles is `(cost(from) + cost(to)) / speed`.

use glam::Vec2;
use tracing::debug;

use crate::grid::{Claim, GridIndex, TileCoord};
use crate::objects::MapObjects;
use crate::pathing::{Path, PathSearch, SearchState};
use crate::units::unit::Unit;
use crate::units::walkability::can_walk_to;

/// Result of a movement tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovementResult {
    pub moved: bool,
    /// Tile the unit finished walking onto this tick
    pub arrived: Option<TileCoord>,
    /// Tile the unit started walking towards this tick
    pub stepped_towards: Option<TileCoord>,
    pub path_blocked: bool,
}

/// Move `from` towards `to` by at most `max_delta`
pub fn move_towards(from: Vec2, to: Vec2, max_delta: f32) -> Vec2 {
    if max_delta.is_nan() || max_delta <= 0.0 {
        return from;
    }
    let delta = to - from;
    let distance = delta.length();
    if distance <= max_delta || distance == 0.0 {
        to
    } else {
        from + delta / distance * max_delta
    }
}

/// Speed needed to cross from one tile to the next in its traversal time
pub fn traversal_velocity(grid: &GridIndex, from: TileCoord, to: TileCoord, speed: f32) -> f32 {
    if speed <= 0.0 {
        return 0.0;
    }
    let seconds = (grid.terrain_cost(from) + grid.terrain_cost(to)) / speed;
    let distance = grid.geometry().distance(from, to);
    if seconds > 0.0 {
        distance / seconds
    } else {
        f32::INFINITY
    }
}

/// Re-highlight the tiles a unit covers, if it is selected
pub fn refresh_marks(unit: &Unit, grid: &mut GridIndex) {
    grid.unmark_all(unit.id);
    if unit.selected {
        for tile in unit.highlighted_tiles() {
            grid.mark(tile, unit.id);
        }
    }
}

/// Advance one unit by `dt` seconds
pub fn advance(unit: &mut Unit, grid: &mut GridIndex, objects: &MapObjects, dt: f32) -> MovementResult {
    let mut result = MovementResult::default();

    // Skirmishing units hold still until the battle ends
    if unit.in_battle {
        return result;
    }

    let target_center = grid.geometry().center(unit.target_tile);
    if unit.position != target_center {
        unit.position = move_towards(unit.position, target_center, unit.velocity * dt);
        result.moved = true;
        return result;
    }

    if unit.current_tile != unit.target_tile {
        let entering = unit.target_tile;
        match grid.occupant(entering) {
            None => {
                grid.try_claim(entering, unit.id);
            }
            Some(holder) if holder == unit.id => {}
            // Sharing the attack target's tile is how a skirmish starts
            Some(holder) if Some(holder) == unit.attack_target() => {}
            Some(holder) => {
                debug!("Unit {} found {:?} taken by {}, turning back", unit.id, entering, holder);
                unit.target_tile = unit.current_tile;
                unit.velocity = traversal_velocity(grid, entering, unit.current_tile, unit.speed);
                cancel_movement(unit, grid);
                result.path_blocked = true;
                return result;
            }
        }
        grid.release(unit.current_tile, unit.id);
        unit.current_tile = unit.target_tile;
        result.arrived = Some(unit.current_tile);
        refresh_marks(unit, grid);
    }

    // Structures are besieged from the neighbouring tile; the warrior's
    // behaviour starts the siege
    if let (Some(next), Some(target)) = (unit.path.peek_front(), unit.attack_target()) {
        if objects.at(next).any(|o| o.id == target && o.is_anthill()) {
            return result;
        }
    }

    let Some(next) = unit.path.pop_front() else {
        return result;
    };

    if !can_walk_to(unit, next, grid, objects) {
        debug!("Unit {} blocked at {:?}, cancelling movement", unit.id, next);
        cancel_movement(unit, grid);
        result.path_blocked = true;
        return result;
    }

    // A warrior walks into its target's tile, at the end of its path, without
    // taking it over
    let entering_target =
        unit.path.is_empty() && unit.attack_target().is_some() && grid.occupant(next) == unit.attack_target();
    if !entering_target {
        if let Claim::Taken(holder) = grid.try_claim(next, unit.id) {
            debug!("Unit {} lost {:?} to {}", unit.id, next, holder);
            cancel_movement(unit, grid);
            result.path_blocked = true;
            return result;
        }
    }

    unit.target_tile = next;
    unit.velocity = traversal_velocity(grid, unit.current_tile, next, unit.speed);
    result.stepped_towards = Some(next);
    refresh_marks(unit, grid);
    result
}

/// Drop the rest of the path; the unit stays where it is
pub fn cancel_movement(unit: &mut Unit, grid: &mut GridIndex) {
    unit.path.clear();
    refresh_marks(unit, grid);
}

/// Start pathfinding towards `goal`.
///
/// Returns false, changing nothing, while a search is already in flight.
pub fn begin_search(unit: &mut Unit, grid: &GridIndex, goal: TileCoord) -> bool {
    if unit.is_calculating_path() {
        return false;
    }
    unit.path.clear();
    unit.search = Some(PathSearch::new(grid, unit.target_tile, goal));
    true
}

/// Install a found path into the unit's live path.
///
/// The search starts from the target tile, which the unit is already heading
/// for, so that leading tile is dropped.
pub fn install_path(unit: &mut Unit, mut found: Path) {
    if found.peek_front() == Some(unit.target_tile) {
        found.pop_front();
    }
    unit.path.replace_tiles(found);
}

/// Give a unit's in-flight search `steps` more expansions.
///
/// On success the path is installed; on failure the movement intent is
/// cleared. Returns the state the search ended the slice in.
pub fn step_search(
    unit: &mut Unit,
    grid: &mut GridIndex,
    objects: &MapObjects,
    steps: u32,
) -> Option<SearchState> {
    let mut search = unit.search.take()?;

    let state = {
        let walker: &Unit = unit;
        let board: &GridIndex = grid;
        let mut state = SearchState::Searching;
        for _ in 0..steps.max(1) {
            state = search.step(board, |tile| can_walk_to(walker, tile.coord, board, objects));
            if state.is_finished() {
                break;
            }
        }
        state
    };

    match &state {
        SearchState::Searching => unit.search = Some(search),
        SearchState::Found(path) => {
            debug!(
                "Unit {} found a path of {} tiles to {:?} after {} expansions",
                unit.id,
                path.len(),
                search.goal(),
                search.expansions()
            );
            install_path(unit, path.clone());
            refresh_marks(unit, grid);
        }
        SearchState::Failed => {
            debug!("Unit {} has no path to {:?}", unit.id, search.goal());
            cancel_movement(unit, grid);
        }
    }

    Some(state)
}
