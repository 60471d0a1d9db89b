//! Ant units
//!
//! A unit always stands on exactly one tile (`current_tile`) and walks towards
//! at most one neighbouring tile (`target_tile`). Longer routes live in `path`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::battle::combatant::{Attackable, CombatStats};
use crate::core::types::{EntityId, Owner};
use crate::grid::TileCoord;
use crate::pathing::{Path, PathSearch};

/// Default walking speed in tiles-cost per second
pub const DEFAULT_SPEED: f32 = 5.0;

/// Kinds of ant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitVariant {
    Worker,
    Gatherer,
    Warrior,
    Queen,
}

impl UnitVariant {
    pub fn name(&self) -> &'static str {
        match self {
            UnitVariant::Worker => "Worker",
            UnitVariant::Gatherer => "Gatherer",
            UnitVariant::Warrior => "Warrior",
            UnitVariant::Queen => "Queen",
        }
    }
}

/// Attack bookkeeping of a warrior
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarriorState {
    pub attack_target: Option<EntityId>,
    pub last_known_target_tile: Option<TileCoord>,
    /// Set whenever the warrior picks a new route; ends a siege it leads
    pub has_set_new_path: bool,
}

/// Food handling of a gatherer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GathererState {
    pub carried_food: Option<EntityId>,
    /// Stops the gatherer from picking up what it just dropped.
    /// Clears as soon as the gatherer moves again.
    pub dropped_food: bool,
}

impl Default for GathererState {
    fn default() -> Self {
        Self {
            carried_food: None,
            dropped_food: true,
        }
    }
}

/// Variant plus its per-variant state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UnitKind {
    Worker,
    Gatherer(GathererState),
    Warrior(WarriorState),
    Queen,
}

impl UnitKind {
    pub fn new(variant: UnitVariant) -> Self {
        match variant {
            UnitVariant::Worker => UnitKind::Worker,
            UnitVariant::Gatherer => UnitKind::Gatherer(GathererState::default()),
            UnitVariant::Warrior => UnitKind::Warrior(WarriorState::default()),
            UnitVariant::Queen => UnitKind::Queen,
        }
    }

    pub fn variant(&self) -> UnitVariant {
        match self {
            UnitKind::Worker => UnitVariant::Worker,
            UnitKind::Gatherer(_) => UnitVariant::Gatherer,
            UnitKind::Warrior(_) => UnitVariant::Warrior,
            UnitKind::Queen => UnitVariant::Queen,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Unit {
    pub id: EntityId,
    pub owner: Owner,
    pub kind: UnitKind,
    pub stats: CombatStats,
    pub speed: f32,

    // Movement
    pub position: Vec2,
    pub current_tile: TileCoord,
    pub target_tile: TileCoord,
    pub path: Path,
    pub velocity: f32,
    /// In-flight pathfinding; present exactly while a path is being calculated
    pub search: Option<PathSearch>,

    // Battle
    pub in_battle: bool,
    /// Suppressed while inside a combat cloud
    pub hidden: bool,

    pub selected: bool,
}

impl Unit {
    /// A unit at rest on `tile`, standing at `position`
    pub fn new(id: EntityId, owner: Owner, variant: UnitVariant, tile: TileCoord, position: Vec2) -> Self {
        Self {
            id,
            owner,
            kind: UnitKind::new(variant),
            stats: CombatStats::default(),
            speed: DEFAULT_SPEED,
            position,
            current_tile: tile,
            target_tile: tile,
            path: Path::new(),
            velocity: 0.0,
            search: None,
            in_battle: false,
            hidden: false,
            selected: false,
        }
    }

    pub fn with_stats(mut self, stats: CombatStats) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed.max(0.0);
        self
    }

    pub fn variant(&self) -> UnitVariant {
        self.kind.variant()
    }

    pub fn is_calculating_path(&self) -> bool {
        self.search.is_some()
    }

    /// Not walking and nothing left to walk
    pub fn is_at_rest(&self) -> bool {
        self.current_tile == self.target_tile && self.path.is_empty()
    }

    pub fn is_moving(&self) -> bool {
        self.current_tile != self.target_tile
    }

    pub fn warrior(&self) -> Option<&WarriorState> {
        match &self.kind {
            UnitKind::Warrior(state) => Some(state),
            _ => None,
        }
    }

    pub fn warrior_mut(&mut self) -> Option<&mut WarriorState> {
        match &mut self.kind {
            UnitKind::Warrior(state) => Some(state),
            _ => None,
        }
    }

    pub fn gatherer(&self) -> Option<&GathererState> {
        match &self.kind {
            UnitKind::Gatherer(state) => Some(state),
            _ => None,
        }
    }

    pub fn gatherer_mut(&mut self) -> Option<&mut GathererState> {
        match &mut self.kind {
            UnitKind::Gatherer(state) => Some(state),
            _ => None,
        }
    }

    pub fn attack_target(&self) -> Option<EntityId> {
        self.warrior().and_then(|w| w.attack_target)
    }

    pub fn is_carrying_food(&self) -> bool {
        self.gatherer().is_some_and(|g| g.carried_food.is_some())
    }

    /// Tiles this unit highlights while selected
    pub fn highlighted_tiles(&self) -> Vec<TileCoord> {
        let mut tiles = vec![self.current_tile];
        if self.target_tile != self.current_tile {
            tiles.push(self.target_tile);
        }
        tiles.extend(self.path.iter().copied());
        tiles
    }
}

impl Attackable for Unit {
    fn stats(&self) -> &CombatStats {
        &self.stats
    }

    fn stats_mut(&mut self) -> &mut CombatStats {
        &mut self.stats
    }

    fn is_structure(&self) -> bool {
        false
    }

    fn fight_sprite(&self) -> &'static str {
        match self.variant() {
            UnitVariant::Worker => "workerSprite",
            UnitVariant::Gatherer => "gathererSprite",
            UnitVariant::Warrior => "warriorSprite",
            UnitVariant::Queen => "queenSprite",
        }
    }
}
