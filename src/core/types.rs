//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier for every unit and map object.
///
/// Ids are handed out sequentially at creation so that two peers which build
/// the same map in the same order agree on every id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Sequential id source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn allocate(&mut self) -> EntityId {
        if self.next == 0 {
            self.next = 1;
        }
        let id = EntityId(self.next);
        self.next += 1;
        id
    }

    /// Never hand out `id` or anything below it
    pub fn reserve(&mut self, id: EntityId) {
        self.next = self.next.max(id.0.saturating_add(1));
    }
}

/// Game tick counter (simulation time unit)
pub type Tick = u64;

/// Player slot. Player 1 hosts a networked session and fights as red.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    pub const RED: PlayerId = PlayerId(1);
    pub const BLUE: PlayerId = PlayerId(2);
}

/// Who controls a unit or map object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Owner {
    #[default]
    Neutral,
    Player(PlayerId),
}

impl Owner {
    /// Neutral objects and the viewer's own objects read as friendly
    pub fn is_neutral_or_friendly(&self, viewer: PlayerId) -> bool {
        match self {
            Owner::Neutral => true,
            Owner::Player(player) => *player == viewer,
        }
    }
}
