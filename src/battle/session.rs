//! A single running battle between one attacker and one defender

use glam::Vec2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::types::EntityId;
use crate::grid::TileCoord;
use crate::net::CloudParticipant;
use crate::world::board::Board;

/// Unique identifier for a battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BattleId(pub Uuid);

impl BattleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BattleId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleKind {
    /// Two units inside a combat cloud, both flagged in battle and hidden
    Skirmish,
    /// A warrior attacking an anthill from a neighbouring tile
    Siege,
}

/// The cloud drawn over a skirmish
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatCloud {
    pub position: Vec2,
    /// Red (player 1) first
    pub participants: Vec<CloudParticipant>,
}

/// Why a battle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleOutcome {
    /// The besieging warrior was dragged into a skirmish of its own
    Interrupted,
    /// The besieging warrior was sent somewhere else
    WalkedAway,
    /// At least one side dropped to zero hit points
    Destroyed {
        attacker_destroyed: bool,
        defender_destroyed: bool,
    },
    /// A participant left the board mid-battle
    TargetLost,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleSession {
    pub id: BattleId,
    pub attacker: EntityId,
    pub defender: EntityId,
    pub kind: BattleKind,
    /// Tile the attacker stood on when the battle began
    pub tile: TileCoord,
    pub started_at: f32,
    /// Simulation time of the next termination check and exchange
    pub next_boundary: f32,
    pub exchanges: u32,
    pub cloud: Option<CombatCloud>,
}

impl BattleSession {
    pub fn involves(&self, id: EntityId) -> bool {
        self.attacker == id || self.defender == id
    }

    /// Check whether the battle is over, in this order: siege interrupted,
    /// siege abandoned, someone destroyed.
    pub fn termination(&self, board: &Board) -> Option<BattleOutcome> {
        let (Some(attacker), Some(defender)) = (board.unit(self.attacker), board.combatant(self.defender)) else {
            return Some(BattleOutcome::TargetLost);
        };

        if self.kind == BattleKind::Siege {
            if attacker.in_battle {
                return Some(BattleOutcome::Interrupted);
            }
            if attacker.warrior().is_some_and(|w| w.has_set_new_path) {
                return Some(BattleOutcome::WalkedAway);
            }
        }

        let attacker_destroyed = attacker.stats.is_destroyed();
        let defender_destroyed = defender.stats().is_destroyed();
        if attacker_destroyed || defender_destroyed {
            return Some(BattleOutcome::Destroyed {
                attacker_destroyed,
                defender_destroyed,
            });
        }

        None
    }
}

/// Summary of a finished battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleReport {
    pub id: BattleId,
    pub attacker: EntityId,
    pub defender: EntityId,
    pub kind: BattleKind,
    pub outcome: BattleOutcome,
    pub exchanges: u32,
    pub ended_at: f32,
    /// Participants left at or below zero hit points
    pub destroyed: Vec<EntityId>,
}

impl BattleReport {
    pub fn attacker_survived(&self) -> bool {
        !self.destroyed.contains(&self.attacker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Owner, PlayerId};
    use crate::grid::{GridGeometry, GridIndex, Terrain};
    use crate::objects::{MapObject, ObjectKind};
    use crate::units::unit::{Unit, UnitVariant};

    fn board() -> Board {
        let mut board = Board::new(GridIndex::filled(GridGeometry::default(), 4, 4, Terrain::Soil));
        let tile = TileCoord::new(1, 1);
        let position = board.grid.geometry().center(tile);
        board.add_unit(Unit::new(
            EntityId(1),
            Owner::Player(PlayerId::RED),
            UnitVariant::Warrior,
            tile,
            position,
        ));
        board.add_object(MapObject::new(
            EntityId(2),
            Owner::Player(PlayerId::BLUE),
            ObjectKind::anthill(),
            TileCoord::new(2, 1),
        ));
        board
    }

    fn siege() -> BattleSession {
        BattleSession {
            id: BattleId::new(),
            attacker: EntityId(1),
            defender: EntityId(2),
            kind: BattleKind::Siege,
            tile: TileCoord::new(1, 1),
            started_at: 0.0,
            next_boundary: 1.0,
            exchanges: 0,
            cloud: None,
        }
    }

    #[test]
    fn test_running_siege_has_no_outcome() {
        assert_eq!(siege().termination(&board()), None);
    }

    #[test]
    fn test_interruption_checked_before_walking_away() {
        let mut board = board();
        let unit = board.unit_mut(EntityId(1)).unwrap();
        unit.in_battle = true;
        unit.warrior_mut().unwrap().has_set_new_path = true;
        assert_eq!(siege().termination(&board), Some(BattleOutcome::Interrupted));
    }

    #[test]
    fn test_walking_away_checked_before_destruction() {
        let mut board = board();
        board.unit_mut(EntityId(1)).unwrap().warrior_mut().unwrap().has_set_new_path = true;
        board.combatant_mut(EntityId(2)).unwrap().stats_mut().lose_hp(100.0);
        assert_eq!(siege().termination(&board), Some(BattleOutcome::WalkedAway));
    }

    #[test]
    fn test_destroyed_defender() {
        let mut board = board();
        board.combatant_mut(EntityId(2)).unwrap().stats_mut().lose_hp(100.0);
        assert_eq!(
            siege().termination(&board),
            Some(BattleOutcome::Destroyed {
                attacker_destroyed: false,
                defender_destroyed: true
            })
        );
    }

    #[test]
    fn test_skirmish_ignores_siege_rules() {
        let mut board = board();
        board.unit_mut(EntityId(1)).unwrap().in_battle = true;
        let mut session = siege();
        session.kind = BattleKind::Skirmish;
        assert_eq!(session.termination(&board), None);
    }

    #[test]
    fn test_vanished_participant() {
        let mut board = board();
        board.remove_unit(EntityId(1));
        assert_eq!(siege().termination(&board), Some(BattleOutcome::TargetLost));
    }
}
