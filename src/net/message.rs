//! Messages the host replicates to its peer
//!
//! Encoded as JSON. The transport only moves bytes.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::{EntityId, Owner};
use crate::grid::TileCoord;

/// One side of a combat cloud
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudParticipant {
    pub unit: EntityId,
    pub owner: Owner,
    /// Sprite key of the fighter's head in the cloud
    pub sprite: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ReplicationMessage {
    /// A skirmish started; participants are ordered red (player 1) first
    CombatCloudSpawn {
        position: Vec2,
        participants: Vec<CloudParticipant>,
    },
    /// Hit points lost by each side in one exchange
    HpDelta {
        unit_a: EntityId,
        unit_b: EntityId,
        delta_a: f32,
        delta_b: f32,
    },
    /// A spawner dropped food on the host
    FoodSpawn {
        food: EntityId,
        tile: TileCoord,
        value: u32,
    },
}

impl ReplicationMessage {
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
