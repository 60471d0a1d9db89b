//! Replication roles, messages and transport
//!
//! In a networked match the host is the only process allowed to roll combat
//! damage. Peers receive the results and apply them verbatim.

pub mod channel;
pub mod message;

use serde::{Deserialize, Serialize};

pub use channel::{channel, Rx, Tx};
pub use message::{CloudParticipant, ReplicationMessage};

/// Part this process plays in a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkRole {
    /// Single process, no replication
    #[default]
    Offline,
    /// Authoritative side of a two-player match
    Host,
    /// Non-authoritative side; applies what the host sends
    Peer,
}

impl NetworkRole {
    pub fn is_networked(&self) -> bool {
        !matches!(self, NetworkRole::Offline)
    }

    /// Proof of combat authority, if this role has it
    pub fn authority(&self) -> Option<Authority> {
        match self {
            NetworkRole::Offline | NetworkRole::Host => Some(Authority { _private: () }),
            NetworkRole::Peer => None,
        }
    }
}

/// Token required to compute combat exchanges.
///
/// Only obtainable through [`NetworkRole::authority`], so a peer cannot roll
/// damage even by accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authority {
    _private: (),
}
