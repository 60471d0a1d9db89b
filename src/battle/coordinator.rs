//! Runs every battle on the board
//!
//! A battle exchanges blows once when it starts and then once per interval.
//! At every interval boundary the termination rules are checked before the
//! next exchange. Only the side holding combat authority rolls damage; peers
//! learn hit point losses from replicated deltas.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::battle::combatant::Attackable;
use crate::battle::exchange::{apply_exchange, compute_exchange};
use crate::battle::session::{
    BattleId, BattleKind, BattleOutcome, BattleReport, BattleSession, CombatCloud,
};
use crate::core::config::BattleConfig;
use crate::core::types::{EntityId, Owner, PlayerId};
use crate::net::{Authority, CloudParticipant, NetworkRole, ReplicationMessage};
use crate::world::board::Board;

/// Why a battle could not be started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngageRefusal {
    #[error("{0} cannot attack itself")]
    SelfTarget(EntityId),
    #[error("attacker {0} is not on the board")]
    UnknownAttacker(EntityId),
    #[error("{0} cannot be attacked")]
    InvalidTarget(EntityId),
    #[error("attacker {0} is already fighting")]
    AttackerBusy(EntityId),
    #[error("defender {0} is already in a skirmish")]
    DefenderBusy(EntityId),
}

pub struct BattleCoordinator {
    config: BattleConfig,
    sessions: Vec<BattleSession>,
    history: Vec<BattleReport>,
    rng: ChaCha8Rng,
}

impl BattleCoordinator {
    pub fn new(config: BattleConfig, seed: u64) -> Self {
        Self {
            config,
            sessions: Vec::new(),
            history: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn sessions(&self) -> &[BattleSession] {
        &self.sessions
    }

    /// Every battle finished so far, oldest first
    pub fn history(&self) -> &[BattleReport] {
        &self.history
    }

    pub fn is_engaged(&self, id: EntityId) -> bool {
        self.sessions.iter().any(|s| s.involves(id))
    }

    pub fn leads_battle(&self, id: EntityId) -> bool {
        self.sessions.iter().any(|s| s.attacker == id)
    }

    /// Clouds of the skirmishes currently running
    pub fn clouds(&self) -> impl Iterator<Item = &CombatCloud> {
        self.sessions.iter().filter_map(|s| s.cloud.as_ref())
    }

    /// Start a battle between `attacker` and `defender` at time `now`.
    ///
    /// The first exchange happens immediately. Requests from a unit already
    /// fighting, or against a unit already in a skirmish, are refused.
    pub fn commence(
        &mut self,
        board: &mut Board,
        attacker: EntityId,
        defender: EntityId,
        now: f32,
        role: NetworkRole,
        outbox: &mut Vec<ReplicationMessage>,
    ) -> Result<BattleId, EngageRefusal> {
        if attacker == defender {
            return Err(EngageRefusal::SelfTarget(attacker));
        }
        let unit = board.unit(attacker).ok_or(EngageRefusal::UnknownAttacker(attacker))?;
        if unit.in_battle || self.leads_battle(attacker) {
            debug!("Dropping battle request from busy attacker {}", attacker);
            return Err(EngageRefusal::AttackerBusy(attacker));
        }
        let tile = unit.current_tile;

        let target = board.combatant(defender).ok_or(EngageRefusal::InvalidTarget(defender))?;
        let kind = if target.is_structure() {
            BattleKind::Siege
        } else {
            BattleKind::Skirmish
        };
        if board.unit(defender).is_some_and(|u| u.in_battle) {
            debug!("Dropping battle request against busy defender {}", defender);
            return Err(EngageRefusal::DefenderBusy(defender));
        }

        if let Some(warrior) = board.unit_mut(attacker).and_then(|u| u.warrior_mut()) {
            warrior.has_set_new_path = false;
        }

        let cloud = match kind {
            BattleKind::Skirmish => {
                for id in [attacker, defender] {
                    if let Some(unit) = board.unit_mut(id) {
                        unit.in_battle = true;
                        unit.hidden = true;
                    }
                }
                // Peers draw the clouds the host announces instead
                if role.authority().is_none() {
                    None
                } else {
                    let cloud = spawn_cloud(board, attacker, defender);
                    if role.is_networked() {
                        if let Some(cloud) = &cloud {
                            outbox.push(ReplicationMessage::CombatCloudSpawn {
                                position: cloud.position,
                                participants: cloud.participants.clone(),
                            });
                        }
                    }
                    cloud
                }
            }
            BattleKind::Siege => None,
        };

        let mut session = BattleSession {
            id: BattleId::new(),
            attacker,
            defender,
            kind,
            tile,
            started_at: now,
            next_boundary: now + self.config.exchange_interval,
            exchanges: 0,
            cloud,
        };
        info!("{:?} started: {} attacks {} at {:?}", kind, attacker, defender, tile);

        if let Some(authority) = role.authority() {
            exchange(
                &self.config,
                &mut self.rng,
                &mut session,
                board,
                &authority,
                role.is_networked(),
                outbox,
            );
        }

        let id = session.id;
        self.sessions.push(session);
        Ok(id)
    }

    /// Advance every battle to time `now`, returning the ones that ended
    pub fn update(
        &mut self,
        board: &mut Board,
        now: f32,
        role: NetworkRole,
        outbox: &mut Vec<ReplicationMessage>,
    ) -> Vec<BattleReport> {
        let authority = role.authority();
        let networked = role.is_networked();
        let mut finished = Vec::new();

        let mut index = 0;
        while index < self.sessions.len() {
            let mut outcome = None;
            {
                let session = &mut self.sessions[index];
                while now >= session.next_boundary {
                    outcome = session.termination(board);
                    if outcome.is_some() {
                        break;
                    }
                    if let Some(authority) = &authority {
                        exchange(&self.config, &mut self.rng, session, board, authority, networked, outbox);
                    }
                    session.next_boundary += self.config.exchange_interval;
                }
            }

            match outcome {
                Some(outcome) => {
                    let session = self.sessions.remove(index);
                    finished.push(resolve(board, session, outcome, now));
                }
                None => index += 1,
            }
        }

        self.history.extend(finished.iter().cloned());
        finished
    }

    /// Apply a hit point delta received from the host.
    ///
    /// Only peers accept deltas; the host computes its own and rejects them.
    pub fn apply_remote_delta(&self, board: &mut Board, role: NetworkRole, message: &ReplicationMessage) -> bool {
        let ReplicationMessage::HpDelta {
            unit_a,
            unit_b,
            delta_a,
            delta_b,
        } = message
        else {
            return false;
        };

        if role.authority().is_some() {
            warn!("Rejecting hp delta for {} and {}: this side has combat authority", unit_a, unit_b);
            return false;
        }

        for (id, delta) in [(*unit_a, *delta_a), (*unit_b, *delta_b)] {
            match board.combatant_mut(id) {
                Some(combatant) => combatant.stats_mut().lose_hp(delta),
                None => debug!("Hp delta for unknown combatant {}", id),
            }
        }
        true
    }
}

fn spawn_cloud(board: &Board, attacker: EntityId, defender: EntityId) -> Option<CombatCloud> {
    let position = board.position_of(defender)?;
    let mut participants = Vec::with_capacity(2);
    for id in [attacker, defender] {
        let unit = board.unit(id)?;
        participants.push(CloudParticipant {
            unit: id,
            owner: unit.owner,
            sprite: unit.fight_sprite().to_string(),
        });
    }
    // Red heads go on the left of the cloud
    if participants[1].owner == Owner::Player(PlayerId::RED) {
        participants.swap(0, 1);
    }
    Some(CombatCloud { position, participants })
}

fn exchange(
    config: &BattleConfig,
    rng: &mut ChaCha8Rng,
    session: &mut BattleSession,
    board: &mut Board,
    authority: &Authority,
    networked: bool,
    outbox: &mut Vec<ReplicationMessage>,
) {
    let (Some(mut a), Some(mut b)) = (
        board.combatant(session.attacker).map(|c| *c.stats()),
        board.combatant(session.defender).map(|c| *c.stats()),
    ) else {
        return;
    };

    let result = compute_exchange(authority, &a, &b, config, rng);
    apply_exchange(&result, &mut a, &mut b);
    if let Some(combatant) = board.combatant_mut(session.attacker) {
        *combatant.stats_mut() = a;
    }
    if let Some(combatant) = board.combatant_mut(session.defender) {
        *combatant.stats_mut() = b;
    }
    session.exchanges += 1;

    debug!(
        "Exchange {} between {} ({:.2} hp) and {} ({:.2} hp)",
        session.exchanges, session.attacker, a.current_hp, session.defender, b.current_hp
    );

    if networked {
        outbox.push(ReplicationMessage::HpDelta {
            unit_a: session.attacker,
            unit_b: session.defender,
            delta_a: result.damage_to_a,
            delta_b: result.damage_to_b,
        });
    }
}

/// Lift battle flags and report who is left at zero hit points
fn resolve(board: &mut Board, session: BattleSession, outcome: BattleOutcome, now: f32) -> BattleReport {
    if session.kind == BattleKind::Skirmish {
        for id in [session.attacker, session.defender] {
            if let Some(unit) = board.unit_mut(id) {
                unit.in_battle = false;
                unit.hidden = false;
            }
        }
    }
    if let Some(warrior) = board.unit_mut(session.attacker).and_then(|u| u.warrior_mut()) {
        warrior.has_set_new_path = false;
    }

    let destroyed: Vec<EntityId> = [session.attacker, session.defender]
        .into_iter()
        .filter(|id| board.combatant(*id).is_some_and(|c| c.stats().is_destroyed()))
        .collect();

    info!(
        "{:?} between {} and {} ended after {} exchanges: {:?}",
        session.kind, session.attacker, session.defender, session.exchanges, outcome
    );

    BattleReport {
        id: session.id,
        attacker: session.attacker,
        defender: session.defender,
        kind: session.kind,
        outcome,
        exchanges: session.exchanges,
        ended_at: now,
        destroyed,
    }
}
