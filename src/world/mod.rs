//! The simulation world: board, battles, spawners and the tick scheduler
//!
//! Each tick runs, in order: pathfinding slices, movement, unit behaviours,
//! battles, reaping of whatever was destroyed, and finally food spawners.
//! Spawners go last so the host's food ids come after every id both sides
//! allocate in the same tick.

pub mod board;
pub mod commands;
pub mod display;
pub mod loader;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::battle::{BattleCoordinator, BattleKind, BattleReport, CombatCloud};
use crate::core::config::SimConfig;
use crate::core::error::Result;
use crate::core::types::{EntityId, EntityIdAllocator, Owner, Tick};
use crate::grid::{GridIndex, TileCoord};
use crate::net::{NetworkRole, ReplicationMessage, Rx, Tx};
use crate::objects::spawner::SpawnerSystem;
use crate::objects::{MapObject, ObjectKind};
use crate::pathing::SearchState;
use crate::units::{advance, run_behavior, step_search, BehaviorEvent};

pub use board::Board;
pub use commands::{CommandOutcome, DropReason, Selection};
pub use display::DisplayImage;
pub use loader::MapFile;

/// Seed offsets so battles and spawners draw from separate streams
const BATTLE_STREAM: u64 = 0;
const SPAWNER_STREAM: u64 = 1;

/// Something notable that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorldEvent {
    PathFailed { unit: EntityId },
    Arrived { unit: EntityId, tile: TileCoord },
    BattleStarted { attacker: EntityId, defender: EntityId },
    BattleEnded(BattleReport),
    UnitDestroyed { unit: EntityId },
    AnthillRuined { anthill: EntityId, ruin: EntityId },
    FoodPickedUp { gatherer: EntityId, food: EntityId },
    FoodSpawned { food: EntityId, tile: TileCoord },
    ColonyFounded { queen: EntityId, anthill: EntityId, tile: TileCoord },
}

pub struct World {
    pub board: Board,
    pub battles: BattleCoordinator,
    pub spawners: SpawnerSystem,
    config: SimConfig,
    ids: EntityIdAllocator,
    tick: Tick,
    /// Simulation time in seconds
    clock: f32,
    pub(crate) selection: Option<Selection>,
    outbox: Vec<ReplicationMessage>,
    remote_clouds: Vec<CombatCloud>,
}

impl World {
    /// An empty world over `grid`
    pub fn new(config: SimConfig, grid: GridIndex) -> Self {
        let battles = BattleCoordinator::new(config.battle.clone(), config.seed.wrapping_add(BATTLE_STREAM));
        let spawners = SpawnerSystem::new(config.spawner.clone(), config.seed.wrapping_add(SPAWNER_STREAM));
        Self {
            board: Board::new(grid),
            battles,
            spawners,
            config,
            ids: EntityIdAllocator::new(),
            tick: 0,
            clock: 0.0,
            selection: None,
            outbox: Vec::new(),
            remote_clouds: Vec::new(),
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn role(&self) -> NetworkRole {
        self.config.network.role
    }

    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    pub fn clock(&self) -> f32 {
        self.clock
    }

    /// Next sequential entity id
    pub fn allocate_id(&mut self) -> EntityId {
        self.ids.allocate()
    }

    /// Advance the simulation by `dt` seconds
    pub fn tick(&mut self, dt: f32) -> Vec<WorldEvent> {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.tick += 1;
        self.clock += dt;

        let mut events = Vec::new();
        self.step_searches(&mut events);
        self.step_movement(dt, &mut events);
        self.step_behaviours(&mut events);
        let reports = self.step_battles(&mut events);
        self.reap(&reports, &mut events);
        self.step_spawners(dt, &mut events);
        events
    }

    fn step_searches(&mut self, events: &mut Vec<WorldEvent>) {
        let steps = self.config.pathing.steps_per_tick;
        let Board { grid, units, objects } = &mut self.board;
        for unit in units.values_mut().filter(|u| u.is_calculating_path()) {
            if let Some(SearchState::Failed) = step_search(unit, grid, objects, steps) {
                events.push(WorldEvent::PathFailed { unit: unit.id });
            }
        }
    }

    fn step_movement(&mut self, dt: f32, events: &mut Vec<WorldEvent>) {
        let Board { grid, units, objects } = &mut self.board;
        for unit in units.values_mut() {
            let result = advance(unit, grid, objects, dt);
            if let Some(tile) = result.arrived {
                events.push(WorldEvent::Arrived { unit: unit.id, tile });
            }
        }
    }

    fn step_behaviours(&mut self, events: &mut Vec<WorldEvent>) {
        for id in self.board.unit_ids() {
            let Some(event) = run_behavior(&mut self.board, id) else {
                continue;
            };
            match event {
                BehaviorEvent::CommenceBattle { attacker, defender } => {
                    let role = self.role();
                    match self
                        .battles
                        .commence(&mut self.board, attacker, defender, self.clock, role, &mut self.outbox)
                    {
                        Ok(_) => events.push(WorldEvent::BattleStarted { attacker, defender }),
                        Err(refusal) => {
                            debug!("Battle not started: {}", refusal);
                            // A warrior that walked onto a busy defender steps back off
                            if self.board.unit(attacker).is_some() && self.board.settle(attacker).is_none() {
                                warn!("Unit {} has no free tile to stand on", attacker);
                            }
                        }
                    }
                }
                BehaviorEvent::FoundColony { queen, ruin, tile } => {
                    if let Some(anthill) = self.found_colony(queen, ruin, tile) {
                        events.push(WorldEvent::ColonyFounded { queen, anthill, tile });
                    }
                }
                BehaviorEvent::PickedUpFood { gatherer, food } => {
                    events.push(WorldEvent::FoodPickedUp { gatherer, food });
                }
            }
        }
    }

    fn step_battles(&mut self, events: &mut Vec<WorldEvent>) -> Vec<BattleReport> {
        let role = self.role();
        let reports = self.battles.update(&mut self.board, self.clock, role, &mut self.outbox);
        events.extend(reports.iter().cloned().map(WorldEvent::BattleEnded));
        reports
    }

    fn step_spawners(&mut self, dt: f32, events: &mut Vec<WorldEvent>) {
        let authority = self.role().authority();
        let requests = self
            .spawners
            .update(dt, &self.board.grid, &self.board.objects, authority.as_ref());
        let value = self.spawners.food_value();
        for request in requests {
            let food = self.ids.allocate();
            self.board.add_object(MapObject::new(
                food,
                Owner::Neutral,
                ObjectKind::Food { value },
                request.tile,
            ));
            events.push(WorldEvent::FoodSpawned {
                food,
                tile: request.tile,
            });
            if self.role().is_networked() {
                self.outbox.push(ReplicationMessage::FoodSpawn {
                    food,
                    tile: request.tile,
                    value,
                });
            }
        }
    }

    /// Remove everything battles left at zero hit points
    fn reap(&mut self, reports: &[BattleReport], events: &mut Vec<WorldEvent>) {
        for report in reports {
            for &id in &report.destroyed {
                if self.board.unit(id).is_some() {
                    self.destroy_unit(id);
                    events.push(WorldEvent::UnitDestroyed { unit: id });
                } else if self.board.objects.anthill(id).is_some() {
                    let ruin = self.ids.allocate();
                    if let Some(tile) = self.board.ruin_anthill(id, ruin) {
                        info!("Anthill {} fell, leaving ruin {} at {:?}", id, ruin, tile);
                        events.push(WorldEvent::AnthillRuined { anthill: id, ruin });
                    }
                }
            }

            // The winner of a skirmish stands on the loser's tile
            if report.kind == BattleKind::Skirmish && report.attacker_survived() {
                let tile = self.board.settle(report.attacker);
                debug!("Attacker {} holds {:?} after battle", report.attacker, tile);
            }
        }
    }

    fn destroy_unit(&mut self, id: EntityId) {
        if self.selection == Some(Selection::Unit(id)) {
            self.selection = None;
        }
        self.board.remove_unit(id);
    }

    /// Replace a ruin with a new anthill owned by the queen's owner
    fn found_colony(&mut self, queen: EntityId, ruin: EntityId, tile: TileCoord) -> Option<EntityId> {
        let owner = self.board.unit(queen)?.owner;
        self.board.objects.remove(ruin)?;
        self.destroy_unit(queen);

        let anthill = self.ids.allocate();
        self.board
            .add_object(MapObject::new(anthill, owner, ObjectKind::anthill(), tile));
        info!("Queen {} founded anthill {} at {:?}", queen, anthill, tile);
        Some(anthill)
    }

    /// Messages produced since the last drain, oldest first
    pub fn drain_outbox(&mut self) -> Vec<ReplicationMessage> {
        std::mem::take(&mut self.outbox)
    }

    /// Apply one message received from the other side.
    ///
    /// Returns false when the message was rejected.
    pub fn apply_remote(&mut self, message: ReplicationMessage) -> bool {
        let role = self.role();
        match message {
            ReplicationMessage::HpDelta { .. } => self.battles.apply_remote_delta(&mut self.board, role, &message),
            ReplicationMessage::CombatCloudSpawn { position, participants } => {
                if role != NetworkRole::Peer {
                    warn!("Rejecting combat cloud from the wire: this side spawns its own");
                    return false;
                }
                self.remote_clouds.push(CombatCloud { position, participants });
                true
            }
            ReplicationMessage::FoodSpawn { food, tile, value } => {
                if role != NetworkRole::Peer {
                    warn!("Rejecting food {} from the wire: this side spawns its own", food);
                    return false;
                }
                if self.board.contains(food) || !self.board.grid.contains(tile) {
                    warn!("Rejecting food {} at {:?}: id taken or tile off the map", food, tile);
                    return false;
                }
                self.ids.reserve(food);
                self.board
                    .add_object(MapObject::new(food, Owner::Neutral, ObjectKind::Food { value }, tile));
                true
            }
        }
    }

    /// Clouds announced by the host that the display has not taken yet
    pub fn take_remote_clouds(&mut self) -> Vec<CombatCloud> {
        std::mem::take(&mut self.remote_clouds)
    }

    /// Encode and send every pending message. Returns how many went out.
    pub fn flush(&mut self, tx: &Tx) -> Result<usize> {
        let mut sent = 0;
        for message in self.drain_outbox() {
            if tx.send_message(&message)? {
                sent += 1;
            }
        }
        Ok(sent)
    }

    /// Apply every message waiting on `rx`. Returns how many were accepted.
    pub fn receive(&mut self, rx: &Rx) -> Result<usize> {
        let mut accepted = 0;
        for message in rx.drain_messages()? {
            if self.apply_remote(message) {
                accepted += 1;
            }
        }
        Ok(accepted)
    }
}
