//! Battles between units and against anthills
//!
//! Two units meeting on a tile fight a skirmish inside a combat cloud. A
//! warrior reaching the tile next to an enemy anthill lays siege to it.
//! Both trade blows once per interval until one of the termination rules
//! fires.

pub mod combatant;
pub mod coordinator;
pub mod exchange;
pub mod session;

pub use combatant::{Attackable, CombatStats};
pub use coordinator::{BattleCoordinator, EngageRefusal};
pub use exchange::{apply_exchange, compute_exchange, Exchange};
pub use session::{BattleId, BattleKind, BattleOutcome, BattleReport, BattleSession, CombatCloud};
