//! Ant units: state, walkability, movement and per-variant behaviour

pub mod behavior;
pub mod movement;
pub mod unit;
pub mod walkability;

pub use behavior::{drop_food, run_behavior, BehaviorEvent, FoodDrop};
pub use movement::{advance, begin_search, step_search, MovementResult};
pub use unit::{GathererState, Unit, UnitKind, UnitVariant, WarriorState};
pub use walkability::{can_walk_on, can_walk_to};
