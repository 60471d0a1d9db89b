//! Colonies - hex-grid ant colony strategy simulation

pub mod battle;
pub mod core;
pub mod grid;
pub mod net;
pub mod objects;
pub mod pathing;
pub mod units;
pub mod world;
