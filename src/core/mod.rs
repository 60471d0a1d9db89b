pub mod config;
pub mod error;
pub mod types;

pub use config::SimConfig;
pub use error::{ColoniesError, Result};
pub use types::{EntityId, EntityIdAllocator, Owner, PlayerId, Tick};
