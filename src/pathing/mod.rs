//! Paths and the incremental pathfinder

pub mod path;
pub mod search;

pub use path::Path;
pub use search::{find_path, PathSearch, SearchState};
