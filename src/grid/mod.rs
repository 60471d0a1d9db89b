//! Hex tile grid: coordinates, tiles, occupancy and selection marks

pub mod coord;
pub mod index;
pub mod tile;

pub use coord::{GridGeometry, TileCoord};
pub use index::{Claim, GridIndex};
pub use tile::{Terrain, Tile};
