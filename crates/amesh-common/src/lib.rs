//! Common types and utilities shared across the amesh crates and services.

pub mod error;
pub mod location;
pub mod tile;

pub use error::{AmeshError, AmeshResult, ErrorKind, ResultExt};
pub use location::{LightningPoint, Location};
pub use tile::{canvas_size, GridTile, TileCoord, TileGrid, TILE_SIZE};
