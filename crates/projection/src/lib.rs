//! Coordinate transformations between geographic and tile-pixel space.
//!
//! Implements the Web Mercator projection from scratch without external dependencies.

pub mod mercator;

pub use mercator::{offset_point, project, tile_of, Viewport, EARTH_RADIUS_KM, MAX_ZOOM};
