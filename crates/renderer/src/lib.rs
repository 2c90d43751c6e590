//! Raster drawing for radar map images.
//!
//! Provides the pieces the compositor stitches together:
//! - RGBA canvas with bounds-checked pixel access
//! - Bresenham lines and filled circles
//! - Porter-Duff "over" compositing of decoded tiles
//! - Distance rings and point markers in geographic coordinates
//! - PNG encoding (indexed or RGBA) and decoding

pub mod blend;
pub mod canvas;
pub mod overlay;
pub mod png;
pub mod raster;

pub use blend::{draw_over, Rect, OPAQUE};
pub use canvas::{Canvas, Color};
pub use overlay::{
    draw_distance_ring, draw_distance_rings, draw_marker, MARKER_COLOR, MARKER_RADIUS,
    RING_COLOR, RING_RADII_KM, RING_SEGMENTS,
};
pub use png::{decode_canvas, decode_image, encode_canvas};
pub use raster::{draw_filled_circle, draw_line};
