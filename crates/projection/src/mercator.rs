//! Web Mercator (EPSG:3857) projection into global tile-pixel space.
//!
//! At zoom `z` the whole world is a square of `256 * 2^z` pixels with the
//! origin at the top-left (180°W, ~85.05°N). Tile `(x, y)` covers pixels
//! `[256x, 256x + 256) × [256y, 256y + 256)`.

use std::f64::consts::PI;

use amesh_common::{TileCoord, TILE_SIZE};

/// Highest zoom level the projector accepts.
pub const MAX_ZOOM: i32 = 30;

/// Mean Earth radius in kilometres, used for distance offsets.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Project a geographic coordinate to fractional global pixel coordinates.
///
/// Zoom levels outside `0..=30` yield `(0.0, 0.0)` instead of an error.
pub fn project(lat: f64, lng: f64, zoom: i32) -> (f64, f64) {
    if !(0..=MAX_ZOOM).contains(&zoom) {
        return (0.0, 0.0);
    }
    let zoom_factor = (1u64 << zoom) as f64;
    let size = TILE_SIZE as f64;
    let x = size * zoom_factor * (lng + 180.0) / 360.0;
    let y = size * zoom_factor * (0.5 - (PI / 4.0 + lat.to_radians() / 2.0).tan().ln() / (2.0 * PI));
    (x, y)
}

/// Tile indices containing a global pixel coordinate.
pub fn tile_of(x: f64, y: f64) -> (i64, i64) {
    let size = TILE_SIZE as f64;
    ((x / size).floor() as i64, (y / size).floor() as i64)
}

/// Point `distance_km` away from `(lat, lng)` along `bearing` (radians,
/// clockwise from north), using the small-angle approximation.
///
/// Accurate for the tens of kilometres the distance rings cover; it ignores
/// the convergence of meridians beyond the cosine of the start latitude.
pub fn offset_point(lat: f64, lng: f64, distance_km: f64, bearing: f64) -> (f64, f64) {
    let angular = distance_km / EARTH_RADIUS_KM;
    let new_lat = lat + angular * bearing.cos() * 180.0 / PI;
    let new_lng = lng + angular * bearing.sin() * 180.0 / PI / lat.to_radians().cos();
    (new_lat, new_lng)
}

/// Maps geographic coordinates to pixel positions on a square canvas whose
/// centre is a given geographic point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub zoom: i32,
    /// Global pixel coordinate of the canvas centre
    pub center_px: (f64, f64),
    /// Canvas side length in pixels
    pub canvas_size: u32,
}

impl Viewport {
    pub fn new(center_lat: f64, center_lng: f64, zoom: i32, canvas_size: u32) -> Self {
        Self {
            zoom,
            center_px: project(center_lat, center_lng, zoom),
            canvas_size,
        }
    }

    /// Canvas-local pixel for a geographic coordinate, truncated toward zero.
    ///
    /// The result may lie outside the canvas; drawing routines clip it.
    pub fn to_canvas(&self, lat: f64, lng: f64) -> (i64, i64) {
        let (x, y) = project(lat, lng, self.zoom);
        let half = (self.canvas_size / 2) as f64;
        (
            (x - self.center_px.0 + half) as i64,
            (y - self.center_px.1 + half) as i64,
        )
    }

    /// Tile that contains the canvas centre.
    pub fn center_tile(&self) -> TileCoord {
        let (x, y) = tile_of(self.center_px.0, self.center_px.1);
        TileCoord {
            z: self.zoom.max(0) as u32,
            x,
            y,
        }
    }
}
