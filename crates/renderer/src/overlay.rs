//! Geographic overlays: distance rings and point markers.

use std::f64::consts::PI;

use projection::{offset_point, Viewport};

use crate::canvas::{Canvas, Color};
use crate::raster::{draw_filled_circle, draw_line};

/// Straight segments used to approximate one distance ring.
pub const RING_SEGMENTS: usize = 64;

/// Radii of the distance rings drawn around the centre, in kilometres.
pub const RING_RADII_KM: [f64; 5] = [10.0, 20.0, 30.0, 40.0, 50.0];

/// Ring color.
pub const RING_COLOR: Color = Color::rgb(100, 100, 100);

/// Marker radius in pixels.
pub const MARKER_RADIUS: i64 = 7;

/// Lightning marker color.
pub const MARKER_COLOR: Color = Color::rgb(0, 255, 255);

/// Draw a circle of `radius_km` around `(lat, lng)` as connected segments.
pub fn draw_distance_ring(
    canvas: &mut Canvas,
    viewport: &Viewport,
    lat: f64,
    lng: f64,
    radius_km: f64,
    color: Color,
) {
    for i in 0..RING_SEGMENTS {
        let a1 = i as f64 * 2.0 * PI / RING_SEGMENTS as f64;
        let a2 = (i + 1) as f64 * 2.0 * PI / RING_SEGMENTS as f64;

        let (lat1, lng1) = offset_point(lat, lng, radius_km, a1);
        let (lat2, lng2) = offset_point(lat, lng, radius_km, a2);

        let (x1, y1) = viewport.to_canvas(lat1, lng1);
        let (x2, y2) = viewport.to_canvas(lat2, lng2);

        draw_line(canvas, x1, y1, x2, y2, color);
    }
}

/// Draw every standard distance ring around the viewport's centre point.
pub fn draw_distance_rings(canvas: &mut Canvas, viewport: &Viewport, lat: f64, lng: f64) {
    for radius in RING_RADII_KM {
        draw_distance_ring(canvas, viewport, lat, lng, radius, RING_COLOR);
    }
}

/// Draw a filled marker at a geographic point.
pub fn draw_marker(canvas: &mut Canvas, viewport: &Viewport, lat: f64, lng: f64, color: Color) {
    let (x, y) = viewport.to_canvas(lat, lng);
    draw_filled_circle(canvas, x, y, MARKER_RADIUS, color);
}
