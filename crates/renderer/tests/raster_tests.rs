//! Bounds-safety tests for the drawing primitives.
//!
//! Shapes may be requested anywhere in i64 space; only in-canvas pixels may
//! change and nothing may panic.

use image::{Rgba, RgbaImage};
use projection::Viewport;
use renderer::{
    draw_distance_rings, draw_filled_circle, draw_line, draw_marker, draw_over, Canvas, Color,
    Rect, MARKER_COLOR, MARKER_RADIUS, OPAQUE,
};

const INK: Color = Color::rgb(0, 0, 0);

fn count_ink(canvas: &Canvas) -> usize {
    canvas
        .pixels()
        .chunks_exact(4)
        .filter(|p| *p == INK.to_array())
        .count()
}

#[test]
fn test_line_fully_outside_is_noop() {
    let mut canvas = Canvas::filled(16, 16, Color::WHITE);
    let before = canvas.clone();
    draw_line(&mut canvas, -100, -100, -50, -20, INK);
    draw_line(&mut canvas, 20, 0, 60, 10, INK);
    assert_eq!(canvas, before);
}

#[test]
fn test_line_crossing_canvas_is_clipped() {
    let mut canvas = Canvas::filled(16, 16, Color::WHITE);
    draw_line(&mut canvas, -10, 8, 30, 8, INK);
    assert_eq!(count_ink(&canvas), 16);
    for x in 0..16 {
        assert_eq!(canvas.get_pixel(x, 8), Some(INK));
    }
}

#[test]
fn test_steep_line_touches_every_row() {
    let mut canvas = Canvas::filled(16, 16, Color::WHITE);
    draw_line(&mut canvas, 2, 0, 5, 15, INK);
    for y in 0..16 {
        let row_has_ink = (0..16).any(|x| canvas.get_pixel(x, y) == Some(INK));
        assert!(row_has_ink, "row {} empty", y);
    }
}

#[test]
fn test_circle_partially_outside() {
    let mut canvas = Canvas::filled(16, 16, Color::WHITE);
    draw_filled_circle(&mut canvas, 0, 0, MARKER_RADIUS, INK);

    // One quadrant (including the axes) of a radius-7 disc
    let expected = (0..=7i64)
        .flat_map(|dy| (0..=7i64).map(move |dx| (dx, dy)))
        .filter(|(dx, dy)| dx * dx + dy * dy <= 49)
        .count();
    assert_eq!(count_ink(&canvas), expected);
}

#[test]
fn test_circle_far_away_is_noop() {
    let mut canvas = Canvas::filled(16, 16, Color::WHITE);
    let before = canvas.clone();
    draw_filled_circle(&mut canvas, 1_000_000, -1_000_000, MARKER_RADIUS, INK);
    assert_eq!(canvas, before);
}

#[test]
fn test_tile_blit_at_edge_is_clipped() {
    let mut canvas = Canvas::filled(300, 300, Color::WHITE);
    let tile = RgbaImage::from_pixel(256, 256, Rgba([0, 0, 0, 255]));
    draw_over(&mut canvas, &tile, Rect::new(256, 256, 256, 256), OPAQUE);

    assert_eq!(count_ink(&canvas), 44 * 44);
    assert_eq!(canvas.get_pixel(255, 255), Some(Color::WHITE));
    assert_eq!(canvas.get_pixel(299, 299), Some(INK));
}

// ============================================================================
// Extreme coordinates
// ============================================================================

#[test]
fn test_line_between_i64_extremes_terminates() {
    let mut canvas = Canvas::filled(16, 16, Color::WHITE);
    draw_line(&mut canvas, i64::MAX, 0, i64::MIN, 0, INK);
    draw_line(&mut canvas, i64::MIN, i64::MIN, i64::MAX, i64::MAX, INK);
    draw_line(&mut canvas, i64::MAX, i64::MIN, i64::MIN, i64::MAX, INK);
    assert_eq!((canvas.width(), canvas.height()), (16, 16));
}

#[test]
fn test_horizontal_line_at_i64_extremes_stays_on_its_row() {
    let mut canvas = Canvas::filled(16, 16, Color::WHITE);
    draw_line(&mut canvas, i64::MAX, 0, i64::MIN, 0, INK);
    for y in 1..16 {
        for x in 0..16 {
            assert_eq!(canvas.get_pixel(x, y), Some(Color::WHITE), "({}, {})", x, y);
        }
    }
}

#[test]
fn test_line_far_beyond_canvas_spans_the_row() {
    let mut canvas = Canvas::filled(16, 16, Color::WHITE);
    draw_line(&mut canvas, -1_000_000_000_000, 8, 1_000_000_000_000, 8, INK);
    assert_eq!(count_ink(&canvas), 16);
    for x in 0..16 {
        assert_eq!(canvas.get_pixel(x, 8), Some(INK));
    }
}

#[test]
fn test_circle_at_i64_extremes_is_noop() {
    let mut canvas = Canvas::filled(16, 16, Color::WHITE);
    let before = canvas.clone();
    draw_filled_circle(&mut canvas, i64::MAX, i64::MIN, MARKER_RADIUS, INK);
    draw_filled_circle(&mut canvas, i64::MIN, 0, MARKER_RADIUS, INK);
    draw_filled_circle(&mut canvas, i64::MIN, i64::MIN, i64::MAX, INK);
    assert_eq!(canvas, before);
}

#[test]
fn test_huge_circle_covers_canvas() {
    let mut canvas = Canvas::filled(16, 16, Color::WHITE);
    draw_filled_circle(&mut canvas, 5, 5, i64::MAX, INK);
    assert_eq!(count_ink(&canvas), 16 * 16);
}

#[test]
fn test_rings_at_the_pole_terminate() {
    let mut canvas = Canvas::filled(1280, 1280, Color::WHITE);
    let viewport = Viewport::new(90.0, 0.0, 10, 1280);
    draw_distance_rings(&mut canvas, &viewport, 90.0, 0.0);
    assert_eq!((canvas.width(), canvas.height()), (1280, 1280));
}

#[test]
fn test_marker_at_absurd_longitude_is_skipped() {
    let mut canvas = Canvas::filled(256, 256, Color::WHITE);
    let before = canvas.clone();
    let viewport = Viewport::new(35.0, 139.0, 10, 256);
    draw_marker(&mut canvas, &viewport, 35.0, 1e300, MARKER_COLOR);
    assert_eq!(canvas, before);
}
