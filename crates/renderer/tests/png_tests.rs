//! Tests for PNG encoding of rendered canvases.
//!
//! Covers:
//! - Encoded output decodes back to identical pixels
//! - Format selection (indexed vs RGBA) does not change the pixels
//! - Tiles produced by external encoders decode correctly

use renderer::png::{decode_canvas, decode_image, encode_canvas, encode_png, encode_png_rgba};
use renderer::{draw_distance_rings, draw_marker, Canvas, Color, MARKER_COLOR};
use projection::Viewport;
use test_utils::{solid_tile_png, split_tile_png};

// ============================================================================
// Helper functions
// ============================================================================

/// A canvas resembling a finished radar image: white map, rings and a marker.
fn sample_render(size: u32) -> Canvas {
    let mut canvas = Canvas::filled(size, size, Color::WHITE);
    let viewport = Viewport::new(35.6895, 139.6917, 10, size);
    draw_distance_rings(&mut canvas, &viewport, 35.6895, 139.6917);
    draw_marker(&mut canvas, &viewport, 35.70, 139.70, MARKER_COLOR);
    canvas
}

/// A canvas with far more than 256 distinct colors.
fn gradient_canvas(width: u32, height: u32) -> Canvas {
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            pixels.extend_from_slice(&[(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255]);
        }
    }
    Canvas::from_rgba(width, height, pixels).unwrap()
}

// ============================================================================
// Round-trip tests
// ============================================================================

#[test]
fn test_rendered_canvas_round_trips() {
    let canvas = sample_render(320);
    let png = encode_canvas(&canvas).unwrap();
    let decoded = decode_canvas(&png).unwrap();

    assert_eq!(decoded.width(), 320);
    assert_eq!(decoded.height(), 320);
    assert_eq!(decoded, canvas);
}

#[test]
fn test_many_colors_round_trip_through_rgba() {
    let canvas = gradient_canvas(300, 40);
    let png = encode_canvas(&canvas).unwrap();
    let decoded = decode_canvas(&png).unwrap();
    assert_eq!(decoded, canvas);
}

#[test]
fn test_indexed_and_rgba_decode_identically() {
    let canvas = sample_render(128);
    let (w, h) = (canvas.width(), canvas.height());

    let indexed = encode_png(canvas.pixels(), w, h).unwrap();
    let rgba = encode_png_rgba(canvas.pixels(), w, h).unwrap();

    let a = decode_canvas(&indexed).unwrap();
    let b = decode_canvas(&rgba).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_full_size_canvas_dimensions() {
    // Default grid: radius 2 => 5x5 tiles of 256px
    let canvas = Canvas::filled(1280, 1280, Color::WHITE);
    let png = encode_canvas(&canvas).unwrap();
    let img = decode_image(&png).unwrap();
    assert_eq!(img.dimensions(), (1280, 1280));
}

// ============================================================================
// Decoding externally encoded tiles
// ============================================================================

#[test]
fn test_decode_solid_tile() {
    let bytes = solid_tile_png(256, 256, [10, 20, 30, 255]);
    let img = decode_image(&bytes).unwrap();
    assert_eq!(img.dimensions(), (256, 256));
    assert_eq!(img.get_pixel(100, 200).0, [10, 20, 30, 255]);
}

#[test]
fn test_decode_split_tile() {
    let bytes = split_tile_png([255, 0, 0, 255], [0, 0, 255, 0]);
    let img = decode_image(&bytes).unwrap();
    assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0, 255]);
    assert_eq!(img.get_pixel(255, 0).0[3], 0);
}

#[test]
fn test_decode_truncated_png_fails() {
    let bytes = solid_tile_png(16, 16, [0, 0, 0, 255]);
    assert!(decode_image(&bytes[..bytes.len() / 2]).is_err());
}
