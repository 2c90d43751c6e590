//! Compositing decoded tile images onto a canvas.

use image::RgbaImage;

use crate::canvas::Canvas;

/// Opacity for layers that should fully cover what is below them.
pub const OPAQUE: u8 = 255;

/// Destination rectangle on a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Draw `src` into `dest` with the Porter-Duff "over" operator, scaling
/// every source pixel's coverage by a uniform `opacity` mask.
///
/// The source is anchored at the rectangle's top-left corner and clipped to
/// both the rectangle and the canvas. With `opacity == 255` an opaque source
/// replaces the destination exactly; transparent source pixels always leave
/// the destination untouched.
pub fn draw_over(canvas: &mut Canvas, src: &RgbaImage, dest: Rect, opacity: u8) {
    let width = dest
        .width
        .min(src.width())
        .min(canvas.width().saturating_sub(dest.x));
    let height = dest
        .height
        .min(src.height())
        .min(canvas.height().saturating_sub(dest.y));
    if width == 0 || height == 0 || opacity == 0 {
        return;
    }

    let stride = canvas.width() as usize * 4;
    let opacity = opacity as u32;
    let pixels = canvas.pixels_mut();

    for row in 0..height {
        let row_start = (dest.y + row) as usize * stride + dest.x as usize * 4;
        let dst_row = &mut pixels[row_start..row_start + width as usize * 4];
        for (col, dst) in dst_row.chunks_exact_mut(4).enumerate() {
            let s = src.get_pixel(col as u32, row).0;
            let coverage = (s[3] as u32 * opacity + 127) / 255;
            if coverage == 0 {
                continue;
            }
            let inverse = 255 - coverage;
            for c in 0..3 {
                dst[c] = ((s[c] as u32 * coverage + dst[c] as u32 * inverse + 127) / 255) as u8;
            }
            dst[3] = (coverage + (dst[3] as u32 * inverse + 127) / 255) as u8;
        }
    }
}
