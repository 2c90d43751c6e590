//! Generators for synthetic tile images.

use std::io::Cursor;

use image::{ImageOutputFormat, Rgba, RgbaImage};

/// Encode a `width`×`height` PNG filled with one RGBA color.
///
/// # Example
///
/// ```
/// use test_utils::solid_tile_png;
///
/// let png = solid_tile_png(256, 256, [255, 255, 255, 255]);
/// assert_eq!(&png[0..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
/// ```
pub fn solid_tile_png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    encode_png(&RgbaImage::from_pixel(width, height, Rgba(rgba)))
}

/// Encode a 256×256 tile whose left half is `left` and right half is `right`.
pub fn split_tile_png(left: [u8; 4], right: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_fn(256, 256, |x, _| if x < 128 { Rgba(left) } else { Rgba(right) });
    encode_png(&img)
}

/// Encode an arbitrary RGBA image as PNG bytes.
pub fn encode_png(img: &RgbaImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageOutputFormat::Png)
        .expect("in-memory PNG encoding cannot fail");
    buf.into_inner()
}
