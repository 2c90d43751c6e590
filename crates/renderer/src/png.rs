//! PNG encoding and decoding for canvases and tiles.
//!
//! Images with at most 256 distinct colors are written as indexed PNG
//! (color type 3); everything else as 8-bit RGBA (color type 6). A radar
//! render over an unreachable basemap is mostly white plus gray rings, so
//! the indexed path is common in degraded renders.
//!
//! Decoding goes through the `image` crate so any raster format a tile
//! server answers with is accepted.

use std::collections::{HashMap, HashSet};
use std::io::Write;

use amesh_common::{AmeshError, AmeshResult};
use flate2::{write::ZlibEncoder, Compression};
use image::RgbaImage;
use rayon::prelude::*;

use crate::canvas::Canvas;

const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

const COLOR_TYPE_INDEXED: u8 = 3;
const COLOR_TYPE_RGBA: u8 = 6;

const MAX_PALETTE_SIZE: usize = 256;

/// Pixels scanned per rayon task while collecting distinct colors.
const PALETTE_BLOCK: usize = 16 * 1024;

/// Encode a finished canvas as PNG bytes.
pub fn encode_canvas(canvas: &Canvas) -> AmeshResult<Vec<u8>> {
    encode_png(canvas.pixels(), canvas.width(), canvas.height())
}

/// Encode RGBA pixels, choosing indexed output when the colors fit a palette.
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> AmeshResult<Vec<u8>> {
    check_len(pixels, width, height)?;
    match Palette::build(pixels) {
        Some(palette) => encode_indexed(&palette, width, height),
        None => encode_png_rgba(pixels, width, height),
    }
}

/// Encode RGBA pixels as a color type 6 PNG regardless of color count.
pub fn encode_png_rgba(pixels: &[u8], width: u32, height: u32) -> AmeshResult<Vec<u8>> {
    check_len(pixels, width, height)?;

    let mut png = ChunkWriter::new();
    png.chunk(b"IHDR", &header(width, height, COLOR_TYPE_RGBA));
    png.chunk(b"IDAT", &deflate_scanlines(pixels, width as usize * 4)?);
    Ok(png.finish())
}

/// Decode raster bytes (PNG or any other format `image` recognises) to RGBA8.
pub fn decode_image(bytes: &[u8]) -> AmeshResult<RgbaImage> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|e| AmeshError::Encoding(format!("Failed to decode image: {}", e)))
}

/// Decode PNG bytes back into a canvas.
pub fn decode_canvas(bytes: &[u8]) -> AmeshResult<Canvas> {
    let img = decode_image(bytes)?;
    let (width, height) = img.dimensions();
    Canvas::from_rgba(width, height, img.into_raw())
        .ok_or_else(|| AmeshError::Encoding("decoded buffer size mismatch".to_string()))
}

fn check_len(pixels: &[u8], width: u32, height: u32) -> AmeshResult<()> {
    let expected = width as usize * height as usize * 4;
    if pixels.len() != expected {
        return Err(AmeshError::Encoding(format!(
            "expected {} bytes for {}x{} RGBA, got {}",
            expected,
            width,
            height,
            pixels.len()
        )));
    }
    Ok(())
}

fn encode_indexed(palette: &Palette, width: u32, height: u32) -> AmeshResult<Vec<u8>> {
    let mut png = ChunkWriter::new();
    png.chunk(b"IHDR", &header(width, height, COLOR_TYPE_INDEXED));

    let plte: Vec<u8> = palette.colors.iter().flat_map(|c| [c[0], c[1], c[2]]).collect();
    png.chunk(b"PLTE", &plte);

    if palette.colors.iter().any(|c| c[3] < 255) {
        let trns: Vec<u8> = palette.colors.iter().map(|c| c[3]).collect();
        png.chunk(b"tRNS", &trns);
    }

    png.chunk(b"IDAT", &deflate_scanlines(&palette.indices, width as usize)?);
    Ok(png.finish())
}

// ============================================================================
// Palette
// ============================================================================

/// Sorted palette plus one index byte per pixel.
#[derive(Debug)]
struct Palette {
    colors: Vec<[u8; 4]>,
    indices: Vec<u8>,
}

impl Palette {
    /// `None` when the image has more than 256 distinct colors.
    fn build(pixels: &[u8]) -> Option<Self> {
        let distinct: HashSet<u32> = pixels
            .par_chunks(PALETTE_BLOCK * 4)
            .map(|block| {
                let mut seen = HashSet::new();
                for px in block.chunks_exact(4) {
                    seen.insert(pack(px));
                    if seen.len() > MAX_PALETTE_SIZE {
                        return None;
                    }
                }
                Some(seen)
            })
            .try_reduce(HashSet::new, |mut a, b| {
                a.extend(b);
                (a.len() <= MAX_PALETTE_SIZE).then_some(a)
            })?;

        let mut packed: Vec<u32> = distinct.into_iter().collect();
        packed.sort_unstable();

        let lookup: HashMap<u32, u8> = packed
            .iter()
            .enumerate()
            .map(|(i, &color)| (color, i as u8))
            .collect();
        let indices = pixels
            .par_chunks_exact(4)
            .map(|px| lookup.get(&pack(px)).copied().unwrap_or(0))
            .collect();

        Some(Self {
            colors: packed.into_iter().map(u32::to_be_bytes).collect(),
            indices,
        })
    }
}

#[inline]
fn pack(px: &[u8]) -> u32 {
    u32::from_be_bytes([px[0], px[1], px[2], px[3]])
}

// ============================================================================
// Chunk layout
// ============================================================================

struct ChunkWriter {
    out: Vec<u8>,
}

impl ChunkWriter {
    fn new() -> Self {
        Self {
            out: SIGNATURE.to_vec(),
        }
    }

    /// Length, type, data, then CRC over type and data.
    fn chunk(&mut self, kind: &[u8; 4], data: &[u8]) {
        self.out.extend_from_slice(&(data.len() as u32).to_be_bytes());
        self.out.extend_from_slice(kind);
        self.out.extend_from_slice(data);

        let mut crc = crc32fast::Hasher::new();
        crc.update(kind);
        crc.update(data);
        self.out.extend_from_slice(&crc.finalize().to_be_bytes());
    }

    fn finish(mut self) -> Vec<u8> {
        self.chunk(b"IEND", &[]);
        self.out
    }
}

/// IHDR payload: 8-bit depth, no interlace.
fn header(width: u32, height: u32, color_type: u8) -> [u8; 13] {
    let mut ihdr = [0u8; 13];
    ihdr[0..4].copy_from_slice(&width.to_be_bytes());
    ihdr[4..8].copy_from_slice(&height.to_be_bytes());
    ihdr[8] = 8;
    ihdr[9] = color_type;
    ihdr
}

/// Zlib-compress rows of `row_bytes`, each prefixed with filter type 0.
fn deflate_scanlines(data: &[u8], row_bytes: usize) -> AmeshResult<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(
        Vec::with_capacity(data.len() / 4),
        Compression::fast(),
    );
    if row_bytes > 0 {
        for row in data.chunks(row_bytes) {
            encoder
                .write_all(&[0])
                .and_then(|_| encoder.write_all(row))
                .map_err(|e| AmeshError::Encoding(format!("IDAT compression failed: {}", e)))?;
        }
    }
    encoder
        .finish()
        .map_err(|e| AmeshError::Encoding(format!("IDAT compression failed: {}", e)))
}
