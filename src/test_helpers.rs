//! Shared test utilities for the imgread test suite.
//!
//! Writers for small synthetic images in every format the tests route
//! through the decoders. Each one panics on failure so tests stay terse.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let path = tmp.path().join("wide.png");
//! create_test_png(&path, 400, 300);
//! ```

use image::codecs::gif::GifEncoder;
use image::{Delay, Frame, ImageEncoder, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::Path;

/// Gradient pattern so resampling has something to work with.
fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    })
}

// =========================================================================
// Raster formats
// =========================================================================

pub fn create_test_png(path: &Path, width: u32, height: u32) {
    gradient(width, height)
        .save_with_format(path, ImageFormat::Png)
        .unwrap();
}

pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// A GIF with `frames` frames of alternating colors.
pub fn create_test_gif(path: &Path, width: u32, height: u32, frames: u32) {
    let file = std::fs::File::create(path).unwrap();
    let mut encoder = GifEncoder::new(file);
    let frames = (0..frames).map(|i| {
        let shade = if i % 2 == 0 { 40 } else { 220 };
        let img = RgbaImage::from_pixel(width, height, Rgba([shade, shade, shade, 255]));
        Frame::from_parts(img, 0, 0, Delay::from_numer_denom_ms(100, 1))
    });
    encoder.encode_frames(frames).unwrap();
}

pub fn create_test_tga(path: &Path, width: u32, height: u32) {
    gradient(width, height)
        .save_with_format(path, ImageFormat::Tga)
        .unwrap();
}

pub fn create_test_ico(path: &Path, width: u32, height: u32) {
    gradient(width, height)
        .save_with_format(path, ImageFormat::Ico)
        .unwrap();
}

/// An APNG with `frames` frames, stitched together from single-frame PNG
/// encodes: frame 0 keeps its `IDAT`, later frames become `fdAT` chunks.
pub fn create_test_apng(path: &Path, width: u32, height: u32, frames: u32) {
    let encoded: Vec<Vec<u8>> = (0..frames)
        .map(|i| {
            let shade = if i % 2 == 0 { 40 } else { 220 };
            let mut buf = Vec::new();
            RgbaImage::from_pixel(width, height, Rgba([shade, shade, shade, 255]))
                .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
                .unwrap();
            buf
        })
        .collect();

    let mut out = encoded[0][..8].to_vec();
    let ihdr = png_chunks(&encoded[0])
        .into_iter()
        .find(|(kind, _)| kind == b"IHDR")
        .unwrap()
        .1;
    write_png_chunk(&mut out, b"IHDR", &ihdr);

    let mut actl = frames.to_be_bytes().to_vec();
    actl.extend_from_slice(&0u32.to_be_bytes());
    write_png_chunk(&mut out, b"acTL", &actl);

    let mut seq = 0u32;
    for (i, png) in encoded.iter().enumerate() {
        let mut fctl = Vec::with_capacity(26);
        for v in [seq, width, height, 0, 0] {
            fctl.extend_from_slice(&v.to_be_bytes());
        }
        fctl.extend_from_slice(&[0, 10, 0, 100, 0, 0]);
        write_png_chunk(&mut out, b"fcTL", &fctl);
        seq += 1;

        for (kind, data) in png_chunks(png) {
            if &kind != b"IDAT" {
                continue;
            }
            if i == 0 {
                write_png_chunk(&mut out, b"IDAT", &data);
            } else {
                let mut fdat = seq.to_be_bytes().to_vec();
                fdat.extend_from_slice(&data);
                write_png_chunk(&mut out, b"fdAT", &fdat);
                seq += 1;
            }
        }
    }
    write_png_chunk(&mut out, b"IEND", &[]);
    std::fs::write(path, out).unwrap();
}

/// `(type, data)` for every chunk after the signature.
fn png_chunks(png: &[u8]) -> Vec<([u8; 4], Vec<u8>)> {
    let mut chunks = Vec::new();
    let mut pos = 8;
    while pos + 12 <= png.len() {
        let len = u32::from_be_bytes(png[pos..pos + 4].try_into().unwrap()) as usize;
        let kind: [u8; 4] = png[pos + 4..pos + 8].try_into().unwrap();
        chunks.push((kind, png[pos + 8..pos + 8 + len].to_vec()));
        pos += 12 + len;
    }
    chunks
}

fn write_png_chunk(out: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    let start = out.len();
    out.extend_from_slice(kind);
    out.extend_from_slice(data);
    let crc = crc32(&out[start..]);
    out.extend_from_slice(&crc.to_be_bytes());
}

/// Bitwise CRC-32 (IEEE), as PNG chunks use.
fn crc32(bytes: &[u8]) -> u32 {
    let mut crc = 0xffff_ffffu32;
    for &b in bytes {
        crc ^= u32::from(b);
        for _ in 0..8 {
            crc = if crc & 1 != 0 { (crc >> 1) ^ 0xedb8_8320 } else { crc >> 1 };
        }
    }
    !crc
}

// =========================================================================
// Vector
// =========================================================================

/// An SVG with an explicit default size.
pub fn create_test_svg(path: &Path, width: u32, height: u32) {
    let svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}">
<rect x="0" y="0" width="{width}" height="{height}" fill="green"/>
</svg>"#
    );
    std::fs::write(path, svg).unwrap();
}

// =========================================================================
// Directory inspection
// =========================================================================

/// Names of all files in `dir`, sorted.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
