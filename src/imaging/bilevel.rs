//! Readers for headerless and near-headerless 1-bit formats.
//!
//! - **MONO**: raw bi-level bitmap, no header. Bits are least-significant
//!   first, a set bit is black, every row is padded to a whole byte. The
//!   canvas size must come from the caller.
//! - **WBMP**: wireless bitmap, type 0 only. A multi-byte integer header
//!   (type, fixed header, width, height) followed by rows that are
//!   most-significant bit first, a set bit is white, padded to a byte.

use image::{DynamicImage, GrayImage, Luma};

use super::params::Dimensions;

const BLACK: Luma<u8> = Luma([0]);
const WHITE: Luma<u8> = Luma([255]);

/// Decode a raw MONO bitmap onto a `canvas`-sized image.
pub fn decode_mono(data: &[u8], canvas: Dimensions) -> Result<DynamicImage, String> {
    let stride = canvas.width.div_ceil(8) as usize;
    let needed = stride * canvas.height as usize;
    if canvas.is_empty() {
        return Err("MONO needs a non-empty canvas size".to_string());
    }
    if data.len() < needed {
        return Err(format!(
            "unexpected end of MONO data: {} bytes for a {} canvas needing {}",
            data.len(),
            canvas,
            needed
        ));
    }

    let img = GrayImage::from_fn(canvas.width, canvas.height, |x, y| {
        let byte = data[y as usize * stride + (x / 8) as usize];
        if byte & (1 << (x % 8)) != 0 {
            BLACK
        } else {
            WHITE
        }
    });
    Ok(DynamicImage::ImageLuma8(img))
}

/// Decode a type 0 WBMP.
pub fn decode_wbmp(data: &[u8]) -> Result<DynamicImage, String> {
    let mut pos = 0;
    let kind = read_multibyte(data, &mut pos)?;
    if kind != 0 {
        return Err(format!("unsupported WBMP type {kind}"));
    }
    let fixed = *data.get(pos).ok_or("truncated WBMP header")?;
    pos += 1;
    if fixed & 0x80 != 0 {
        return Err("WBMP extension headers are not supported".to_string());
    }
    let width = read_multibyte(data, &mut pos)?;
    let height = read_multibyte(data, &mut pos)?;
    if width == 0 || height == 0 {
        return Err(format!("invalid WBMP size {width}x{height}"));
    }

    let stride = width.div_ceil(8) as usize;
    let pixels = &data[pos..];
    if pixels.len() < stride * height as usize {
        return Err("unexpected end of WBMP data".to_string());
    }

    let img = GrayImage::from_fn(width, height, |x, y| {
        let byte = pixels[y as usize * stride + (x / 8) as usize];
        if byte & (0x80 >> (x % 8)) != 0 {
            WHITE
        } else {
            BLACK
        }
    });
    Ok(DynamicImage::ImageLuma8(img))
}

/// WBMP integers: 7 bits per byte, high bit set on all but the last byte.
fn read_multibyte(data: &[u8], pos: &mut usize) -> Result<u32, String> {
    let mut value: u32 = 0;
    for _ in 0..5 {
        let byte = *data.get(*pos).ok_or("truncated WBMP header")?;
        *pos += 1;
        value = (value << 7) | u32::from(byte & 0x7f);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err("WBMP integer too long".to_string())
}
