//! Native decoding backend for raster and vector files.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Header-only size query | `image::ImageReader::into_dimensions` |
//! | Decode (BMP, GIF, ICO, JPEG, PNG, PNM, QOI, TGA, TIFF, WebP) | `image` crate |
//! | Scaled decode | decode + `DynamicImage::resize_exact` with `Lanczos3` |
//! | Frame count (GIF, APNG, WebP) | `image::AnimationDecoder::into_frames` |
//! | Decode (SVG, SVGZ) | `resvg` (usvg parse + tiny-skia render) |

use super::backend::{ImageResult, ReaderError};
use super::calculations::{DisplayPlan, plan_display};
use super::intermediate;
use super::params::{Dimensions, ViewParams};
use super::vector;
use image::imageops::FilterType;
use image::{AnimationDecoder, DynamicImage, ImageFormat};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Suffixes rendered through the vector path.
const VECTOR_SUFFIXES: &[&str] = &["svg", "svgz"];

/// Decodes everything the `image` crate and `resvg` understand.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterDecoder;

impl RasterDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decode `path` and size it for display.
    pub fn read(&self, path: &Path, view: &ViewParams) -> Result<ImageResult, ReaderError> {
        if is_vector(path) {
            self.read_vector(path, view)
        } else {
            self.read_raster(path, view)
        }
    }

    fn read_vector(&self, path: &Path, view: &ViewParams) -> Result<ImageResult, ReaderError> {
        let data = std::fs::read(path)?;
        let tree = vector::parse(&data, path.parent())
            .map_err(|e| ReaderError::InvalidVectorData(e.to_string()))?;
        let rendered = vector::render(&tree).ok_or_else(|| {
            ReaderError::InvalidVectorData("the graphic has an empty default size".to_string())
        })?;

        let original = Dimensions::new(rendered.width(), rendered.height());
        let plan = plan(original, view);

        let pixels = if view.wants_scaled_decode() {
            resample(rendered, plan.decode)
        } else {
            rendered
        };

        Ok(ImageResult {
            pixels,
            original_size: original,
            format: format_label(path, "svg"),
            scale_factor1: plan.scale_factor1,
            scale_factor2: plan.scale_factor2,
            is_animated: false,
            error: None,
        })
    }

    fn read_raster(&self, path: &Path, view: &ViewParams) -> Result<ImageResult, ReaderError> {
        let format = open(path)?.format();
        let original = identify(path)?;
        let plan = plan(original, view);

        let decoded = open(path)?.decode().map_err(|e| {
            ReaderError::DecodeFailed(format!("Failed to decode {}: {}", path.display(), e))
        })?;

        let pixels = if view.wants_scaled_decode() {
            resample(decoded, plan.decode)
        } else {
            decoded
        };

        log::debug!(
            "decoded {}: {} -> {}x{} (zoomed: {})",
            path.display(),
            original,
            pixels.width(),
            pixels.height(),
            view.zoomed
        );

        let is_animated = format.is_some_and(|f| has_multiple_frames(path, f));
        let name = format.map(format_name).unwrap_or_default();

        Ok(ImageResult {
            pixels,
            original_size: original,
            format: format_label(path, &name),
            scale_factor1: plan.scale_factor1,
            scale_factor2: plan.scale_factor2,
            is_animated,
            error: None,
        })
    }
}

fn is_vector(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| VECTOR_SUFFIXES.iter().any(|s| e.eq_ignore_ascii_case(s)))
}

fn plan(original: Dimensions, view: &ViewParams) -> DisplayPlan {
    plan_display(
        original,
        view.rotation,
        view.max_size,
        view.zoomed,
        view.fit_in_window,
    )
}

/// Open a reader with the format guessed from content, falling back to the
/// extension.
fn open(path: &Path) -> Result<image::ImageReader<BufReader<File>>, ReaderError> {
    let reader = image::ImageReader::open(path)?;
    reader.with_guessed_format().map_err(ReaderError::Io)
}

/// Stored image size, from the header when possible.
///
/// Some decoders report a zero size from the header alone; those files are
/// fully decoded just to learn their dimensions.
fn identify(path: &Path) -> Result<Dimensions, ReaderError> {
    match open(path)?.into_dimensions() {
        Ok((width, height)) if width > 0 && height > 0 => Ok(Dimensions::new(width, height)),
        header => {
            log::warn!(
                "header size query for {} gave {:?}; decoding fully for dimensions",
                path.display(),
                header
            );
            let img = open(path)?.decode().map_err(|e| {
                ReaderError::DecodeFailed(format!("Failed to decode {}: {}", path.display(), e))
            })?;
            Ok(Dimensions::new(img.width(), img.height()))
        }
    }
}

/// Resize to exactly `target`, ignoring aspect ratio like a scaled decode.
fn resample(img: DynamicImage, target: Dimensions) -> DynamicImage {
    let target = Dimensions::new(target.width.max(1), target.height.max(1));
    if img.width() == target.width && img.height() == target.height {
        return img;
    }
    img.resize_exact(target.width, target.height, FilterType::Lanczos3)
}

/// True only for animation-capable formats with more than one frame.
fn has_multiple_frames(path: &Path, format: ImageFormat) -> bool {
    let count = || -> image::ImageResult<bool> {
        let reader = BufReader::new(File::open(path)?);
        let frames = match format {
            ImageFormat::Gif => image::codecs::gif::GifDecoder::new(reader)?.into_frames(),
            ImageFormat::Png => {
                let decoder = image::codecs::png::PngDecoder::new(reader)?;
                if !decoder.is_apng()? {
                    return Ok(false);
                }
                decoder.apng()?.into_frames()
            }
            ImageFormat::WebP => {
                let decoder = image::codecs::webp::WebPDecoder::new(reader)?;
                if !decoder.has_animation() {
                    return Ok(false);
                }
                decoder.into_frames()
            }
            _ => return Ok(false),
        };
        Ok(frames.take(2).count() > 1)
    };
    count().unwrap_or_else(|e| {
        log::debug!("frame count for {} failed: {e}", path.display());
        false
    })
}

/// Lowercase name for a detected format.
fn format_name(format: ImageFormat) -> String {
    format
        .extensions_str()
        .first()
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Intermediates never expose a format label.
fn format_label(path: &Path, name: &str) -> String {
    if intermediate::is_intermediate(path) {
        String::new()
    } else {
        name.to_string()
    }
}
