//! Transcoding backend for legacy and raw formats.
//!
//! Files are decoded by a [`LegacyCodec`], converted to RGBA, written to an
//! intermediate PNG, and then handed to the [`RasterDecoder`] like any other
//! PNG. The suffix picks a codec hint because several of these formats have
//! no reliable magic bytes.

use super::backend::{CodecHint, ImageResult, LegacyCodec, ReaderError};
use super::bilevel;
use super::error_image::ErrorImageFactory;
use super::intermediate::IntermediateStore;
use super::params::{Dimensions, ViewParams};
use super::raster::RasterDecoder;
use image::{DynamicImage, ImageFormat};
use std::path::Path;

/// Raw MONO files carry no size; they are read onto this canvas.
pub const MONO_CANVAS: Dimensions = Dimensions::new(4000, 3000);

/// Codec hint for a lowercase file suffix.
pub fn codec_hint(suffix: &str) -> Option<CodecHint> {
    let codec = match suffix {
        "x" | "avs" => "AVS",
        "cals" | "cal" | "dcl" | "ras" => "CALS",
        "cgm" => "CGM",
        "cut" => "CUT",
        "cur" => "CUR",
        "acr" | "dcm" | "dicom" | "dic" => "DCM",
        "fax" => "FAX",
        "ico" => "ICO",
        "mono" => {
            return Some(CodecHint {
                codec: "MONO",
                canvas: Some(MONO_CANVAS),
            });
        }
        "mtv" => "MTV",
        "otb" => "OTB",
        "palm" => "PALM",
        "pfb" => "PFB",
        "pict" | "pct" | "pic" => "PICT",
        "pix" | "pal" => "PIX",
        "tga" => "TGA",
        "ttf" => "TTF",
        "txt" => "TXT",
        "wbm" | "wbmp" => "WBMP",
        _ => return None,
    };
    Some(CodecHint {
        codec,
        canvas: None,
    })
}

/// Default legacy codec built on the `image` crate plus the bi-level readers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateCodec;

impl LegacyCodec for ImageCrateCodec {
    fn name(&self) -> &str {
        "image"
    }

    fn decode(&self, data: &[u8], hint: Option<&CodecHint>) -> Result<DynamicImage, String> {
        let Some(hint) = hint else {
            return image::load_from_memory(data).map_err(|e| e.to_string());
        };
        let format = match hint.codec {
            "TGA" => ImageFormat::Tga,
            "ICO" | "CUR" => ImageFormat::Ico,
            "MONO" => return bilevel::decode_mono(data, hint.canvas.unwrap_or(MONO_CANVAS)),
            "WBMP" => return bilevel::decode_wbmp(data),
            other => return Err(format!("no decoder available for codec {other}")),
        };
        image::load_from_memory_with_format(data, format).map_err(|e| e.to_string())
    }
}

/// Decodes through a [`LegacyCodec`] and re-reads the result as PNG.
pub struct LegacyTranscoder {
    codec: Box<dyn LegacyCodec>,
    intermediates: IntermediateStore,
    raster: RasterDecoder,
    errors: ErrorImageFactory,
}

impl LegacyTranscoder {
    pub fn new(
        codec: Box<dyn LegacyCodec>,
        intermediates: IntermediateStore,
        errors: ErrorImageFactory,
    ) -> Self {
        Self {
            codec,
            intermediates,
            raster: RasterDecoder::new(),
            errors,
        }
    }

    pub fn read(&self, path: &Path, view: &ViewParams) -> Result<ImageResult, ReaderError> {
        let suffix = suffix(path);
        let hint = codec_hint(&suffix);
        log::debug!(
            "legacy decode of {} with codec {} (hint: {})",
            path.display(),
            self.codec.name(),
            hint.map_or("auto", |h| h.codec)
        );

        let data = std::fs::read(path)?;
        let intermediate = self.intermediates.create()?;

        let converted = self
            .codec
            .decode(&data, hint.as_ref())
            .and_then(|img| {
                DynamicImage::ImageRgba8(img.to_rgba8())
                    .save_with_format(intermediate.path(), ImageFormat::Png)
                    .map_err(|e| e.to_string())
            });
        drop(data);

        if let Err(detail) = converted {
            // leave a consistent error artifact for anyone reading the intermediate
            let placeholder = self.errors.build(&detail);
            if let Err(e) = placeholder
                .pixels
                .save_with_format(intermediate.path(), ImageFormat::Png)
            {
                log::warn!("failed to write error placeholder: {e}");
            }
            intermediate.finish();
            return Err(ReaderError::LegacyTranscodeFailed(detail));
        }

        let result = self.raster.read(intermediate.path(), view);
        intermediate.finish();
        result
    }
}

fn suffix(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}
