//! Shared result and error types, plus the collaborator traits.
//!
//! Every decoding path produces an [`ImageResult`] or a [`ReaderError`]. The
//! [`ImageReader`](crate::reader::ImageReader) façade turns errors into
//! placeholder images, so callers only ever see results.
//!
//! Two collaborators sit behind traits so they can be swapped (or mocked):
//!
//! - [`LegacyCodec`] decodes formats the native decoder doesn't handle.
//! - [`ConversionTool`] is an external program that converts a file to PNG.

use super::params::Dimensions;
use image::DynamicImage;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

/// Value reported by the compatibility accessors when a scale factor does
/// not apply.
pub const SCALE_NOT_APPLICABLE: f32 = -1.0;

#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("The file doesn't contain a valid vector graphic: {0}")]
    InvalidVectorData(String),
    #[error("{0}")]
    DecodeFailed(String),
    #[error("{0}")]
    LegacyTranscodeFailed(String),
    #[error("imgread relies on '{0}' to display this image, but it wasn't found!")]
    ToolNotFound(String),
    #[error("'{tool}' did not finish within {seconds}s")]
    ToolTimeout { tool: String, seconds: u64 },
    #[error("Failed to run '{tool}': {detail}")]
    ExternalConversionFailed { tool: String, detail: String },
    #[error("Rotation must be a multiple of 90 degrees, got {0}")]
    InvalidRotation(i32),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Decoded pixels plus the metadata a viewer needs to present them.
#[derive(Debug, Clone)]
pub struct ImageResult {
    pub pixels: DynamicImage,
    /// Stored size before rotation and scaling.
    pub original_size: Dimensions,
    /// Lowercase format name; empty for placeholders and intermediates.
    pub format: String,
    pub scale_factor1: Option<f32>,
    pub scale_factor2: Option<f32>,
    pub is_animated: bool,
    /// Message rendered onto a placeholder, `None` for real images.
    pub error: Option<String>,
}

impl ImageResult {
    pub fn is_placeholder(&self) -> bool {
        self.error.is_some()
    }

    pub fn info(&self) -> ImageInfo {
        ImageInfo {
            original_size: self.original_size,
            display_size: Dimensions::new(self.pixels.width(), self.pixels.height()),
            format: self.format.clone(),
            scale_factor1: self.scale_factor1,
            scale_factor2: self.scale_factor2,
            is_animated: self.is_animated,
            error: self.error.clone(),
        }
    }
}

/// The metadata half of an [`ImageResult`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageInfo {
    pub original_size: Dimensions,
    /// Size of the returned pixel buffer.
    pub display_size: Dimensions,
    pub format: String,
    pub scale_factor1: Option<f32>,
    pub scale_factor2: Option<f32>,
    pub is_animated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Codec hint passed to a [`LegacyCodec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecHint {
    /// Upper-case codec name, e.g. `"TGA"`.
    pub codec: &'static str,
    /// Canvas for raw formats that carry no dimension header.
    pub canvas: Option<Dimensions>,
}

/// A decoder for legacy and raw formats.
///
/// Implementations return the codec's own error text on failure; the
/// transcoder wraps it into [`ReaderError::LegacyTranscodeFailed`].
pub trait LegacyCodec: Send + Sync {
    fn name(&self) -> &str;

    /// Decode `data`. With no hint the codec detects the format itself.
    fn decode(&self, data: &[u8], hint: Option<&CodecHint>) -> Result<DynamicImage, String>;
}

/// An external program converting a source file to a PNG.
pub trait ConversionTool: Send + Sync {
    /// Name of the package to install, used in the "not found" message.
    fn package(&self) -> &str;

    /// Blocking presence check.
    fn is_available(&self) -> Result<bool, ReaderError>;

    /// Blocking conversion. Only failing to run the tool is an error; a tool
    /// that runs but produces no usable output shows up when the output is
    /// decoded.
    fn convert(&self, source: &Path, destination: &Path) -> Result<(), ReaderError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use image::RgbaImage;
    use std::sync::Mutex;

    /// Tool mock that records calls and writes a small PNG on conversion.
    pub struct MockTool {
        pub available: bool,
        pub output: Option<Dimensions>,
        pub calls: Mutex<Vec<RecordedCall>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedCall {
        Probe,
        Convert { source: String, destination: String },
    }

    impl MockTool {
        /// A tool that is installed and converts to an image of `size`.
        pub fn converting(size: Dimensions) -> Self {
            Self {
                available: true,
                output: Some(size),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// A tool that is not installed.
        pub fn missing() -> Self {
            Self {
                available: false,
                output: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        /// A tool that is installed but writes nothing.
        pub fn silent() -> Self {
            Self {
                available: true,
                output: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn get_calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ConversionTool for MockTool {
        fn package(&self) -> &str {
            "mocktools"
        }

        fn is_available(&self) -> Result<bool, ReaderError> {
            self.calls.lock().unwrap().push(RecordedCall::Probe);
            Ok(self.available)
        }

        fn convert(&self, source: &Path, destination: &Path) -> Result<(), ReaderError> {
            self.calls.lock().unwrap().push(RecordedCall::Convert {
                source: source.to_string_lossy().to_string(),
                destination: destination.to_string_lossy().to_string(),
            });
            if let Some(size) = self.output {
                let img =
                    RgbaImage::from_pixel(size.width, size.height, image::Rgba([10, 20, 30, 255]));
                img.save_with_format(destination, image::ImageFormat::Png)
                    .map_err(|e| ReaderError::DecodeFailed(e.to_string()))?;
            }
            Ok(())
        }
    }

    impl ConversionTool for std::sync::Arc<MockTool> {
        fn package(&self) -> &str {
            self.as_ref().package()
        }

        fn is_available(&self) -> Result<bool, ReaderError> {
            self.as_ref().is_available()
        }

        fn convert(&self, source: &Path, destination: &Path) -> Result<(), ReaderError> {
            self.as_ref().convert(source, destination)
        }
    }

    /// Codec that always fails with a fixed message.
    pub struct FailingCodec;

    impl LegacyCodec for FailingCodec {
        fn name(&self) -> &str {
            "failing"
        }

        fn decode(&self, _data: &[u8], _hint: Option<&CodecHint>) -> Result<DynamicImage, String> {
            Err("corrupt image header".to_string())
        }
    }

    #[test]
    fn mock_tool_records_calls() {
        let tool = MockTool::missing();
        assert!(!tool.is_available().unwrap());
        assert_eq!(tool.get_calls(), vec![RecordedCall::Probe]);
    }

    #[test]
    fn mock_tool_writes_png() {
        let tmp = tempfile::TempDir::new().unwrap();
        let out = tmp.path().join("out.png");
        let tool = MockTool::converting(Dimensions::new(12, 8));
        tool.convert(Path::new("/in.xcf"), &out).unwrap();
        assert_eq!(image::image_dimensions(&out).unwrap(), (12, 8));
    }

    #[test]
    fn info_reflects_pixel_buffer() {
        let result = ImageResult {
            pixels: DynamicImage::new_rgba8(30, 20),
            original_size: Dimensions::new(300, 200),
            format: "png".into(),
            scale_factor1: Some(0.1),
            scale_factor2: None,
            is_animated: false,
            error: None,
        };
        let info = result.info();
        assert_eq!(info.display_size, Dimensions::new(30, 20));
        assert_eq!(info.original_size, Dimensions::new(300, 200));
        assert!(!result.is_placeholder());
    }

    #[test]
    fn tool_not_found_names_the_package() {
        let msg = ReaderError::ToolNotFound("xcftools".into()).to_string();
        assert!(msg.contains("'xcftools'"));
    }
}
