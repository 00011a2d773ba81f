//! Decoding backends and the sizing math they share.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader::into_dimensions` |
//! | **Decode + resample** | `image` crate, Lanczos3 |
//! | **Vector render** | `resvg` |
//! | **Legacy formats** | `image` codecs + bi-level readers |
//! | **External conversion** | `sh -c` subprocess with bounded wait |
//!
//! The module is split into:
//! - **Calculations**: [`plan_display`], a pure function (unit testable)
//! - **Parameters**: request and view types
//! - **Backend**: result/error types and the collaborator traits
//! - **Adapters**: [`RasterDecoder`], [`LegacyTranscoder`], [`ExternalToolTranscoder`]
//! - **Support**: placeholder images and per-request intermediate files

pub mod backend;
mod bilevel;
mod calculations;
pub mod error_image;
pub mod external;
pub mod intermediate;
pub mod legacy;
mod params;
pub mod raster;
mod vector;

pub use backend::{
    CodecHint, ConversionTool, ImageInfo, ImageResult, LegacyCodec, ReaderError,
    SCALE_NOT_APPLICABLE,
};
pub use calculations::{DisplayPlan, plan_display};
pub use error_image::ErrorImageFactory;
pub use external::{ExternalToolTranscoder, ShellTool};
pub use intermediate::IntermediateStore;
pub use legacy::{ImageCrateCodec, LegacyTranscoder, codec_hint};
pub use params::{Dimensions, ImageRequest, Rotation, ViewParams};
pub use raster::RasterDecoder;
