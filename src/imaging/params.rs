//! Parameter types for a read request.
//!
//! These structs describe *what* the caller wants to see, not *how* it gets
//! decoded. They are the interface between the [`ImageReader`](crate::reader::ImageReader)
//! façade and the backends, which all receive the same [`ViewParams`] no
//! matter which decoding path a file ends up on.
//!
//! ## Types
//!
//! - [`Dimensions`]: A width/height pair in pixels.
//! - [`Rotation`]: Quarter-turn display rotation (0, 90, 180, 270).
//! - [`ViewParams`]: Display constraints: rotation, bounding box, zoom and fit modes.
//! - [`ImageRequest`]: A path plus its [`ViewParams`]. Immutable per call.

use super::backend::ReaderError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The same box with width and height exchanged.
    pub const fn swapped(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Display rotation in quarter turns, clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    None,
    Quarter,
    Half,
    ThreeQuarter,
}

impl Rotation {
    /// Parse a rotation in degrees.
    ///
    /// Any multiple of 90 is accepted, including negative values and values
    /// of a full turn or more (`-90` is `270`, `450` is `90`).
    pub fn from_degrees(degrees: i32) -> Result<Self, ReaderError> {
        match degrees.rem_euclid(360) {
            0 => Ok(Self::None),
            90 => Ok(Self::Quarter),
            180 => Ok(Self::Half),
            270 => Ok(Self::ThreeQuarter),
            _ => Err(ReaderError::InvalidRotation(degrees)),
        }
    }

    pub fn degrees(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Quarter => 90,
            Self::Half => 180,
            Self::ThreeQuarter => 270,
        }
    }

    /// Whether the displayed image has its width and height exchanged
    /// relative to the stored pixels.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Self::Quarter | Self::ThreeQuarter)
    }
}

/// Display constraints shared by every backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewParams {
    pub rotation: Rotation,
    /// Keep full-resolution pixels and report scale factors instead.
    pub zoomed: bool,
    /// Scale to the bounding box even when the image is already smaller.
    pub fit_in_window: bool,
    /// Bounding box the displayed image must fit in.
    pub max_size: Dimensions,
    /// Never resample the decoded pixels.
    pub no_scale: bool,
}

impl ViewParams {
    pub fn new(max_size: Dimensions) -> Self {
        Self {
            rotation: Rotation::None,
            zoomed: false,
            fit_in_window: false,
            max_size,
            no_scale: false,
        }
    }

    /// Whether the decoded pixels should be resampled to the planned size.
    pub fn wants_scaled_decode(&self) -> bool {
        !self.zoomed && !self.no_scale
    }
}

/// A single read request: which file, and how it will be displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub path: PathBuf,
    pub view: ViewParams,
}

impl ImageRequest {
    pub fn new(path: impl Into<PathBuf>, max_size: Dimensions) -> Self {
        Self {
            path: path.into(),
            view: ViewParams::new(max_size),
        }
    }

    pub fn rotation(mut self, rotation: Rotation) -> Self {
        self.view.rotation = rotation;
        self
    }

    pub fn zoomed(mut self, zoomed: bool) -> Self {
        self.view.zoomed = zoomed;
        self
    }

    pub fn fit_in_window(mut self, fit: bool) -> Self {
        self.view.fit_in_window = fit;
        self
    }

    pub fn no_scale(mut self, no_scale: bool) -> Self {
        self.view.no_scale = no_scale;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
