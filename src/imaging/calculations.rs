//! Pure calculation functions for display sizing.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::{Dimensions, Rotation};

/// Output of [`plan_display`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayPlan {
    /// Size of the image as it appears on screen (rotated orientation).
    pub display: Dimensions,
    /// Size to request from the decoder, in stored (unrotated) orientation.
    pub decode: Dimensions,
    /// Width-pass factor, reported only for zoomed display.
    pub scale_factor1: Option<f32>,
    /// Height-pass factor, reported only for zoomed display that ends up
    /// narrower than the bounding box.
    pub scale_factor2: Option<f32>,
}

/// Compute display size and scale factors for an image.
///
/// Fits width first, then height, so the final box respects both limits.
/// Zoomed display never resamples pixels, but the viewer still needs to
/// know by how much to scale the full-resolution image, hence two factors
/// with different trigger conditions.
///
/// # Arguments
/// * `original` - Stored pixel dimensions
/// * `rotation` - Display rotation; 90 and 270 swap the axes before fitting
/// * `max_size` - Bounding box of the display area
/// * `zoomed` - Whether scale factors should be reported
/// * `fit_in_window` - Also scale up (or down) images that don't match the box width
///
/// # Examples
/// ```
/// # use imgread::imaging::{plan_display, Dimensions, Rotation};
/// let plan = plan_display(
///     Dimensions::new(4000, 3000),
///     Rotation::None,
///     Dimensions::new(1000, 1000),
///     false,
///     false,
/// );
/// assert_eq!(plan.decode, Dimensions::new(1000, 750));
/// ```
pub fn plan_display(
    original: Dimensions,
    rotation: Rotation,
    max_size: Dimensions,
    zoomed: bool,
    fit_in_window: bool,
) -> DisplayPlan {
    let oriented = if rotation.swaps_axes() {
        original.swapped()
    } else {
        original
    };
    let mut width = oriented.width;
    let mut height = oriented.height;

    let mut q: f32 = 1.0;

    if width > 0 && (width > max_size.width || (width != max_size.width && fit_in_window)) {
        q = max_size.width as f32 / width as f32;
        width = scale(width, q);
        height = scale(height, q);
    }

    let scale_factor1 = zoomed.then_some(q);

    if height > 0 && height > max_size.height {
        q = max_size.height as f32 / height as f32;
        width = scale(width, q);
        height = scale(height, q);
    }

    let scale_factor2 = (zoomed && width < max_size.width).then_some(q);

    let display = Dimensions::new(width, height);
    let decode = if rotation.swaps_axes() {
        display.swapped()
    } else {
        display
    };

    DisplayPlan {
        display,
        decode,
        scale_factor1,
        scale_factor2,
    }
}

/// Multiply and truncate toward zero.
fn scale(value: u32, q: f32) -> u32 {
    (value as f32 * q) as u32
}
