//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Each file leads with its name; what the reader learned about it follows
//! as indented context lines. Placeholders show the error message in place
//! of format and size details, since those describe the placeholder rather
//! than the file.
//!
//! # Output Format
//!
//! ## Read
//!
//! ```text
//! holiday.jpg
//!     Backend: native
//!     Format: jpg
//!     Original: 4000x3000
//!     Display: 1000x750
//!     Rotation: 90°
//!     Scale: 0.25, n/a
//!     Saved: holiday-view.png
//! ```
//!
//! ## Info
//!
//! ```text
//! 001 holiday.jpg: jpg 4000x3000 → 1000x750
//! 002 anim.gif: gif 320x240 → 320x240 (animated)
//! 003 drawing.xcf: error: imgread relies on 'xcftools' ...
//! ```
//!
//! ## Classify
//!
//! ```text
//! native    holiday.jpg
//! legacy    favicon.ico
//! external  drawing.xcf
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>` or `String`)
//! for testability; `main.rs` prints them. Format functions are pure.

use crate::imaging::{ImageInfo, Rotation};
use crate::routing::Backend;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// File name for display, falling back to the whole path.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// A scale factor, or `n/a` when it does not apply.
pub fn format_scale(factor: Option<f32>) -> String {
    match factor {
        Some(q) => format!("{}", (q * 10_000.0).round() / 10_000.0),
        None => "n/a".to_string(),
    }
}

// ============================================================================
// read
// ============================================================================

/// Format the result of a single read. The rotation line is omitted when
/// the image is shown upright.
pub fn format_read_output(
    path: &Path,
    backend: Backend,
    info: &ImageInfo,
    rotation: Rotation,
    saved_to: Option<&Path>,
) -> Vec<String> {
    let mut lines = vec![display_name(path), format!("    Backend: {backend}")];

    if let Some(error) = &info.error {
        lines.push(format!("    Error: {error}"));
    } else {
        lines.push(format!("    Format: {}", info.format));
        lines.push(format!("    Original: {}", info.original_size));
        lines.push(format!("    Display: {}", info.display_size));
        if rotation != Rotation::None {
            lines.push(format!("    Rotation: {}\u{b0}", rotation.degrees()));
        }
        if info.scale_factor1.is_some() || info.scale_factor2.is_some() {
            lines.push(format!(
                "    Scale: {}, {}",
                format_scale(info.scale_factor1),
                format_scale(info.scale_factor2)
            ));
        }
        if info.is_animated {
            lines.push("    Animated: yes".to_string());
        }
    }

    if let Some(saved) = saved_to {
        lines.push(format!("    Saved: {}", saved.display()));
    }
    lines
}

// ============================================================================
// info
// ============================================================================

/// One summary line for a file read by the `info` command.
pub fn format_info_line(index: usize, path: &Path, info: &ImageInfo) -> String {
    let head = format!("{} {}", format_index(index), display_name(path));
    match &info.error {
        Some(error) => format!("{head}: error: {error}"),
        None => {
            let animated = if info.is_animated { " (animated)" } else { "" };
            format!(
                "{head}: {} {} \u{2192} {}{animated}",
                info.format, info.original_size, info.display_size
            )
        }
    }
}

/// Closing line of the `info` command.
pub fn format_info_summary(total: usize, failed: usize) -> String {
    match failed {
        0 => format!("Read {total} images"),
        n => format!("Read {total} images, {n} failed"),
    }
}

// ============================================================================
// classify
// ============================================================================

/// Backend name padded to a column, followed by the path.
pub fn format_classify_line(path: &Path, backend: Backend) -> String {
    format!("{:<9} {}", backend.to_string(), path.display())
}
