//! # imgread
//!
//! Image loading for viewers: give it a path and the box the image has to
//! fit in, get back decoded pixels sized for display plus the metadata a
//! viewer needs. Any failure yields a rendered placeholder instead of an
//! error, so a viewer always has something to show.
//!
//! # Architecture: Route, Decode, Fit
//!
//! ```text
//! 1. Route   file name  →  Backend       (suffix rules from config)
//! 2. Decode  Backend    →  pixels        (native, legacy transcode, or external tool)
//! 3. Fit     pixels     →  ImageResult   (two-pass width/height clamp, rotation-aware)
//! ```
//!
//! Transcoding backends never hand pixels back directly: they write an
//! intermediate PNG and re-read it through the native decoder, so sizing
//! and metadata are computed in exactly one place.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`reader`] | The [`ImageReader`](reader::ImageReader) façade: route, dispatch, placeholder on failure |
//! | [`routing`] | Suffix lists and the backend selector |
//! | [`imaging`] | Backends, sizing math, placeholders, intermediates |
//! | [`config`] | `imgread.toml` loading, validation, stock config |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Results, Not Reader State
//!
//! Every read returns an [`ImageResult`](imaging::ImageResult) carrying its
//! own size, format, scale factors and animation flag. The reader keeps no
//! per-call state on the `&self` path, so one instance is shared freely
//! across threads. Callers that want "last read" accessors use
//! [`ImageReader::read_image`](reader::ImageReader::read_image), which takes
//! `&mut self`.
//!
//! ## Zoomed Mode Reports, Never Resizes
//!
//! A zoomed viewer wants full-resolution pixels and scales them itself, so
//! zoomed reads decode at native size and report how far to scale through
//! `scale_factor1` (width pass) and `scale_factor2` (height pass).
//!
//! ## Unique Intermediates
//!
//! Each transcode writes to its own temp file, named with a reserved prefix
//! so the native decoder can tell it from user files and report an empty
//! format for it. Intermediates are removed when the request finishes.

pub mod config;
pub mod imaging;
pub mod output;
pub mod reader;
pub mod routing;

#[cfg(test)]
pub(crate) mod test_helpers;
