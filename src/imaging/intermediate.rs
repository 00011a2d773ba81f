//! Per-request temporary files written by the transcoders.
//!
//! Every transcode gets its own uniquely named PNG, so concurrent requests
//! never overwrite each other's output. File names start with a reserved
//! prefix, which is how [`RasterDecoder`](super::raster::RasterDecoder)
//! recognizes an intermediate and suppresses its format label.

use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempPath;

pub const PREFIX: &str = ".imgread-intermediate-";

/// Whether `path` names an intermediate file.
pub fn is_intermediate(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(PREFIX))
}

/// Where intermediates go and whether they outlive their request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntermediateStore {
    dir: PathBuf,
    keep: bool,
}

impl Default for IntermediateStore {
    fn default() -> Self {
        Self::new(std::env::temp_dir(), false)
    }
}

impl IntermediateStore {
    pub fn new(dir: impl Into<PathBuf>, keep: bool) -> Self {
        Self {
            dir: dir.into(),
            keep,
        }
    }

    /// Reserve a new, empty intermediate PNG.
    pub fn create(&self) -> io::Result<Intermediate> {
        let file = tempfile::Builder::new()
            .prefix(PREFIX)
            .suffix(".png")
            .tempfile_in(&self.dir)?;
        Ok(Intermediate {
            path: file.into_temp_path(),
            keep: self.keep,
        })
    }
}

/// A reserved intermediate file. Dropping it removes the file.
#[derive(Debug)]
pub struct Intermediate {
    path: TempPath,
    keep: bool,
}

impl Intermediate {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the file: removed, or left in place when the store keeps
    /// intermediates.
    pub fn finish(self) {
        if !self.keep {
            return;
        }
        match self.path.keep() {
            Ok(kept) => log::debug!("keeping intermediate {}", kept.display()),
            Err(e) => log::warn!("failed to keep intermediate: {e}"),
        }
    }
}
