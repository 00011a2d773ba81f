//! Backend selection by file suffix.
//!
//! Routing is driven by two comma-separated pattern lists from
//! [`RoutingConfig`](crate::config::RoutingConfig):
//!
//! - `native`: files the native decoder keeps even when the legacy decoder
//!   is available.
//! - `external`: files that go to an external conversion tool.
//!
//! A pattern is a suffix with optional leading wildcards: `*.tga`, `**.xcf`
//! and `.tga` all mean "ends with `.tga`". Matching ignores case. This is a
//! suffix match, not a glob: `*` anywhere but the front is literal.

use std::path::Path;

/// The decoding path chosen for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// The native raster/vector decoder.
    Raster,
    /// The legacy-format transcoder.
    AlternateDecoder,
    /// An external conversion tool.
    ExternalTool,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Raster => "native",
            Self::AlternateDecoder => "legacy",
            Self::ExternalTool => "external",
        })
    }
}

/// A compiled list of case-insensitive suffixes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuffixList {
    suffixes: Vec<String>,
}

impl SuffixList {
    /// Compile a comma-separated pattern list. Empty entries are skipped.
    pub fn parse(patterns: &str) -> Self {
        let suffixes = patterns
            .split(',')
            .map(|p| p.trim().trim_start_matches('*').to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        Self { suffixes }
    }

    /// Whether the lowercased `filename` ends with any suffix in the list.
    pub fn matches(&self, filename: &str) -> bool {
        let lower = filename.to_lowercase();
        self.suffixes.iter().any(|s| lower.ends_with(s.as_str()))
    }

    pub fn len(&self) -> usize {
        self.suffixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }
}

/// Classifies file names into a [`Backend`].
#[derive(Debug, Clone, Default)]
pub struct EngineSelector {
    native: SuffixList,
    external: SuffixList,
    alternate_available: bool,
}

impl EngineSelector {
    pub fn new(native: SuffixList, external: SuffixList, alternate_available: bool) -> Self {
        Self {
            native,
            external,
            alternate_available,
        }
    }

    /// Pick a backend; the first matching rule wins:
    ///
    /// 1. external pattern → [`Backend::ExternalTool`]
    /// 2. native pattern, or no legacy decoder → [`Backend::Raster`]
    /// 3. otherwise → [`Backend::AlternateDecoder`]
    pub fn classify(&self, filename: &str) -> Backend {
        if self.external.matches(filename) {
            Backend::ExternalTool
        } else if self.native.matches(filename) || !self.alternate_available {
            Backend::Raster
        } else {
            Backend::AlternateDecoder
        }
    }

    pub fn classify_path(&self, path: &Path) -> Backend {
        self.classify(&path.to_string_lossy())
    }
}
