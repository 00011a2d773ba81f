//! Reader configuration.
//!
//! Loaded once at startup from a TOML file and read-only afterwards. Every
//! key is optional; missing keys fall back to the stock defaults.
//!
//! ## Configuration Options
//!
//! ```toml
//! [routing]
//! native = "*.bmp,*.gif,*.jpg,..."  # Stay on the native decoder
//! external = "*.xcf"                 # Go to the external tool
//!
//! [legacy]
//! enabled = true            # Route unknown suffixes to the legacy decoder
//!
//! [external_tool]
//! program = "xcf2png"       # Converter executable
//! package = "xcftools"      # Named in "not found" errors
//! suffix = "xcf"            # Suffix the converter handles
//! timeout_secs = 30         # Bound on probe and conversion
//!
//! [intermediates]
//! # dir = "/var/tmp"        # Defaults to the system temp directory
//! keep = false              # Leave intermediates behind for debugging
//!
//! [error_image]
//! width = 640
//! height = 480
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::Dimensions;
use crate::routing::{EngineSelector, SuffixList};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Top-level reader configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReaderConfig {
    /// Suffix routing between backends.
    pub routing: RoutingConfig,
    /// Legacy-format decoder settings.
    pub legacy: LegacyConfig,
    /// External conversion tool settings.
    pub external_tool: ExternalToolConfig,
    /// Where transcoders write their intermediate files.
    pub intermediates: IntermediatesConfig,
    /// Placeholder image settings.
    pub error_image: ErrorImageConfig,
}

impl ReaderConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.external_tool.program.trim().is_empty() {
            return Err(ConfigError::Validation(
                "external_tool.program must not be empty".into(),
            ));
        }
        let suffix = &self.external_tool.suffix;
        if suffix.is_empty() || suffix.contains('.') || suffix.contains('*') {
            return Err(ConfigError::Validation(
                "external_tool.suffix must be a bare suffix like \"xcf\"".into(),
            ));
        }
        if self.external_tool.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "external_tool.timeout_secs must be positive".into(),
            ));
        }
        let ErrorImageConfig { width, height } = self.error_image;
        if width == 0 || height == 0 || width > 8192 || height > 8192 {
            return Err(ConfigError::Validation(
                "error_image width and height must be 1-8192".into(),
            ));
        }
        Ok(())
    }

    /// Build the backend selector. `legacy_installed` says whether a legacy
    /// codec is actually present.
    pub fn selector(&self, legacy_installed: bool) -> EngineSelector {
        EngineSelector::new(
            SuffixList::parse(&self.routing.native),
            SuffixList::parse(&self.routing.external),
            self.legacy.enabled && legacy_installed,
        )
    }
}

/// Suffix routing lists, each a comma-separated list of `*.ext` patterns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoutingConfig {
    /// Files the native decoder keeps even when the legacy decoder is on.
    pub native: String,
    /// Files handed to the external tool.
    pub external: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            native: [
                "*.bmp", "*.dib", "*.gif", "*.jpg", "*.jpeg", "*.jpe", "*.png", "*.apng",
                "*.pbm", "*.pgm", "*.ppm", "*.pnm", "*.pam", "*.qoi", "*.tif", "*.tiff",
                "*.webp", "*.svg", "*.svgz",
            ]
            .join(","),
            external: "*.xcf".to_string(),
        }
    }
}

/// Legacy-format decoder settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LegacyConfig {
    /// When false, every non-external file goes to the native decoder.
    pub enabled: bool,
}

impl Default for LegacyConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// External conversion tool settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExternalToolConfig {
    pub program: String,
    pub package: String,
    /// Lowercase suffix (without dot) the tool converts.
    pub suffix: String,
    pub timeout_secs: u64,
}

impl Default for ExternalToolConfig {
    fn default() -> Self {
        Self {
            program: "xcf2png".to_string(),
            package: "xcftools".to_string(),
            suffix: "xcf".to_string(),
            timeout_secs: 30,
        }
    }
}

impl ExternalToolConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Intermediate file settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntermediatesConfig {
    /// Directory for intermediates; the system temp directory when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    /// Keep intermediates after the request for inspection.
    pub keep: bool,
}

impl IntermediatesConfig {
    pub fn effective_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Placeholder image settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ErrorImageConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ErrorImageConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

impl ErrorImageConfig {
    pub fn size(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }
}

// =============================================================================
// Config loading
// =============================================================================

/// Parse and validate config from TOML text.
pub fn parse_config(content: &str) -> Result<ReaderConfig, ConfigError> {
    let config: ReaderConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load config from a TOML file.
///
/// A missing file yields the stock defaults. A file that exists but does
/// not parse or validate is an error.
pub fn load_config(path: &Path) -> Result<ReaderConfig, ConfigError> {
    if !path.exists() {
        log::debug!("no config at {}, using defaults", path.display());
        return Ok(ReaderConfig::default());
    }
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Returns a fully-commented stock config with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# imgread configuration
# =====================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Backend routing
# ---------------------------------------------------------------------------
# Comma-separated suffix patterns. "*.tga" matches any file ending in ".tga",
# case-insensitively. Leading "*" characters are ignored.
[routing]
# Kept on the native decoder even when the legacy decoder is enabled.
native = "*.bmp,*.dib,*.gif,*.jpg,*.jpeg,*.jpe,*.png,*.apng,*.pbm,*.pgm,*.ppm,*.pnm,*.pam,*.qoi,*.tif,*.tiff,*.webp,*.svg,*.svgz"
# Converted by the external tool before decoding.
external = "*.xcf"

# ---------------------------------------------------------------------------
# Legacy formats (TGA, ICO, CUR, MONO, WBMP, ...)
# ---------------------------------------------------------------------------
[legacy]
# Route every suffix not listed above to the legacy decoder.
enabled = true

# ---------------------------------------------------------------------------
# External conversion tool
# ---------------------------------------------------------------------------
[external_tool]
program = "xcf2png"
# Package named in the error shown when the program is missing.
package = "xcftools"
# Suffix (without dot) handled by the tool.
suffix = "xcf"
# Seconds before the probe or the conversion is killed.
timeout_secs = 30

# ---------------------------------------------------------------------------
# Intermediate files
# ---------------------------------------------------------------------------
[intermediates]
# Directory for intermediates. Defaults to the system temp directory.
# dir = "/var/tmp"
# Keep intermediates after each read (for debugging).
keep = false

# ---------------------------------------------------------------------------
# Error placeholder
# ---------------------------------------------------------------------------
[error_image]
width = 640
height = 480
"##
}
