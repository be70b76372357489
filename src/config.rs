//! Tool configuration.
//!
//! Handles loading and validating `fishspot.toml`. Stock defaults are the
//! base layer; a user file overrides only the keys it names, and command
//! line flags override both.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [compress]
//! max_width = 1920          # Largest output width, in pixels
//! max_height = 1920         # Largest output height, in pixels
//! quality = 0.8             # JPEG quality, 0.01 <= q <= 1
//!
//! [processing]
//! max_concurrent = 4        # Max in-flight compressions (omit for auto = CPU cores)
//!
//! [logging]
//! level = "info"            # Default filter when RUST_LOG is unset
//! format = "pretty"         # "pretty" or "json"
//! include_location = false  # Add file:line to pretty output
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{Bounds, CompressOptions, Quality};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "fishspot.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `fishspot.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Output bounds and JPEG quality.
    pub compress: CompressConfig,
    /// Batch concurrency.
    pub processing: ProcessingConfig,
    /// Log filter and format.
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let quality = self.compress.quality;
        if !(quality >= f64::from(Quality::MIN) && quality <= f64::from(Quality::MAX)) {
            return Err(ConfigError::Validation(format!(
                "compress.quality must be in [{}, {}], got {quality}",
                Quality::MIN,
                Quality::MAX
            )));
        }
        if self.compress.max_width == 0 || self.compress.max_height == 0 {
            return Err(ConfigError::Validation(
                "compress.max_width and compress.max_height must be non-zero".into(),
            ));
        }
        if self.processing.max_concurrent == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_concurrent must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Per-call options for the compressor.
    pub fn to_options(&self) -> CompressOptions {
        CompressOptions {
            bounds: Bounds::new(self.compress.max_width, self.compress.max_height),
            quality: Quality::new(self.compress.quality as f32),
        }
    }
}

/// Output bounds and quality.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompressConfig {
    /// Largest output width in pixels.
    pub max_width: u32,
    /// Largest output height in pixels.
    pub max_height: u32,
    /// JPEG quality in `[0.01, 1]`.
    pub quality: f64,
}

impl Default for CompressConfig {
    fn default() -> Self {
        Self {
            max_width: 1920,
            max_height: 1920,
            quality: 0.8,
        }
    }
}

/// Batch concurrency settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of compressions in flight at once.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_concurrent: Option<usize>,
}

/// Resolve the effective concurrency from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_concurrency(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_concurrent
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
    /// Include source file and line in pretty output.
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            include_location: false,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(AppConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<AppConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the file at `path`, falling back to defaults if absent.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    load_layered(path, &ConfigOverrides::default())
}

/// Stock defaults, then the file at `path` if present, then `overrides`.
///
/// Validation runs once on the final result, so a bad flag is reported
/// the same way as a bad file value.
pub fn load_layered(path: &Path, overrides: &ConfigOverrides) -> Result<AppConfig, ConfigError> {
    let base = match load_raw_config(path)? {
        Some(file) => merge_toml(stock_defaults_value(), file),
        None => stock_defaults_value(),
    };
    resolve_config(base, Some(overrides.to_value()))
}

/// Values given on the command line. Each `Some` replaces the layer below.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub quality: Option<f64>,
    pub max_concurrent: Option<usize>,
}

impl ConfigOverrides {
    /// The overrides as a table shaped like `fishspot.toml`, holding only
    /// the keys that were set.
    pub fn to_value(&self) -> toml::Value {
        let mut compress = toml::Table::new();
        if let Some(w) = self.max_width {
            compress.insert("max_width".into(), i64::from(w).into());
        }
        if let Some(h) = self.max_height {
            compress.insert("max_height".into(), i64::from(h).into());
        }
        if let Some(q) = self.quality {
            compress.insert("quality".into(), q.into());
        }

        let mut processing = toml::Table::new();
        if let Some(n) = self.max_concurrent {
            let n = i64::try_from(n).unwrap_or(i64::MAX);
            processing.insert("max_concurrent".into(), n.into());
        }

        let mut root = toml::Table::new();
        for (section, table) in [("compress", compress), ("processing", processing)] {
            if !table.is_empty() {
                root.insert(section.into(), toml::Value::Table(table));
            }
        }
        toml::Value::Table(root)
    }
}

/// Returns a fully-commented stock `fishspot.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# fishspot-compress configuration
# ===============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Looked up as ./fishspot.toml unless --config is given.
# Command line flags override values from this file.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[compress]
# Photos wider or taller than this are scaled down, keeping the aspect ratio.
# Only the longer side is checked: landscape photos against max_width,
# portrait and square photos against max_height. Nothing is ever upscaled.
max_width = 1920
max_height = 1920

# JPEG quality, from 0.01 to 1.
quality = 0.8

# ---------------------------------------------------------------------------
# Batch processing
# ---------------------------------------------------------------------------
[processing]
# Maximum number of photos compressed at once.
# Omit to use all CPU cores. Values above the core count are clamped down.
# max_concurrent = 4

# ---------------------------------------------------------------------------
# Logging
# ---------------------------------------------------------------------------
[logging]
# Filter used when RUST_LOG is unset, e.g. "debug" or "fishspot_compress=trace".
level = "info"

# "pretty" for humans, "json" for log collectors (bunyan format).
format = "pretty"

# Include source file and line in pretty output.
include_location = false
"##
}
