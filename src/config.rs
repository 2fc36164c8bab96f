//! Store configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. The file lives in
//! the store root and is layered over stock defaults: a user file only needs
//! the keys it wants to change.
//!
//! ## Config File Location
//!
//! ```text
//! uploads/
//! ├── config.toml     # optional, overrides stock defaults
//! ├── originals/
//! └── edited/
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [store]
//! originals = "originals"   # Pool for uploaded images
//! derived = "edited"        # Pool for edit output
//!
//! [analysis.brightness]
//! low = 70.0                # mean luminance below this → underexposed
//! high = 180.0              # mean luminance above this → overexposed
//!
//! [analysis.contrast]
//! low = 30.0                # luminance σ below this → lacks contrast
//! high = 80.0               # luminance σ above this → good contrast
//!
//! [analysis.vibrancy]
//! low = 50.0                # saturation σ below this → lacks vibrancy
//! high = 100.0              # saturation σ above this → good vibrancy
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
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

/// Configuration loaded from `config.toml` in the store root.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetouchConfig {
    /// Pool directory names.
    pub store: StoreConfig,
    /// Classifier bands for the analysis engine.
    pub analysis: AnalysisConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl RetouchConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("store.originals", &self.store.originals),
            ("store.derived", &self.store.derived),
        ] {
            if value.is_empty() || value.contains(['/', '\\']) || value == "." || value == ".." {
                return Err(ConfigError::Validation(format!(
                    "{key} must be a plain directory name"
                )));
            }
        }
        if self.store.originals == self.store.derived {
            return Err(ConfigError::Validation(
                "store.originals and store.derived must differ".into(),
            ));
        }
        for (key, band) in [
            ("analysis.brightness", &self.analysis.brightness),
            ("analysis.contrast", &self.analysis.contrast),
            ("analysis.vibrancy", &self.analysis.vibrancy),
        ] {
            if !band.low.is_finite() || !band.high.is_finite() {
                return Err(ConfigError::Validation(format!(
                    "{key} bounds must be finite"
                )));
            }
            if band.low > band.high {
                return Err(ConfigError::Validation(format!(
                    "{key}.low must not exceed {key}.high"
                )));
            }
        }
        Ok(())
    }
}

/// Pool directory names, relative to the store root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub originals: String,
    pub derived: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            originals: "originals".to_string(),
            derived: "edited".to_string(),
        }
    }
}

/// One classifier band: values strictly below `low` or strictly above
/// `high` fall outside; the bounds themselves are inside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BandConfig {
    pub low: f64,
    pub high: f64,
}

/// Classifier bands for each metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Mean luminance.
    pub brightness: BandConfig,
    /// Luminance standard deviation.
    pub contrast: BandConfig,
    /// Saturation standard deviation.
    pub vibrancy: BandConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            brightness: BandConfig {
                low: 70.0,
                high: 180.0,
            },
            contrast: BandConfig {
                low: 30.0,
                high: 80.0,
            },
            vibrancy: BandConfig {
                low: 50.0,
                high: 100.0,
            },
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel analysis workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Name of the optional config file in the store root.
pub const CONFIG_FILE: &str = "config.toml";

/// Stock defaults as a TOML table, the base every user file is laid over.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(RetouchConfig::default()).expect("default config must serialize")
}

/// Lay `overlay` over `base`. Nested tables such as `[analysis.contrast]`
/// merge per key, so a user file can set one bound and keep the other.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut merged), toml::Value::Table(overrides)) => {
            for (key, value) in overrides {
                let value = match merged.remove(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => value,
                };
                merged.insert(key, value);
            }
            toml::Value::Table(merged)
        }
        (_, replacement) => replacement,
    }
}

/// Read the store root's config file, if there is one.
fn read_user_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let path = root.join(CONFIG_FILE);
    if !path.is_file() {
        return Ok(None);
    }
    Ok(Some(toml::from_str(&fs::read_to_string(&path)?)?))
}

/// Load the store root's `config.toml` over stock defaults and validate it.
pub fn load_config(root: &Path) -> Result<RetouchConfig, ConfigError> {
    let merged = match read_user_config(root)? {
        Some(user) => merge_toml(stock_defaults_value(), user),
        None => stock_defaults_value(),
    };
    let config: RetouchConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Retouch Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file in the store root (the directory passed with --root).
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Storage pools
# ---------------------------------------------------------------------------
[store]
# Directory (under the root) holding uploaded, unmodified images.
originals = "originals"

# Directory (under the root) receiving edit output. Never overwritten:
# every edit writes a new, uniquely named file.
derived = "edited"

# ---------------------------------------------------------------------------
# Analysis bands
# ---------------------------------------------------------------------------
# A value strictly below `low` or strictly above `high` produces a
# recommendation; values on or between the bounds are "balanced".

# Mean luminance (0-255).
[analysis.brightness]
low = 70.0
high = 180.0

# Standard deviation of luminance.
[analysis.contrast]
low = 30.0
high = 80.0

# Standard deviation of HSV saturation.
[analysis.vibrancy]
low = 50.0
high = 100.0

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers for `analyze --all`.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
