//! Estimator configuration.
//!
//! Handles loading, validating, and merging `croppoint.toml`. Stock defaults
//! are overridden by the user file, key by key, so a config only needs the
//! values it wants to change.
//!
//! ## Config File Location
//!
//! `croppoint.toml` in the working directory is picked up automatically.
//! Pass `--config <PATH>` to use a different file.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! strategy = "entropy"      # balanced | entropy | center
//! # seed = 42               # Fixed seed for the balanced sampler
//! resize = true             # Scale to cover the target before cropping
//!
//! [balanced]
//! threshold = 16            # Black threshold of the measure image
//!
//! [entropy]
//! threshold = 7
//! blur_sigma = 2.0          # Blur applied after thresholding
//! slice_steps = 25          # Steps across the removable margin
//! potential_ratio = 1.5     # Safe-zone dominance ratio
//!
//! [output]
//! quality = 90              # JPEG quality (1-100)
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::estimate::slice::{DEFAULT_POTENTIAL_RATIO, DEFAULT_SLICE_STEPS, SliceOptions};
use crate::estimate::{EstimateParams, Strategy};
use crate::imaging::{MeasureRecipe, Quality};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "croppoint.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `croppoint.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CropConfig {
    /// Strategy used when the command line doesn't pick one.
    pub strategy: Strategy,
    /// Seed for the balanced sampler. `None` seeds from entropy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Scale the image to cover the target before cropping.
    pub resize: bool,
    pub balanced: BalancedConfig,
    pub entropy: EntropyConfig,
    pub output: OutputConfig,
    pub processing: ProcessingConfig,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            seed: None,
            resize: true,
            balanced: BalancedConfig::default(),
            entropy: EntropyConfig::default(),
            output: OutputConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl CropConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entropy.blur_sigma.is_nan() || self.entropy.blur_sigma <= 0.0 {
            return Err(ConfigError::Validation(
                "entropy.blur_sigma must be greater than 0".into(),
            ));
        }
        if self.entropy.slice_steps == 0 {
            return Err(ConfigError::Validation(
                "entropy.slice_steps must be at least 1".into(),
            ));
        }
        if self.entropy.potential_ratio.is_nan() || self.entropy.potential_ratio < 1.0 {
            return Err(ConfigError::Validation(
                "entropy.potential_ratio must be at least 1.0".into(),
            ));
        }
        if !(1..=100).contains(&self.output.quality) {
            return Err(ConfigError::Validation(
                "output.quality must be 1-100".into(),
            ));
        }
        Ok(())
    }

    /// Estimator tunables described by this config.
    pub fn estimate_params(&self) -> EstimateParams {
        EstimateParams {
            balanced: MeasureRecipe {
                threshold: self.balanced.threshold,
                blur_sigma: None,
            },
            entropy: MeasureRecipe {
                threshold: self.entropy.threshold,
                blur_sigma: Some(self.entropy.blur_sigma),
            },
            slices: SliceOptions {
                steps: self.entropy.slice_steps,
                potential_ratio: self.entropy.potential_ratio,
            },
        }
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.output.quality)
    }
}

/// Measure-image settings for the balanced strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BalancedConfig {
    pub threshold: u8,
}

impl Default for BalancedConfig {
    fn default() -> Self {
        Self {
            threshold: MeasureRecipe::balanced().threshold,
        }
    }
}

/// Measure-image and slicing settings for the entropy strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EntropyConfig {
    pub threshold: u8,
    pub blur_sigma: f32,
    pub slice_steps: u32,
    pub potential_ratio: f64,
}

impl Default for EntropyConfig {
    fn default() -> Self {
        let recipe = MeasureRecipe::entropy();
        Self {
            threshold: recipe.threshold,
            blur_sigma: recipe.blur_sigma.unwrap_or(2.0),
            slice_steps: DEFAULT_SLICE_STEPS,
            potential_ratio: DEFAULT_POTENTIAL_RATIO,
        }
    }
}

/// Encoding settings for cropped images.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// JPEG quality (1-100). Lossless formats ignore it.
    pub quality: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            quality: Quality::default().value(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel batch workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
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

/// Stock defaults as a TOML table, the base layer for merging.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(CropConfig::default())?)
}

/// Deep-merge `overlay` onto `base`. Tables merge key by key; anything else
/// in the overlay replaces the base value.
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

/// Read a config file as raw TOML. A missing file is `Ok(None)`.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge `overlay` onto `base`, deserialize, and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<CropConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: CropConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the effective config.
///
/// An explicit path must exist. Without one, `croppoint.toml` in the working
/// directory is used when present, stock defaults otherwise.
pub fn load_config(explicit: Option<&Path>) -> Result<CropConfig, ConfigError> {
    let overlay = match explicit {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Some(toml::from_str(&content)?)
        }
        None => load_raw_config(Path::new(CONFIG_FILE_NAME))?,
    };
    resolve_config(stock_defaults_value()?, overlay)
}

/// Documented stock config, printed by `croppoint gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# croppoint configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# croppoint reads ./croppoint.toml when present, or the file given with
# --config. Unknown keys will cause an error.

# Default strategy: "balanced", "entropy" or "center".
strategy = "entropy"

# Seed for the balanced strategy's random sampler. With a seed, results are
# reproducible; without one every run samples differently.
# seed = 42

# Scale the image so it just covers the crop box before cropping. When off,
# the crop box must fit inside the original image.
resize = true

# ---------------------------------------------------------------------------
# Balanced strategy
# ---------------------------------------------------------------------------
[balanced]
# Edge-image channel values below this level are treated as black.
threshold = 16

# ---------------------------------------------------------------------------
# Entropy strategy
# ---------------------------------------------------------------------------
[entropy]
# Edge-image channel values below this level are treated as black.
threshold = 7

# Gaussian blur sigma applied to the thresholded edges (must be > 0).
blur_sigma = 2.0

# The removable margin is shaved off in this many steps.
slice_steps = 25

# A safe zone pins an edge once its overlap exceeds the other edge's by
# this ratio (must be >= 1.0).
potential_ratio = 1.5

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# JPEG encoding quality (1 = worst, 100 = best).
quality = 90

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel batch workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
