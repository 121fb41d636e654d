//! Content-aware crop-point estimation.
//!
//! Given an image and a target box, find the top-left corner that keeps the
//! most visually interesting part of the image. Two content-aware strategies
//! are available, plus a plain center crop:
//!
//! | Strategy | Module | Idea |
//! |---|---|---|
//! | [`Strategy::Balanced`] | [`balanced`] | Weighted energy centroid of four quadrants (random sampling) |
//! | [`Strategy::Entropy`] | [`slice`] | Shave the lower-entropy edge slice until the window fits |
//! | [`Strategy::Center`] | |  Geometric center |
//!
//! Both content-aware strategies work on a *measure image*, never on the
//! original: edges are detected, color is dropped, and near-black noise is
//! thresholded away (see [`MeasureRecipe`]). Building the measure image is the
//! only thing they ask of the [`ImageBackend`]; the algorithms themselves only
//! read pixels through [`ImageView`].
//!
//! Every result goes through [`clamp::clamp_offset`], so the returned
//! [`CropPoint`] always describes a box inside the source.

pub mod balanced;
pub mod clamp;
pub mod entropy;
pub mod luminance;
pub mod slice;

use crate::imaging::{
    BackendError, ImageBackend, ImageView, MeasureRecipe, TargetSize, build_measure_image,
    calculate_center_offset,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use slice::{EntropySliceEstimator, SliceOptions};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum EstimateError {
    #[error("Crop {target_w}x{target_h} does not fit in {width}x{height} image")]
    TargetTooLarge {
        target_w: u32,
        target_h: u32,
        width: u32,
        height: u32,
    },
    #[error("Crop size must be non-zero, got {target_w}x{target_h}")]
    EmptyTarget { target_w: u32, target_h: u32 },
    #[error("Cannot measure an empty {width}x{height} region")]
    EmptyRegion { width: u32, height: u32 },
    #[error("Image backend failed: {0}")]
    Backend(#[from] BackendError),
}

/// Result type for estimation.
pub type Result<T> = std::result::Result<T, EstimateError>;

/// Top-left corner of the chosen crop box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CropPoint {
    pub x: u32,
    pub y: u32,
}

/// How the crop point is chosen.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Quadrant-weighted energy centroid.
    Balanced,
    /// Iterative low-entropy slice removal.
    #[default]
    Entropy,
    /// Geometric center.
    Center,
}

impl Strategy {
    pub fn name(self) -> &'static str {
        match self {
            Strategy::Balanced => "balanced",
            Strategy::Entropy => "entropy",
            Strategy::Center => "center",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// All tunables of the estimators in one place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimateParams {
    pub balanced: MeasureRecipe,
    pub entropy: MeasureRecipe,
    pub slices: SliceOptions,
}

impl Default for EstimateParams {
    fn default() -> Self {
        Self {
            balanced: MeasureRecipe::balanced(),
            entropy: MeasureRecipe::entropy(),
            slices: SliceOptions::default(),
        }
    }
}

/// Fail fast when the target box is empty or larger than the source.
pub fn check_target(width: u32, height: u32, target_w: u32, target_h: u32) -> Result<()> {
    if target_w == 0 || target_h == 0 {
        return Err(EstimateError::EmptyTarget { target_w, target_h });
    }
    if target_w > width || target_h > height {
        return Err(EstimateError::TargetTooLarge {
            target_w,
            target_h,
            width,
            height,
        });
    }
    Ok(())
}

/// Balanced crop point with the stock measure recipe.
pub fn estimate_balanced_offset<B: ImageBackend, R: Rng>(
    backend: &B,
    original: &B::Image,
    target_w: u32,
    target_h: u32,
    rng: &mut R,
) -> Result<CropPoint> {
    check_target(original.width(), original.height(), target_w, target_h)?;
    balanced_with(
        backend,
        original,
        target_w,
        target_h,
        &MeasureRecipe::balanced(),
        rng,
    )
}

/// Entropy crop point with the stock measure recipe and slice options.
pub fn estimate_entropy_offset<B: ImageBackend>(
    backend: &B,
    original: &B::Image,
    target_w: u32,
    target_h: u32,
) -> Result<CropPoint> {
    check_target(original.width(), original.height(), target_w, target_h)?;
    entropy_with(
        backend,
        original,
        target_w,
        target_h,
        &MeasureRecipe::entropy(),
        &EntropySliceEstimator::default(),
    )
}

/// Crop point for `strategy` with explicit tunables.
///
/// The RNG is only drawn from by [`Strategy::Balanced`].
pub fn estimate_offset<B: ImageBackend, R: Rng>(
    backend: &B,
    original: &B::Image,
    target: TargetSize,
    strategy: Strategy,
    params: &EstimateParams,
    rng: &mut R,
) -> Result<CropPoint> {
    let (width, height) = (original.width(), original.height());
    check_target(width, height, target.width, target.height)?;

    let point = match strategy {
        Strategy::Balanced => balanced_with(
            backend,
            original,
            target.width,
            target.height,
            &params.balanced,
            rng,
        )?,
        Strategy::Entropy => entropy_with(
            backend,
            original,
            target.width,
            target.height,
            &params.entropy,
            &EntropySliceEstimator::new(params.slices),
        )?,
        Strategy::Center => {
            let (x, y) =
                calculate_center_offset((width, height), (target.width, target.height));
            CropPoint { x, y }
        }
    };

    debug!(%strategy, size = %target, x = point.x, y = point.y, "crop point estimated");
    Ok(point)
}

fn balanced_with<B: ImageBackend, R: Rng>(
    backend: &B,
    original: &B::Image,
    target_w: u32,
    target_h: u32,
    recipe: &MeasureRecipe,
    rng: &mut R,
) -> Result<CropPoint> {
    let measure = build_measure_image(backend, original, recipe)?;
    balanced::estimate(&measure, target_w, target_h, rng)
}

fn entropy_with<B: ImageBackend>(
    backend: &B,
    original: &B::Image,
    target_w: u32,
    target_h: u32,
    recipe: &MeasureRecipe,
    estimator: &EntropySliceEstimator,
) -> Result<CropPoint> {
    let measure = build_measure_image(backend, original, recipe)?;
    estimator.estimate(&measure, target_w, target_h)
}
