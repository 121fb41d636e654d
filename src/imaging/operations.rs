//! High-level image operations.
//!
//! These functions combine calculations with backend execution: they decide
//! which filters, sizes, and offsets to use, then let the backend do the
//! pixel work.

use super::backend::{BackendError, ImageBackend, ImageView};
use super::calculations::calculate_cover_dimensions;
use super::params::{MeasureRecipe, TargetSize};
use crate::estimate::{self, CropPoint, EstimateError, EstimateParams, Strategy};
use rand::Rng;
use tracing::debug;

/// Run the measure-image filter chain over `original`.
///
/// Edge detect → grayscale → black threshold, then the optional blur. The
/// original is left untouched.
pub fn build_measure_image<B: ImageBackend>(
    backend: &B,
    original: &B::Image,
    recipe: &MeasureRecipe,
) -> Result<B::Image, BackendError> {
    let edges = backend.edge_detect(original)?;
    let gray = backend.grayscale(&edges)?;
    let measure = backend.black_threshold(&gray, recipe.threshold)?;
    match recipe.blur_sigma {
        Some(sigma) => backend.gaussian_blur(&measure, sigma),
        None => Ok(measure),
    }
}

/// Scale `image` so it just covers `target` without distortion.
///
/// Images already at the cover size are returned as-is.
pub fn resize_to_cover<B: ImageBackend>(
    backend: &B,
    image: &B::Image,
    target: TargetSize,
) -> Result<B::Image, BackendError> {
    let source = (image.width(), image.height());
    let (width, height) = calculate_cover_dimensions(source, (target.width, target.height));
    if (width, height) == source {
        return Ok(image.clone());
    }
    debug!(from = ?source, to = ?(width, height), "resizing to cover target");
    backend.resize(image, width, height)
}

/// Outcome of [`crop_to_target`].
#[derive(Debug, Clone)]
pub struct CropOutcome<I> {
    pub image: I,
    /// Dimensions the offset was estimated on (after the cover resize, if any).
    pub analyzed: (u32, u32),
    pub offset: CropPoint,
}

/// Crop `image` to `target`, keeping the region `strategy` finds most
/// interesting.
///
/// With `resize` the image is first scaled to cover the target, so the crop
/// only trims the overflowing axis; without it the target must already fit.
pub fn crop_to_target<B: ImageBackend, R: Rng>(
    backend: &B,
    image: &B::Image,
    target: TargetSize,
    strategy: Strategy,
    params: &EstimateParams,
    resize: bool,
    rng: &mut R,
) -> estimate::Result<CropOutcome<B::Image>> {
    if target.width == 0 || target.height == 0 {
        return Err(EstimateError::EmptyTarget {
            target_w: target.width,
            target_h: target.height,
        });
    }

    let working = if resize {
        resize_to_cover(backend, image, target)?
    } else {
        image.clone()
    };
    let analyzed = (working.width(), working.height());

    let offset = estimate::estimate_offset(backend, &working, target, strategy, params, rng)?;
    let cropped = backend.crop(&working, offset.x, offset.y, target.width, target.height)?;

    Ok(CropOutcome {
        image: cropped,
        analyzed,
        offset,
    })
}
