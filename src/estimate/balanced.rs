//! Balanced strategy: weighted energy centroid over four quadrants.
//!
//! The measure image is split at `ceil(W/2)`, `ceil(H/2)`. Each quadrant is
//! sampled for an [`EnergyPoint`]; the crop box is then centered on the
//! density-weighted mean of the four points. Splitting first keeps one very
//! bright corner from being averaged away by a large dim area.

use super::clamp::clamp_offset;
use super::luminance::{EnergyPoint, LuminanceSampler};
use super::{CropPoint, Result, check_target};
use crate::imaging::{ImageView, Region};
use rand::Rng;
use tracing::debug;

/// One of the four partitions of the measure image.
#[derive(Debug)]
pub struct Quadrant<'a, V: ?Sized> {
    pub origin_x: u32,
    pub origin_y: u32,
    pub view: Region<'a, V>,
}

/// Split `view` into top-left, top-right, bottom-left, bottom-right.
///
/// Every quadrant is `ceil(W/2)` x `ceil(H/2)` clipped to the image, so odd
/// sizes leave the right/bottom quadrants one pixel narrower. Quadrants that
/// clip to nothing (one-pixel-wide or -tall images) are left out.
pub fn quadrants<V: ImageView + ?Sized>(view: &V) -> Vec<Quadrant<'_, V>> {
    let half_w = view.width().div_ceil(2);
    let half_h = view.height().div_ceil(2);

    [(0, 0), (half_w, 0), (0, half_h), (half_w, half_h)]
        .into_iter()
        .map(|(origin_x, origin_y)| Quadrant {
            origin_x,
            origin_y,
            view: Region::new(view, origin_x, origin_y, half_w, half_h),
        })
        .filter(|q| !q.view.is_empty())
        .collect()
}

/// Density-weighted mean of global energy points.
///
/// Returns `None` when every density is zero, i.e. nothing in the image
/// carries energy and there is no meaningful centroid.
pub fn weighted_centroid(points: &[EnergyPoint]) -> Option<(f64, f64)> {
    let total_weight: f64 = points.iter().map(|p| p.density).sum();
    if total_weight <= 0.0 {
        return None;
    }
    Some(points.iter().fold((0.0, 0.0), |(cx, cy), p| {
        let share = p.density / total_weight;
        (cx + p.x * share, cy + p.y * share)
    }))
}

/// Estimate the crop point on an already-built measure image.
pub fn estimate<V: ImageView + ?Sized, R: Rng>(
    measure: &V,
    target_w: u32,
    target_h: u32,
    rng: &mut R,
) -> Result<CropPoint> {
    let (width, height) = (measure.width(), measure.height());
    check_target(width, height, target_w, target_h)?;

    let mut sampler = LuminanceSampler::new(rng);
    let mut points = Vec::with_capacity(4);
    for quadrant in quadrants(measure) {
        let local = sampler.sample(&quadrant.view)?;
        points.push(EnergyPoint {
            x: local.x + quadrant.origin_x as f64,
            y: local.y + quadrant.origin_y as f64,
            density: local.density,
        });
    }

    let (center_x, center_y) = weighted_centroid(&points).unwrap_or_else(|| {
        debug!("measure image carries no energy, centering");
        (width as f64 / 2.0, height as f64 / 2.0)
    });

    let (target_w_f, target_h_f) = (target_w as f64, target_h as f64);
    let mut top_left_x = (center_x - target_w_f / 2.0).max(0.0);
    let mut top_left_y = (center_y - target_h_f / 2.0).max(0.0);

    // Back up until the box fits
    let overflow_x = top_left_x + target_w_f - width as f64;
    if overflow_x > 0.0 {
        top_left_x -= overflow_x;
    }
    let overflow_y = top_left_y + target_h_f - height as f64;
    if overflow_y > 0.0 {
        top_left_y -= overflow_y;
    }

    debug!(
        densities = ?points.iter().map(|p| p.density).collect::<Vec<_>>(),
        center_x,
        center_y,
        "balanced centroid"
    );

    Ok(clamp_offset(
        top_left_x, top_left_y, width, height, target_w, target_h,
    ))
}
