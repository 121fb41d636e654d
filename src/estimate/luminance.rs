//! Random luminance sampling and energy points.
//!
//! Scanning every pixel of every quadrant is wasteful for a centroid that only
//! needs to be roughly right, so the sampler draws about 2% of a region's
//! pixels (with replacement) and weights each draw by its luminance.

use super::{EstimateError, Result};
use crate::imaging::{ImageView, Rgb};
use rand::Rng;

/// One sample per this many pixels.
pub const PIXELS_PER_SAMPLE: f64 = 50.0;

/// YUV luma of an RGB pixel.
pub fn luminance(rgb: Rgb) -> f64 {
    let [r, g, b] = rgb;
    0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64
}

/// Weighted centroid of a region plus its normalized energy.
///
/// `x` and `y` are 1-based local coordinates weighted by luminance, or 0 when
/// nothing bright was sampled. `density` is the sampled luminance sum divided
/// by the region's area, so regions of different size compare fairly.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnergyPoint {
    pub x: f64,
    pub y: f64,
    pub density: f64,
}

/// Estimates [`EnergyPoint`]s with an injected random source.
pub struct LuminanceSampler<'r, R> {
    rng: &'r mut R,
}

impl<'r, R: Rng> LuminanceSampler<'r, R> {
    pub fn new(rng: &'r mut R) -> Self {
        Self { rng }
    }

    /// Number of draws for a `width` x `height` region.
    pub fn sample_count(width: u32, height: u32) -> u64 {
        (width as f64 * height as f64 / PIXELS_PER_SAMPLE).round() as u64
    }

    pub fn sample<V: ImageView + ?Sized>(&mut self, view: &V) -> Result<EnergyPoint> {
        let (width, height) = (view.width(), view.height());
        if width == 0 || height == 0 {
            return Err(EstimateError::EmptyRegion { width, height });
        }

        let mut sum = 0.0;
        let mut x_center = 0.0;
        let mut y_center = 0.0;

        for _ in 0..Self::sample_count(width, height) {
            let i = self.rng.gen_range(0..width);
            let j = self.rng.gen_range(0..height);
            let value = luminance(view.pixel_at(i, j));
            sum += value;
            x_center += (i + 1) as f64 * value;
            y_center += (j + 1) as f64 * value;
        }

        if sum > 0.0 {
            x_center /= sum;
            y_center /= sum;
        }

        Ok(EnergyPoint {
            x: x_center,
            y: y_center,
            density: sum / view.area(),
        })
    }
}
