//! Histogram entropy of a region.
//!
//! Unlike the luminance sampler this is exhaustive: every pixel of the region
//! lands in the histogram. Slices are thin, so the cost stays proportional to
//! the strip being judged.

use super::luminance::luminance;
use super::{EstimateError, Result};
use crate::imaging::ImageView;

/// Count of pixels per 8-bit gray level.
pub fn histogram<V: ImageView + ?Sized>(view: &V) -> [u64; 256] {
    let mut bins = [0u64; 256];
    for y in 0..view.height() {
        for x in 0..view.width() {
            let level = luminance(view.pixel_at(x, y)).round().clamp(0.0, 255.0) as usize;
            bins[level] += 1;
        }
    }
    bins
}

/// Shannon entropy, in bits, of the region's gray-level histogram.
///
/// Always `>= 0`; a region of one constant value scores exactly `0`.
pub fn entropy<V: ImageView + ?Sized>(view: &V) -> Result<f64> {
    let (width, height) = (view.width(), view.height());
    if width == 0 || height == 0 {
        return Err(EstimateError::EmptyRegion { width, height });
    }

    let area = view.area();
    let mut value = 0.0;
    for &count in histogram(view).iter().filter(|&&c| c > 0) {
        let p = count as f64 / area;
        value -= p * p.log2();
    }
    Ok(value)
}
