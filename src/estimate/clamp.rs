//! Final bounds correction for candidate offsets.

use super::CropPoint;

/// Snap a candidate top-left corner into the valid range.
///
/// Each axis is corrected on its own: a negative `x` and a negative `y` are
/// both pulled to 0 in the same call, and both are capped so the crop box ends
/// inside the source. Fractional candidates truncate toward zero.
///
/// Post-condition: `x <= width - target_w` and `y <= height - target_h`.
/// Callers guarantee the target fits inside the source.
pub fn clamp_offset(
    x: f64,
    y: f64,
    width: u32,
    height: u32,
    target_w: u32,
    target_h: u32,
) -> CropPoint {
    CropPoint {
        x: clamp_axis(x, width.saturating_sub(target_w)),
        y: clamp_axis(y, height.saturating_sub(target_h)),
    }
}

fn clamp_axis(value: f64, max: u32) -> u32 {
    if value.is_nan() || value < 0.0 {
        return 0;
    }
    (value.trunc() as u32).min(max)
}
