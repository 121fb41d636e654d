//! Entropy strategy: shrink the window one slice at a time.
//!
//! For each axis independently, a window starts at the full image and loses a
//! thin slice from either its low or its high edge per iteration until it is
//! exactly the target size. Of the two candidate slices, the one with lower
//! entropy is discarded, so the window drifts toward the information-rich
//! part of the image. The two axes never interact.
//!
//! Protected [`SafeZone`]s can veto cutting into a slice. Nothing populates
//! them by default, in which case every slice is cuttable and entropy alone
//! decides.

use super::clamp::clamp_offset;
use super::entropy::entropy;
use super::{CropPoint, Result, check_target};
use crate::imaging::{ImageView, Region};
use tracing::debug;

/// The step width is `ceil(margin / DEFAULT_SLICE_STEPS)`.
pub const DEFAULT_SLICE_STEPS: u32 = 25;

/// How much larger one side's potential must be before the other side is
/// forced to give way.
pub const DEFAULT_POTENTIAL_RATIO: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Slicing columns; yields the x offset.
    Horizontal,
    /// Slicing rows; yields the y offset.
    Vertical,
}

/// Which end of the window a slice is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Low,
    High,
}

/// The interval still under consideration on one axis.
///
/// Invariant: `high - low >= target` until the search converges on equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceWindow {
    pub axis: Axis,
    pub low: u32,
    pub high: u32,
}

impl SliceWindow {
    pub fn new(axis: Axis, size: u32) -> Self {
        Self {
            axis,
            low: 0,
            high: size,
        }
    }

    pub fn len(&self) -> u32 {
        self.high - self.low
    }

    pub fn is_empty(&self) -> bool {
        self.low == self.high
    }

    /// First row/column of the `step`-wide slice at `edge`.
    fn slice_start(&self, edge: Edge, step: u32) -> u32 {
        match edge {
            Edge::Low => self.low,
            Edge::High => self.high - step,
        }
    }

    fn cut(&mut self, edge: Edge, step: u32) {
        match edge {
            Edge::Low => self.low += step,
            Edge::High => self.high -= step,
        }
    }
}

/// A rectangle, in source pixels, that slicing should avoid cutting into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeZone {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl SafeZone {
    /// The zone's extent along `axis`.
    fn span(&self, axis: Axis) -> (u32, u32) {
        match axis {
            Axis::Horizontal => (self.left, self.right),
            Axis::Vertical => (self.top, self.bottom),
        }
    }
}

/// Tunables for [`EntropySliceEstimator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceOptions {
    /// Number of steps across the removable margin.
    pub steps: u32,
    pub potential_ratio: f64,
}

impl Default for SliceOptions {
    fn default() -> Self {
        Self {
            steps: DEFAULT_SLICE_STEPS,
            potential_ratio: DEFAULT_POTENTIAL_RATIO,
        }
    }
}

/// Entropy of the slice last seen at one edge.
///
/// Valid while neither the slice position nor the step width changes; cutting
/// that edge discards it.
#[derive(Debug, Clone, Copy)]
struct CachedSlice {
    start: u32,
    step: u32,
    entropy: f64,
}

#[derive(Debug, Clone, Default)]
pub struct EntropySliceEstimator {
    options: SliceOptions,
    safe_zones: Vec<SafeZone>,
}

impl EntropySliceEstimator {
    pub fn new(options: SliceOptions) -> Self {
        Self {
            options,
            safe_zones: Vec::new(),
        }
    }

    pub fn with_safe_zones(mut self, zones: Vec<SafeZone>) -> Self {
        self.safe_zones = zones;
        self
    }

    /// Largest overlap of the candidate slice with any safe zone, as a share
    /// of that zone's extent on `axis` (0 = free to cut, 1 = fully covers a
    /// zone). `boundary` is the window edge the slice is cut from.
    pub fn potential(&self, axis: Axis, edge: Edge, boundary: u32, step: u32) -> f64 {
        let (start, end) = match edge {
            Edge::Low => (boundary, boundary + step),
            Edge::High => (boundary.saturating_sub(step), boundary),
        };

        self.safe_zones
            .iter()
            .filter_map(|zone| {
                let (zone_start, zone_end) = zone.span(axis);
                if zone_end <= zone_start || start > zone_end || end < zone_start {
                    return None;
                }
                let overlap = end.min(zone_end).saturating_sub(start.max(zone_start));
                Some(overlap as f64 / (zone_end - zone_start) as f64)
            })
            .fold(0.0, f64::max)
    }

    /// Pick the edge to cut. Exactly one cuttable side wins outright;
    /// otherwise entropy decides, low losing only when strictly poorer.
    fn choose_edge<V: ImageView + ?Sized>(
        &self,
        view: &V,
        window: &SliceWindow,
        step: u32,
        cache: &mut [Option<CachedSlice>; 2],
    ) -> Result<Edge> {
        let axis = window.axis;
        let potential_low = self.potential(axis, Edge::Low, window.low, step);
        let potential_high = self.potential(axis, Edge::High, window.high, step);

        let mut cut_low = potential_low <= 0.0;
        let mut cut_high = potential_high <= 0.0;
        if !cut_low && !cut_high {
            let ratio = self.options.potential_ratio;
            if potential_low * ratio < potential_high {
                cut_low = true;
            } else if potential_low > potential_high * ratio {
                cut_high = true;
            }
        }

        match (cut_low, cut_high) {
            (true, false) => Ok(Edge::Low),
            (false, true) => Ok(Edge::High),
            _ => {
                let low = slice_entropy(view, window, Edge::Low, step, &mut cache[0])?;
                let high = slice_entropy(view, window, Edge::High, step, &mut cache[1])?;
                Ok(if low < high { Edge::Low } else { Edge::High })
            }
        }
    }

    /// Converge a window of `original_size` down to `target_size` along
    /// `axis` and return where it ends up starting.
    ///
    /// `view` must span at least `original_size` along `axis`; slices cover
    /// the full extent of the other axis.
    pub fn slice_axis<V: ImageView + ?Sized>(
        &self,
        view: &V,
        original_size: u32,
        target_size: u32,
        axis: Axis,
    ) -> Result<u32> {
        let mut window = SliceWindow::new(axis, original_size);
        let mut step = original_size
            .saturating_sub(target_size)
            .div_ceil(self.options.steps.max(1));
        let mut cache: [Option<CachedSlice>; 2] = [None, None];
        let mut iterations = 0u32;

        while window.len() > target_size {
            step = step.min(window.len() - target_size);
            let edge = self.choose_edge(view, &window, step, &mut cache)?;
            window.cut(edge, step);
            cache[edge as usize] = None;
            iterations += 1;
        }

        debug!(?axis, offset = window.low, iterations, "entropy slicing converged");
        Ok(window.low)
    }

    /// Estimate the crop point on an already-built (and blurred) measure image.
    pub fn estimate<V: ImageView + ?Sized>(
        &self,
        measure: &V,
        target_w: u32,
        target_h: u32,
    ) -> Result<CropPoint> {
        let (width, height) = (measure.width(), measure.height());
        check_target(width, height, target_w, target_h)?;

        let x = self.slice_axis(measure, width, target_w, Axis::Horizontal)?;
        let y = self.slice_axis(measure, height, target_h, Axis::Vertical)?;

        Ok(clamp_offset(
            x as f64, y as f64, width, height, target_w, target_h,
        ))
    }
}

/// Entropy of the `step`-wide slice at `edge`, reusing the cached value when
/// the same slice was measured before.
fn slice_entropy<V: ImageView + ?Sized>(
    view: &V,
    window: &SliceWindow,
    edge: Edge,
    step: u32,
    cached: &mut Option<CachedSlice>,
) -> Result<f64> {
    let start = window.slice_start(edge, step);
    if let Some(hit) = cached.filter(|c| c.start == start && c.step == step) {
        return Ok(hit.entropy);
    }

    let slice = match window.axis {
        Axis::Horizontal => Region::new(view, start, 0, step, view.height()),
        Axis::Vertical => Region::new(view, 0, start, view.width(), step),
    };
    let value = entropy(&slice)?;
    *cached = Some(CachedSlice {
        start,
        step,
        entropy: value,
    });
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimate::EstimateError;
    use image::{Rgb as Pixel, RgbImage};

    /// Noise-like texture at `x >= split`, flat black before it.
    fn textured_right(width: u32, height: u32, split: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            if x >= split {
                let v = ((x * 37 + y * 91) % 251) as u8;
                Pixel([v, v, v])
            } else {
                Pixel([0, 0, 0])
            }
        })
    }

    fn estimator() -> EntropySliceEstimator {
        EntropySliceEstimator::new(SliceOptions::default())
    }

    // =========================================================================
    // SliceWindow tests
    // =========================================================================

    #[test]
    fn window_cuts_shrink_from_either_end() {
        let mut window = SliceWindow::new(Axis::Horizontal, 100);
        window.cut(Edge::Low, 3);
        window.cut(Edge::High, 7);
        assert_eq!((window.low, window.high, window.len()), (3, 93, 90));
        assert_eq!(window.slice_start(Edge::Low, 4), 3);
        assert_eq!(window.slice_start(Edge::High, 4), 89);
    }

    // =========================================================================
    // potential tests
    // =========================================================================

    #[test]
    fn potential_without_safe_zones_is_zero() {
        let est = estimator();
        assert_eq!(est.potential(Axis::Horizontal, Edge::Low, 0, 10), 0.0);
        assert_eq!(est.potential(Axis::Vertical, Edge::High, 80, 10), 0.0);
    }

    #[test]
    fn potential_measures_overlap_share() {
        let est = estimator().with_safe_zones(vec![SafeZone {
            left: 10,
            top: 0,
            right: 30,
            bottom: 5,
        }]);
        // Slice [0, 15) covers 5 of the zone's 20 columns
        assert_eq!(est.potential(Axis::Horizontal, Edge::Low, 0, 15), 0.25);
        // Slice [25, 40) from the high edge covers 5 as well
        assert_eq!(est.potential(Axis::Horizontal, Edge::High, 40, 15), 0.25);
        // Far away
        assert_eq!(est.potential(Axis::Horizontal, Edge::Low, 50, 5), 0.0);
    }

    #[test]
    fn potential_uses_axis_extent() {
        let est = estimator().with_safe_zones(vec![SafeZone {
            left: 0,
            top: 40,
            right: 100,
            bottom: 50,
        }]);
        assert_eq!(est.potential(Axis::Vertical, Edge::Low, 40, 10), 1.0);
        assert_eq!(est.potential(Axis::Vertical, Edge::Low, 0, 10), 0.0);
    }

    // =========================================================================
    // slice_axis tests
    // =========================================================================

    #[test]
    fn slice_axis_converges_within_margin() {
        let img = textured_right(100, 20, 30);
        let offset = estimator()
            .slice_axis(&img, 100, 40, Axis::Horizontal)
            .unwrap();
        assert!(offset <= 60, "{offset}");
    }

    #[test]
    fn slice_axis_drops_flat_side() {
        // Left half is flat (entropy 0), right half textured: every low slice
        // loses until the window sits exactly on the texture.
        let img = textured_right(200, 30, 100);
        let offset = estimator()
            .slice_axis(&img, 200, 100, Axis::Horizontal)
            .unwrap();
        assert_eq!(offset, 100);
    }

    #[test]
    fn slice_axis_ties_cut_the_high_edge() {
        let img = RgbImage::from_pixel(90, 90, Pixel([120, 120, 120]));
        let est = estimator();
        assert_eq!(est.slice_axis(&img, 90, 30, Axis::Horizontal).unwrap(), 0);
        assert_eq!(est.slice_axis(&img, 90, 30, Axis::Vertical).unwrap(), 0);
    }

    #[test]
    fn slice_axis_vertical_reads_rows() {
        // Texture in the bottom rows only
        let img = RgbImage::from_fn(40, 120, |x, y| {
            if y >= 60 {
                let v = ((x * 53 + y * 17) % 241) as u8;
                Pixel([v, v, v])
            } else {
                Pixel([0, 0, 0])
            }
        });
        let offset = estimator()
            .slice_axis(&img, 120, 60, Axis::Vertical)
            .unwrap();
        assert_eq!(offset, 60);
    }

    #[test]
    fn slice_axis_no_margin_is_zero() {
        let img = textured_right(50, 50, 10);
        assert_eq!(
            estimator()
                .slice_axis(&img, 50, 50, Axis::Horizontal)
                .unwrap(),
            0
        );
    }

    #[test]
    fn safe_zone_on_low_edge_forces_high_cuts() {
        // Flat image would normally lose high slices anyway; put the texture
        // on the right and protect the flat left so the window cannot move.
        let img = textured_right(200, 30, 100);
        let est = estimator().with_safe_zones(vec![SafeZone {
            left: 0,
            top: 0,
            right: 10,
            bottom: 30,
        }]);
        let offset = est.slice_axis(&img, 200, 100, Axis::Horizontal).unwrap();
        assert_eq!(offset, 0);
    }

    fn columns(left: u32, right: u32) -> SafeZone {
        SafeZone {
            left,
            top: 0,
            right,
            bottom: 30,
        }
    }

    #[test]
    fn dominant_potential_protects_its_edge() {
        // Both edges start inside a zone. The low slice covers all of the
        // narrow zone (1.0), the high slice 4 of the wide zone's 100 columns
        // (0.04), so the high edge gives way against the entropy gradient.
        let img = textured_right(200, 30, 100);
        let est = estimator().with_safe_zones(vec![columns(0, 4), columns(100, 200)]);
        let offset = est.slice_axis(&img, 200, 100, Axis::Horizontal).unwrap();
        assert_eq!(offset, 0);

        // Mirrored zones: now the high edge is protected and the low edge goes
        let est = estimator().with_safe_zones(vec![columns(0, 100), columns(196, 200)]);
        let offset = est.slice_axis(&img, 200, 100, Axis::Horizontal).unwrap();
        assert_eq!(offset, 100);
    }

    #[test]
    fn close_potentials_fall_back_to_entropy() {
        // 0.5 on the low edge against 0.4 on the high edge is within the
        // ratio, so the flat low slices still lose.
        let img = textured_right(200, 30, 100);
        let est = estimator().with_safe_zones(vec![columns(0, 8), columns(190, 200)]);
        assert_eq!(est.potential(Axis::Horizontal, Edge::Low, 0, 4), 0.5);
        assert_eq!(est.potential(Axis::Horizontal, Edge::High, 200, 4), 0.4);

        let offset = est.slice_axis(&img, 200, 100, Axis::Horizontal).unwrap();
        assert_eq!(offset, 100);
    }

    // =========================================================================
    // estimate tests
    // =========================================================================

    #[test]
    fn estimate_combines_independent_axes() {
        let img = textured_right(200, 80, 100);
        let point = estimator().estimate(&img, 100, 80).unwrap();
        assert_eq!(point, CropPoint { x: 100, y: 0 });
    }

    #[test]
    fn estimate_full_size_is_origin() {
        let img = textured_right(64, 48, 20);
        assert_eq!(
            estimator().estimate(&img, 64, 48).unwrap(),
            CropPoint { x: 0, y: 0 }
        );
    }

    #[test]
    fn estimate_rejects_oversized_target() {
        let img = RgbImage::new(10, 10);
        assert!(matches!(
            estimator().estimate(&img, 10, 11),
            Err(EstimateError::TargetTooLarge { .. })
        ));
    }
}
