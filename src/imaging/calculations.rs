//! Pure calculation functions for crop geometry.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate dimensions that cover a target box (resize before crop).
///
/// Returns dimensions that completely cover the target while keeping the
/// source aspect ratio. One side matches the target exactly, the other may
/// exceed it; neither is ever smaller than the target.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `target` - Crop box dimensions (width, height)
///
/// # Examples
/// ```
/// # use croppoint::imaging::calculate_cover_dimensions;
/// // 800x600 into a 400x500 box: height matches, width overflows
/// assert_eq!(calculate_cover_dimensions((800, 600), (400, 500)), (667, 500));
/// ```
pub fn calculate_cover_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let src_aspect = src_w as f64 / src_h as f64;
    let tgt_aspect = tgt_w as f64 / tgt_h as f64;

    if src_aspect < tgt_aspect {
        // Source is taller: width matches, height overflows
        let h = (tgt_w as f64 / src_aspect).round() as u32;
        (tgt_w, h.max(tgt_h))
    } else {
        // Source is wider (or equal): height matches, width overflows
        let w = (tgt_h as f64 * src_aspect).round() as u32;
        (w.max(tgt_w), tgt_h)
    }
}

/// Offset that centers a `target` box inside `source`.
///
/// Odd leftovers round toward the top-left.
pub fn calculate_center_offset(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    (
        source.0.saturating_sub(target.0) / 2,
        source.1.saturating_sub(target.1) / 2,
    )
}
