//! CLI output formatting for every command.
//!
//! # Output Format
//!
//! ## Estimate
//!
//! ```text
//! dawn.jpg (1200x800)
//!     Strategy: entropy
//!     Crop: 400x400 at (412, 96)
//! ```
//!
//! ## Crop
//!
//! ```text
//! dawn.jpg → dawn-square.jpg
//!     Analyzed: 600x400
//!     Crop: 400x400 at (106, 0)
//! ```
//!
//! ## Batch
//!
//! ```text
//! Cropping 3 images to 400x400 (entropy)
//! 001 dawn.jpg → cropped/dawn.jpg
//!     Crop at (106, 0) of 600x400
//! 002 notes.png
//!     Error: Image processing failed: ...
//!
//! Cropped 2 images, 1 failed
//! ```
//!
//! Batch lines arrive as images finish, so indices may print out of order.
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::estimate::{CropPoint, Strategy};
use crate::imaging::TargetSize;
use crate::process::{BatchResult, CroppedImage, ProcessEvent};
use serde::Serialize;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// File name for display, falling back to the full path.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn crop_line(target: TargetSize, offset: CropPoint) -> String {
    format!(
        "{}Crop: {} at ({}, {})",
        indent(1),
        target,
        offset.x,
        offset.y
    )
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

// ============================================================================
// estimate
// ============================================================================

/// Machine-readable result of `croppoint estimate --json`.
#[derive(Debug, Clone, Serialize)]
pub struct EstimateReport {
    pub image: String,
    pub width: u32,
    pub height: u32,
    pub crop_width: u32,
    pub crop_height: u32,
    pub strategy: Strategy,
    pub x: u32,
    pub y: u32,
}

impl EstimateReport {
    pub fn new(
        image: &Path,
        size: (u32, u32),
        target: TargetSize,
        strategy: Strategy,
        offset: CropPoint,
    ) -> Self {
        Self {
            image: image.display().to_string(),
            width: size.0,
            height: size.1,
            crop_width: target.width,
            crop_height: target.height,
            strategy,
            x: offset.x,
            y: offset.y,
        }
    }

    fn target(&self) -> TargetSize {
        TargetSize::new(self.crop_width, self.crop_height)
    }
}

pub fn format_estimate(report: &EstimateReport) -> Vec<String> {
    vec![
        format!(
            "{} ({}x{})",
            display_name(Path::new(&report.image)),
            report.width,
            report.height
        ),
        format!("{}Strategy: {}", indent(1), report.strategy),
        crop_line(
            report.target(),
            CropPoint {
                x: report.x,
                y: report.y,
            },
        ),
    ]
}

pub fn format_estimate_json(report: &EstimateReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

pub fn print_estimate(report: &EstimateReport) {
    for line in format_estimate(report) {
        println!("{}", line);
    }
}

// ============================================================================
// crop
// ============================================================================

pub fn format_crop_output(image: &CroppedImage, target: TargetSize) -> Vec<String> {
    vec![
        format!(
            "{} → {}",
            display_name(&image.source),
            image.output.display()
        ),
        format!(
            "{}Analyzed: {}x{}",
            indent(1),
            image.analyzed.0,
            image.analyzed.1
        ),
        crop_line(target, image.offset),
    ]
}

pub fn print_crop_output(image: &CroppedImage, target: TargetSize) {
    for line in format_crop_output(image, target) {
        println!("{}", line);
    }
}

// ============================================================================
// batch
// ============================================================================

/// Header line for a batch run.
pub fn format_batch_header(total: usize, target: TargetSize, strategy: Strategy) -> String {
    format!(
        "Cropping {} to {} ({})",
        plural(total, "image"),
        target,
        strategy
    )
}

/// Format a single batch progress event as display lines.
///
/// `BatchStarted` prints nothing here; the caller owns the header because it
/// knows the crop box and strategy.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::BatchStarted { .. } => Vec::new(),
        ProcessEvent::ImageCropped { index, image } => vec![
            format!(
                "{} {} → {}",
                format_index(index + 1),
                display_name(&image.source),
                image.output.display()
            ),
            format!(
                "{}Crop at ({}, {}) of {}x{}",
                indent(1),
                image.offset.x,
                image.offset.y,
                image.analyzed.0,
                image.analyzed.1
            ),
        ],
        ProcessEvent::ImageFailed { index, image } => vec![
            format!(
                "{} {}",
                format_index(index + 1),
                display_name(&image.source)
            ),
            format!("{}Error: {}", indent(1), image.error),
        ],
    }
}

pub fn format_batch_summary(result: &BatchResult) -> Vec<String> {
    let mut summary = format!("Cropped {}", plural(result.cropped.len(), "image"));
    if !result.failed.is_empty() {
        summary.push_str(&format!(", {} failed", result.failed.len()));
    }
    vec![String::new(), summary]
}

pub fn print_batch_summary(result: &BatchResult) {
    for line in format_batch_summary(result) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::FailedImage;
    use std::path::PathBuf;

    fn cropped(source: &str, output: &str) -> CroppedImage {
        CroppedImage {
            source: PathBuf::from(source),
            output: PathBuf::from(output),
            analyzed: (600, 400),
            offset: CropPoint { x: 106, y: 0 },
        }
    }

    fn report() -> EstimateReport {
        EstimateReport::new(
            Path::new("photos/dawn.jpg"),
            (1200, 800),
            TargetSize::new(400, 400),
            Strategy::Entropy,
            CropPoint { x: 412, y: 96 },
        )
    }

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_pads_to_three_digits() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1234), "1234");
    }

    #[test]
    fn plural_handles_one() {
        assert_eq!(plural(1, "image"), "1 image");
        assert_eq!(plural(0, "image"), "0 images");
    }

    // =========================================================================
    // estimate tests
    // =========================================================================

    #[test]
    fn estimate_output_format() {
        assert_eq!(
            format_estimate(&report()),
            vec![
                "dawn.jpg (1200x800)",
                "    Strategy: entropy",
                "    Crop: 400x400 at (412, 96)",
            ]
        );
    }

    #[test]
    fn estimate_json_has_flat_fields() {
        let json = format_estimate_json(&report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["image"], "photos/dawn.jpg");
        assert_eq!(value["strategy"], "entropy");
        assert_eq!(value["crop_width"], 400);
        assert_eq!(value["x"], 412);
        assert_eq!(value["y"], 96);
    }

    // =========================================================================
    // crop tests
    // =========================================================================

    #[test]
    fn crop_output_format() {
        let lines = format_crop_output(
            &cropped("in/dawn.jpg", "dawn-square.jpg"),
            TargetSize::new(400, 400),
        );
        assert_eq!(
            lines,
            vec![
                "dawn.jpg → dawn-square.jpg",
                "    Analyzed: 600x400",
                "    Crop: 400x400 at (106, 0)",
            ]
        );
    }

    // =========================================================================
    // batch tests
    // =========================================================================

    #[test]
    fn batch_header_format() {
        assert_eq!(
            format_batch_header(3, TargetSize::new(400, 400), Strategy::Balanced),
            "Cropping 3 images to 400x400 (balanced)"
        );
    }

    #[test]
    fn batch_started_event_prints_nothing() {
        assert!(format_process_event(&ProcessEvent::BatchStarted { total: 3 }).is_empty());
    }

    #[test]
    fn cropped_event_uses_one_based_index() {
        let event = ProcessEvent::ImageCropped {
            index: 0,
            image: cropped("in/dawn.jpg", "out/dawn.jpg"),
        };
        assert_eq!(
            format_process_event(&event),
            vec!["001 dawn.jpg → out/dawn.jpg", "    Crop at (106, 0) of 600x400"]
        );
    }

    #[test]
    fn failed_event_shows_error() {
        let event = ProcessEvent::ImageFailed {
            index: 1,
            image: FailedImage {
                source: PathBuf::from("in/notes.png"),
                error: "bad header".to_string(),
            },
        };
        assert_eq!(
            format_process_event(&event),
            vec!["002 notes.png", "    Error: bad header"]
        );
    }

    #[test]
    fn batch_summary_without_failures() {
        let result = BatchResult {
            cropped: vec![cropped("a.jpg", "out/a.jpg")],
            failed: vec![],
        };
        assert_eq!(format_batch_summary(&result), vec!["", "Cropped 1 image"]);
    }

    #[test]
    fn batch_summary_with_failures() {
        let result = BatchResult {
            cropped: vec![cropped("a.jpg", "out/a.jpg"), cropped("b.jpg", "out/b.jpg")],
            failed: vec![FailedImage {
                source: PathBuf::from("c.jpg"),
                error: "oops".to_string(),
            }],
        };
        assert_eq!(
            format_batch_summary(&result),
            vec!["", "Cropped 2 images, 1 failed"]
        );
    }
}
