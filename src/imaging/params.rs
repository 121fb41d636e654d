//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They sit between
//! the estimator (which decides which filters a measure image needs) and the
//! [`backend`](super::backend) (which does the actual pixel work).
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`TargetSize`]: The output box, parsed from `WxH` on the command line.
//! - [`MeasureRecipe`]: Filter chain that turns an original into a measure image.

use std::fmt;
use std::str::FromStr;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Width and height of the requested crop box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

impl TargetSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for TargetSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for TargetSize {
    type Err = String;

    /// Parse `WxH` (also accepts `X` and `*` as the separator).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X', '*'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
        let width: u32 = w
            .trim()
            .parse()
            .map_err(|_| format!("invalid width '{w}'"))?;
        let height: u32 = h
            .trim()
            .parse()
            .map_err(|_| format!("invalid height '{h}'"))?;
        if width == 0 || height == 0 {
            return Err(format!("crop size must be non-zero, got '{s}'"));
        }
        Ok(Self { width, height })
    }
}

/// Filter chain for a measure image: edge detect → grayscale → black
/// threshold, optionally followed by a Gaussian blur.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasureRecipe {
    /// Channel values below this become black.
    pub threshold: u8,
    /// Blur sigma; `None` skips the blur.
    pub blur_sigma: Option<f32>,
}

impl MeasureRecipe {
    /// Recipe for the balanced strategy: drop everything darker than `#101010`.
    pub fn balanced() -> Self {
        Self {
            threshold: 16,
            blur_sigma: None,
        }
    }

    /// Recipe for the entropy strategy. Entropy behaves more smoothly on
    /// blurred content, so the thresholded edges are softened with sigma 2.
    pub fn entropy() -> Self {
        Self {
            threshold: 7,
            blur_sigma: Some(2.0),
        }
    }
}
