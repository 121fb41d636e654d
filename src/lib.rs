//! # croppoint
//!
//! Content-aware crop-point estimation. Given an image and a crop box smaller
//! than it, pick the top-left corner that keeps the most visually interesting
//! part of the picture.
//!
//! # Pipeline
//!
//! ```text
//! 1. Open      file         →  image
//! 2. Cover     image        →  image scaled to just cover the box (optional)
//! 3. Measure   image        →  edge-detected, thresholded measure image
//! 4. Estimate  measure      →  CropPoint (balanced | entropy | center)
//! 5. Crop      image, point →  saved output
//! ```
//!
//! Steps 3 and 4 are the estimator proper ([`estimate`]); the rest is plumbing
//! in [`imaging`] and [`process`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`estimate`] | Crop-point strategies: luminance sampling, entropy, balanced centroid, entropy slicing, clamping |
//! | [`imaging`] | `ImageBackend` trait, the pure Rust backend, cover-resize and crop operations |
//! | [`config`] | `croppoint.toml` loading, validation, merging over stock defaults |
//! | [`process`] | Single-file cropping and parallel batch cropping over a directory |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Backend-Agnostic Estimators
//!
//! The strategies only read pixels through [`imaging::ImageView`] and ask the
//! [`imaging::ImageBackend`] for the measure-image filters. The shipped
//! backend is [`imaging::RustBackend`] on top of the `image` crate; tests use
//! an in-memory mock whose filters are identities.
//!
//! ## Injected Randomness
//!
//! The balanced strategy samples about one pixel in fifty. The RNG is passed
//! in by the caller, so a seeded `StdRng` reproduces an estimate exactly. The
//! CLI seeds from `seed` in the config (or `--seed`) and from OS entropy
//! otherwise.
//!
//! ## Always In Bounds
//!
//! Every strategy finishes through [`estimate::clamp::clamp_offset`]: a
//! returned point `(x, y)` always satisfies `x + crop_w <= W` and
//! `y + crop_h <= H`.

pub mod config;
pub mod estimate;
pub mod imaging;
pub mod output;
pub mod process;
