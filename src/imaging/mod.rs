//! Image access and processing in pure Rust, built on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode / encode** | `image` (JPEG, PNG, TIFF, WebP) |
//! | **Measure filters** | Laplacian `filter3x3`, `grayscale`, black threshold, `blur` |
//! | **Cover resize** | `resize_exact` with Lanczos3 |
//! | **Crop** | `crop_imm` |
//!
//! The module is split into:
//! - **Backend**: [`ImageView`], [`Region`], the [`ImageBackend`] trait + [`RustBackend`]
//! - **Calculations**: Pure functions for crop geometry (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend, ImageView, Region, Rgb};
pub use calculations::{calculate_center_offset, calculate_cover_dimensions};
pub use operations::{CropOutcome, build_measure_image, crop_to_target, resize_to_cover};
pub use params::{MeasureRecipe, Quality, TargetSize};
pub use rust_backend::{RustBackend, is_supported_image, supported_input_extensions};
