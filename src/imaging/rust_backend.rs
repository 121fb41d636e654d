//! Pure Rust image backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::load_from_memory`, `ImageReader` |
//! | Edge detect | `DynamicImage::filter3x3` with an 8-neighbour Laplacian |
//! | Grayscale | `DynamicImage::grayscale` |
//! | Black threshold | per-pixel pass over `to_luma8` |
//! | Gaussian blur | `DynamicImage::blur` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Crop | `DynamicImage::crop_imm` |
//! | Encode | `JpegEncoder` (with quality) or `save_with_format` |

use super::backend::{BackendError, ImageBackend, ImageView, Rgb};
use super::params::Quality;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader, RgbImage};
use std::path::Path;
use std::sync::LazyLock;

/// 8-neighbour Laplacian. Sums to zero, so flat areas come out black.
const LAPLACIAN: [f32; 9] = [-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0];

/// Extensions whose decoders are compiled in.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Whether `path` has an extension we can decode.
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(e))
        })
}

impl ImageView for DynamicImage {
    fn width(&self) -> u32 {
        GenericImageView::width(self)
    }

    fn height(&self) -> u32 {
        GenericImageView::height(self)
    }

    fn pixel_at(&self, x: u32, y: u32) -> Rgb {
        let p = GenericImageView::get_pixel(self, x, y);
        [p[0], p[1], p[2]]
    }
}

impl ImageView for RgbImage {
    fn width(&self) -> u32 {
        RgbImage::width(self)
    }

    fn height(&self) -> u32 {
        RgbImage::height(self)
    }

    fn pixel_at(&self, x: u32, y: u32) -> Rgb {
        self.get_pixel(x, y).0
    }
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBackend for RustBackend {
    type Image = DynamicImage;

    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, BackendError> {
        image::load_from_memory(bytes).map_err(|e| BackendError::Decode(e.to_string()))
    }

    fn open(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        ImageReader::open(path)
            .map_err(BackendError::Io)?
            .with_guessed_format()
            .map_err(BackendError::Io)?
            .decode()
            .map_err(|e| BackendError::Decode(format!("{}: {}", path.display(), e)))
    }

    fn save(&self, image: &DynamicImage, path: &Path, quality: Quality) -> Result<(), BackendError> {
        let format = ImageFormat::from_path(path).map_err(|_| {
            BackendError::ProcessingFailed(format!(
                "Unsupported output format: {}",
                path.display()
            ))
        })?;

        match format {
            ImageFormat::Jpeg => {
                let file = std::fs::File::create(path)?;
                let writer = std::io::BufWriter::new(file);
                let encoder = JpegEncoder::new_with_quality(writer, quality.value() as u8);
                // JPEG has no alpha channel
                DynamicImage::ImageRgb8(image.to_rgb8())
                    .write_with_encoder(encoder)
                    .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {e}")))
            }
            other if other.writing_enabled() => image
                .save_with_format(path, other)
                .map_err(|e| BackendError::ProcessingFailed(format!("Encode failed: {e}"))),
            other => Err(BackendError::ProcessingFailed(format!(
                "No encoder compiled in for {other:?}"
            ))),
        }
    }

    fn edge_detect(&self, image: &DynamicImage) -> Result<DynamicImage, BackendError> {
        // Filter RGB only; a flat alpha channel would otherwise be zeroed too
        Ok(DynamicImage::ImageRgb8(image.to_rgb8()).filter3x3(&LAPLACIAN))
    }

    fn grayscale(&self, image: &DynamicImage) -> Result<DynamicImage, BackendError> {
        Ok(image.grayscale())
    }

    fn black_threshold(&self, image: &DynamicImage, level: u8) -> Result<DynamicImage, BackendError> {
        let mut luma = image.to_luma8();
        for pixel in luma.pixels_mut() {
            if pixel.0[0] < level {
                pixel.0[0] = 0;
            }
        }
        Ok(DynamicImage::ImageLuma8(luma))
    }

    fn gaussian_blur(&self, image: &DynamicImage, sigma: f32) -> Result<DynamicImage, BackendError> {
        if sigma <= 0.0 {
            return Err(BackendError::ProcessingFailed(format!(
                "Blur sigma must be positive, got {sigma}"
            )));
        }
        Ok(image.blur(sigma))
    }

    fn resize(
        &self,
        image: &DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, BackendError> {
        Ok(image.resize_exact(width, height, FilterType::Lanczos3))
    }

    fn crop(
        &self,
        image: &DynamicImage,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, BackendError> {
        let (w, h) = GenericImageView::dimensions(image);
        if x.saturating_add(width) > w || y.saturating_add(height) > h {
            return Err(BackendError::ProcessingFailed(format!(
                "Crop {width}x{height}+{x}+{y} exceeds {w}x{h} image"
            )));
        }
        Ok(image.crop_imm(x, y, width, height))
    }
}
