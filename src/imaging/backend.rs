//! Image backend trait, pixel views, and shared types.
//!
//! The estimator never touches pixel formats, codecs, or filter kernels
//! itself. Everything it needs from an imaging engine goes through two seams:
//!
//! - [`ImageView`]: read-only pixel access (`width`, `height`, `pixel_at`).
//! - [`ImageBackend`]: decode, the four measure-image filters (edge detect,
//!   grayscale, black threshold, Gaussian blur), resize, crop, and save.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use an in-memory mock that records every call.

use super::params::Quality;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// An 8-bit RGB triple.
pub type Rgb = [u8; 3];

/// Read-only access to a decoded raster.
///
/// Coordinates are zero-based; callers never ask for pixels outside
/// `0..width` x `0..height`.
pub trait ImageView {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn pixel_at(&self, x: u32, y: u32) -> Rgb;

    /// Total pixel count as a float, the denominator for densities and
    /// histogram probabilities.
    fn area(&self) -> f64 {
        self.width() as f64 * self.height() as f64
    }
}

impl<V: ImageView + ?Sized> ImageView for &V {
    fn width(&self) -> u32 {
        (**self).width()
    }

    fn height(&self) -> u32 {
        (**self).height()
    }

    fn pixel_at(&self, x: u32, y: u32) -> Rgb {
        (**self).pixel_at(x, y)
    }
}

/// A rectangular window into another view.
///
/// Quadrants and slices are regions, so carving up the measure image never
/// copies pixels. The rectangle is clipped to the parent on construction and
/// may end up empty.
#[derive(Debug)]
pub struct Region<'a, V: ?Sized> {
    parent: &'a V,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

impl<'a, V: ImageView + ?Sized> Region<'a, V> {
    pub fn new(parent: &'a V, x: u32, y: u32, width: u32, height: u32) -> Self {
        let x = x.min(parent.width());
        let y = y.min(parent.height());
        Self {
            parent,
            x,
            y,
            width: width.min(parent.width() - x),
            height: height.min(parent.height() - y),
        }
    }

    /// Left edge in parent coordinates.
    pub fn x(&self) -> u32 {
        self.x
    }

    /// Top edge in parent coordinates.
    pub fn y(&self) -> u32 {
        self.y
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl<V: ImageView + ?Sized> ImageView for Region<'_, V> {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn pixel_at(&self, x: u32, y: u32) -> Rgb {
        self.parent.pixel_at(self.x + x, self.y + y)
    }
}

/// Trait for image backends.
///
/// Filters return a new image; the input is never mutated, so one decoded
/// original can feed several measure images. Exact filter parameters (edge
/// radius, threshold level, blur sigma) are chosen by the caller.
pub trait ImageBackend: Sync {
    type Image: ImageView + Clone + Send;

    /// Decode an encoded image held in memory.
    fn decode(&self, bytes: &[u8]) -> Result<Self::Image, BackendError>;

    /// Read and decode an image file.
    fn open(&self, path: &Path) -> Result<Self::Image, BackendError>;

    /// Encode and write an image, inferring the format from the extension.
    fn save(&self, image: &Self::Image, path: &Path, quality: Quality)
    -> Result<(), BackendError>;

    /// Emphasize edges (Laplacian-style), leaving flat areas black.
    fn edge_detect(&self, image: &Self::Image) -> Result<Self::Image, BackendError>;

    /// Drop color, keeping luminance.
    fn grayscale(&self, image: &Self::Image) -> Result<Self::Image, BackendError>;

    /// Force every channel value below `level` to black.
    fn black_threshold(&self, image: &Self::Image, level: u8)
    -> Result<Self::Image, BackendError>;

    fn gaussian_blur(&self, image: &Self::Image, sigma: f32) -> Result<Self::Image, BackendError>;

    /// Resize to exactly `width` x `height`, ignoring aspect ratio.
    fn resize(
        &self,
        image: &Self::Image,
        width: u32,
        height: u32,
    ) -> Result<Self::Image, BackendError>;

    fn crop(
        &self,
        image: &Self::Image,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Result<Self::Image, BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use image::RgbImage;
    use std::sync::Mutex;

    /// Mock backend that records operations and keeps pixels untouched.
    ///
    /// Filters are identities so tests control the measure image exactly;
    /// resize and crop do real work so dimensions flow through.
    /// Uses Mutex (not RefCell) so it is Sync like real backends.
    #[derive(Default)]
    pub struct MockBackend {
        pub decode_results: Mutex<Vec<RgbImage>>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Decode(usize),
        Open(String),
        Save { path: String, quality: u32 },
        EdgeDetect,
        Grayscale,
        BlackThreshold(u8),
        GaussianBlur(f32),
        Resize { width: u32, height: u32 },
        Crop { x: u32, y: u32, width: u32, height: u32 },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_images(images: Vec<RgbImage>) -> Self {
            Self {
                decode_results: Mutex::new(images),
                operations: Mutex::new(Vec::new()),
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        fn record(&self, op: RecordedOp) {
            self.operations.lock().unwrap().push(op);
        }

        fn next_image(&self) -> Result<RgbImage, BackendError> {
            self.decode_results
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| BackendError::Decode("No mock image".to_string()))
        }
    }

    impl ImageBackend for MockBackend {
        type Image = RgbImage;

        fn decode(&self, bytes: &[u8]) -> Result<RgbImage, BackendError> {
            self.record(RecordedOp::Decode(bytes.len()));
            self.next_image()
        }

        fn open(&self, path: &Path) -> Result<RgbImage, BackendError> {
            self.record(RecordedOp::Open(path.to_string_lossy().to_string()));
            self.next_image()
        }

        fn save(&self, _image: &RgbImage, path: &Path, quality: Quality) -> Result<(), BackendError> {
            self.record(RecordedOp::Save {
                path: path.to_string_lossy().to_string(),
                quality: quality.value(),
            });
            Ok(())
        }

        fn edge_detect(&self, image: &RgbImage) -> Result<RgbImage, BackendError> {
            self.record(RecordedOp::EdgeDetect);
            Ok(image.clone())
        }

        fn grayscale(&self, image: &RgbImage) -> Result<RgbImage, BackendError> {
            self.record(RecordedOp::Grayscale);
            Ok(image.clone())
        }

        fn black_threshold(&self, image: &RgbImage, level: u8) -> Result<RgbImage, BackendError> {
            self.record(RecordedOp::BlackThreshold(level));
            Ok(image.clone())
        }

        fn gaussian_blur(&self, image: &RgbImage, sigma: f32) -> Result<RgbImage, BackendError> {
            self.record(RecordedOp::GaussianBlur(sigma));
            Ok(image.clone())
        }

        fn resize(&self, image: &RgbImage, width: u32, height: u32) -> Result<RgbImage, BackendError> {
            self.record(RecordedOp::Resize { width, height });
            Ok(image::imageops::resize(
                image,
                width,
                height,
                image::imageops::FilterType::Nearest,
            ))
        }

        fn crop(
            &self,
            image: &RgbImage,
            x: u32,
            y: u32,
            width: u32,
            height: u32,
        ) -> Result<RgbImage, BackendError> {
            self.record(RecordedOp::Crop {
                x,
                y,
                width,
                height,
            });
            Ok(image::imageops::crop_imm(image, x, y, width, height).to_image())
        }
    }

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| image::Rgb([x as u8, y as u8, 7]))
    }

    #[test]
    fn region_reads_through_to_parent() {
        let img = gradient(10, 8);
        let region = Region::new(&img, 3, 2, 4, 4);
        assert_eq!(region.width(), 4);
        assert_eq!(region.height(), 4);
        assert_eq!(region.pixel_at(0, 0), [3, 2, 7]);
        assert_eq!(region.pixel_at(3, 3), [6, 5, 7]);
    }

    #[test]
    fn region_clips_to_parent() {
        let img = gradient(10, 8);
        let region = Region::new(&img, 7, 6, 5, 5);
        assert_eq!((region.width(), region.height()), (3, 2));
        assert_eq!((region.x(), region.y()), (7, 6));
    }

    #[test]
    fn region_outside_parent_is_empty() {
        let img = gradient(10, 8);
        let region = Region::new(&img, 10, 0, 3, 3);
        assert!(region.is_empty());
        assert_eq!(region.area(), 0.0);
    }

    #[test]
    fn nested_regions_compose_offsets() {
        let img = gradient(20, 20);
        let outer = Region::new(&img, 5, 5, 10, 10);
        let inner = Region::new(&outer, 2, 3, 4, 4);
        assert_eq!(inner.pixel_at(0, 0), [7, 8, 7]);
    }

    #[test]
    fn mock_records_filters_in_order() {
        let backend = MockBackend::new();
        let img = gradient(4, 4);

        let edges = backend.edge_detect(&img).unwrap();
        let gray = backend.grayscale(&edges).unwrap();
        backend.black_threshold(&gray, 16).unwrap();

        assert_eq!(
            backend.get_operations(),
            vec![
                RecordedOp::EdgeDetect,
                RecordedOp::Grayscale,
                RecordedOp::BlackThreshold(16),
            ]
        );
    }

    #[test]
    fn mock_crop_returns_requested_box() {
        let backend = MockBackend::new();
        let cropped = backend.crop(&gradient(10, 10), 2, 3, 5, 4).unwrap();
        assert_eq!(cropped.dimensions(), (5, 4));
        assert_eq!(cropped.get_pixel(0, 0).0, [2, 3, 7]);
    }

    #[test]
    fn mock_decode_without_images_errors() {
        let backend = MockBackend::new();
        assert!(backend.decode(&[1, 2, 3]).is_err());
    }
}
