//! Single-file and batch cropping.
//!
//! Ties the estimator to the filesystem: open a source image, resize it to
//! cover the crop box (unless disabled), pick the crop point, crop, and save.
//!
//! ## Batch Layout
//!
//! Batch mode walks the input directory recursively and mirrors its layout
//! under the output directory, keeping file names and formats:
//!
//! ```text
//! photos/                      cropped/
//! ├── dawn.jpg          →      ├── dawn.jpg
//! └── travel/                  └── travel/
//!     └── rome.png      →          └── rome.png
//! ```
//!
//! ## Parallel Processing
//!
//! Images are processed in parallel using [rayon](https://docs.rs/rayon).
//! Each image gets its own RNG; with a configured seed, image `i` (in sorted
//! path order) is seeded with `seed + i`, so a batch is reproducible no matter
//! how the work is scheduled. A failing image is reported and skipped; the
//! rest of the batch carries on.

use crate::config::CropConfig;
use crate::estimate::{CropPoint, EstimateError, EstimateParams, Strategy};
use crate::imaging::{
    BackendError, ImageBackend, Quality, RustBackend, TargetSize, crop_to_target,
    is_supported_image,
};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{info, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image processing failed: {0}")]
    Imaging(#[from] BackendError),
    #[error("Crop estimation failed: {0}")]
    Estimate(#[from] EstimateError),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Input directory not found: {0}")]
    InputNotFound(PathBuf),
}

/// Everything needed to crop one image.
#[derive(Debug, Clone)]
pub struct CropJob {
    pub target: TargetSize,
    pub strategy: Strategy,
    pub params: EstimateParams,
    pub resize: bool,
    pub quality: Quality,
    pub seed: Option<u64>,
}

impl CropJob {
    /// Build a job from config values and a crop box.
    pub fn from_config(config: &CropConfig, target: TargetSize) -> Self {
        Self {
            target,
            strategy: config.strategy,
            params: config.estimate_params(),
            resize: config.resize,
            quality: config.quality(),
            seed: config.seed,
        }
    }

    /// RNG for the image at `index` in a batch. Unseeded jobs draw from
    /// OS entropy.
    pub fn rng_for(&self, index: usize) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
            None => StdRng::from_entropy(),
        }
    }
}

/// A successfully cropped image.
#[derive(Debug, Clone)]
pub struct CroppedImage {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Dimensions the crop point was estimated on.
    pub analyzed: (u32, u32),
    pub offset: CropPoint,
}

/// An image the batch had to skip.
#[derive(Debug, Clone)]
pub struct FailedImage {
    pub source: PathBuf,
    pub error: String,
}

/// Progress events emitted during a batch run.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    BatchStarted { total: usize },
    ImageCropped { index: usize, image: CroppedImage },
    ImageFailed { index: usize, image: FailedImage },
}

/// Outcome of a batch run, in input order.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub cropped: Vec<CroppedImage>,
    pub failed: Vec<FailedImage>,
}

/// Open `source`, crop it per `job`, and save the result to `output`.
pub fn crop_file<B: ImageBackend, R: Rng>(
    backend: &B,
    source: &Path,
    output: &Path,
    job: &CropJob,
    rng: &mut R,
) -> Result<CroppedImage, ProcessError> {
    let image = backend.open(source)?;
    let outcome = crop_to_target(
        backend,
        &image,
        job.target,
        job.strategy,
        &job.params,
        job.resize,
        rng,
    )?;

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    backend.save(&outcome.image, output, job.quality)?;

    Ok(CroppedImage {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        analyzed: outcome.analyzed,
        offset: outcome.offset,
    })
}

/// Supported images under `input_dir`, sorted by path.
///
/// Anything inside `skip` (typically the output directory) is ignored, so
/// cropping into a subdirectory of the input doesn't feed on itself.
/// Directories are compared by canonical path, so a relative input and an
/// absolute output still match.
pub fn find_images(input_dir: &Path, skip: Option<&Path>) -> Result<Vec<PathBuf>, ProcessError> {
    if !input_dir.is_dir() {
        return Err(ProcessError::InputNotFound(input_dir.to_path_buf()));
    }

    // A skip directory that doesn't exist yet holds no images
    let skip = skip.and_then(|dir| dir.canonicalize().ok());

    let mut images = Vec::new();
    let walker = WalkDir::new(input_dir)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| match &skip {
            Some(skip) if entry.file_type().is_dir() => {
                !entry.path().canonicalize().is_ok_and(|dir| &dir == skip)
            }
            _ => true,
        });
    for entry in walker {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type().is_file() && is_supported_image(path) {
            images.push(path.to_path_buf());
        }
    }
    images.sort();
    Ok(images)
}

/// Where `source` lands under `output_dir`, mirroring its place under
/// `input_dir`.
pub fn output_path_for(input_dir: &Path, output_dir: &Path, source: &Path) -> PathBuf {
    match source.strip_prefix(input_dir) {
        Ok(relative) => output_dir.join(relative),
        Err(_) => output_dir.join(source.file_name().unwrap_or(source.as_os_str())),
    }
}

/// Crop every supported image under `input_dir` with the pure Rust backend.
pub fn process_batch(
    input_dir: &Path,
    output_dir: &Path,
    job: &CropJob,
    events: Option<Sender<ProcessEvent>>,
) -> Result<BatchResult, ProcessError> {
    let backend = RustBackend::new();
    process_batch_with_backend(&backend, input_dir, output_dir, job, events)
}

/// Batch cropping with a specific backend (allows testing with mock).
pub fn process_batch_with_backend(
    backend: &impl ImageBackend,
    input_dir: &Path,
    output_dir: &Path,
    job: &CropJob,
    events: Option<Sender<ProcessEvent>>,
) -> Result<BatchResult, ProcessError> {
    let sources = find_images(input_dir, Some(output_dir))?;
    std::fs::create_dir_all(output_dir)?;

    info!(
        total = sources.len(),
        size = %job.target,
        strategy = %job.strategy,
        "starting batch"
    );
    if let Some(tx) = &events {
        tx.send(ProcessEvent::BatchStarted {
            total: sources.len(),
        })
        .ok();
    }

    let outcomes: Vec<Result<CroppedImage, FailedImage>> = sources
        .par_iter()
        .enumerate()
        .map(|(index, source)| {
            let output = output_path_for(input_dir, output_dir, source);
            let mut rng = job.rng_for(index);
            let outcome = crop_file(backend, source, &output, job, &mut rng).map_err(|e| {
                warn!(source = %source.display(), error = %e, "skipping image");
                FailedImage {
                    source: source.clone(),
                    error: e.to_string(),
                }
            });

            if let Some(tx) = &events {
                let event = match &outcome {
                    Ok(image) => ProcessEvent::ImageCropped {
                        index,
                        image: image.clone(),
                    },
                    Err(image) => ProcessEvent::ImageFailed {
                        index,
                        image: image.clone(),
                    },
                };
                tx.send(event).ok();
            }
            outcome
        })
        .collect();

    let mut result = BatchResult::default();
    for outcome in outcomes {
        match outcome {
            Ok(image) => result.cropped.push(image),
            Err(image) => result.failed.push(image),
        }
    }
    info!(
        cropped = result.cropped.len(),
        failed = result.failed.len(),
        "batch finished"
    );
    Ok(result)
}
