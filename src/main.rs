use clap::{ArgAction, Parser, Subcommand};
use croppoint::estimate::{self, Strategy};
use croppoint::imaging::{ImageBackend, RustBackend, TargetSize};
use croppoint::process::{self, CropJob, ProcessEvent};
use croppoint::{config, output};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Shared flags for commands that pick a crop.
#[derive(clap::Args, Clone)]
struct CropArgs {
    /// Crop box as WIDTHxHEIGHT, e.g. 400x300
    #[arg(long, short)]
    size: TargetSize,

    /// Crop strategy (overrides config)
    #[arg(long, value_enum)]
    strategy: Option<Strategy>,

    /// Seed for the balanced sampler (overrides config)
    #[arg(long)]
    seed: Option<u64>,
}

impl CropArgs {
    /// Load the config file and layer these flags on top.
    fn resolve(
        &self,
        config_path: Option<&Path>,
        no_resize: bool,
    ) -> Result<config::CropConfig, config::ConfigError> {
        let mut config = config::load_config(config_path)?;
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if no_resize {
            config.resize = false;
        }
        Ok(config)
    }
}

#[derive(Parser)]
#[command(name = "croppoint")]
#[command(about = "Content-aware crop-point estimation for images")]
#[command(long_about = "\
Content-aware crop-point estimation for images

Given an image and a crop box, croppoint picks the top-left corner that keeps
the most interesting part of the picture.

Strategies:
  entropy    Shave off the edge slice with less detail until the box fits
  balanced   Center on the weighted energy centroid of the four quadrants
  center     Plain geometric center

Both content-aware strategies analyze an edge-detected copy of the image, so
busy, detailed regions win over flat sky or studio backdrops.

Run 'croppoint gen-config' to generate a documented croppoint.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./croppoint.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log more (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the crop point for an image
    Estimate {
        image: PathBuf,
        #[command(flatten)]
        crop: CropArgs,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Crop an image and save the result
    Crop {
        image: PathBuf,
        output: PathBuf,
        #[command(flatten)]
        crop: CropArgs,
        /// Crop the original size instead of scaling to cover the box first
        #[arg(long)]
        no_resize: bool,
    },
    /// Crop every image under a directory, in parallel
    Batch {
        input: PathBuf,
        output: PathBuf,
        #[command(flatten)]
        crop: CropArgs,
        /// Crop the original sizes instead of scaling to cover the box first
        #[arg(long)]
        no_resize: bool,
    },
    /// Print a stock croppoint.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.as_deref();

    match cli.command {
        Command::Estimate { image, crop, json } => {
            // Estimation always runs on the original size
            let job = CropJob::from_config(&crop.resolve(config_path, true)?, crop.size);
            let backend = RustBackend::new();
            let original = backend.open(&image)?;
            let offset = estimate::estimate_offset(
                &backend,
                &original,
                job.target,
                job.strategy,
                &job.params,
                &mut job.rng_for(0),
            )?;
            let report = output::EstimateReport::new(
                &image,
                (original.width(), original.height()),
                job.target,
                job.strategy,
                offset,
            );
            if json {
                println!("{}", output::format_estimate_json(&report)?);
            } else {
                output::print_estimate(&report);
            }
        }
        Command::Crop {
            image,
            output: destination,
            crop,
            no_resize,
        } => {
            let job = CropJob::from_config(&crop.resolve(config_path, no_resize)?, crop.size);
            let backend = RustBackend::new();
            let cropped =
                process::crop_file(&backend, &image, &destination, &job, &mut job.rng_for(0))?;
            output::print_crop_output(&cropped, job.target);
        }
        Command::Batch {
            input,
            output: destination,
            crop,
            no_resize,
        } => {
            let config = crop.resolve(config_path, no_resize)?;
            init_thread_pool(&config.processing);
            let job = CropJob::from_config(&config, crop.size);
            let (target, strategy) = (job.target, job.strategy);
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    if let ProcessEvent::BatchStarted { total } = event {
                        println!("{}", output::format_batch_header(total, target, strategy));
                    }
                    for line in output::format_process_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = process::process_batch(&input, &destination, &job, Some(tx));
            printer.join().map_err(|_| "output thread panicked")?;
            let result = result?;
            output::print_batch_summary(&result);
            if !result.failed.is_empty() {
                let failed = result.failed.len();
                return Err(format!("{failed} of the images could not be cropped").into());
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores: user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
