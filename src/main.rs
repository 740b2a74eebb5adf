use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::ThreadPoolBuilder;
use tracing::{error, info, instrument};

mod canvas;
mod error;
mod export;
mod font;
mod frame;
mod generate;
mod log;

use crate::canvas::ChannelOrder;
use crate::export::write_manifest;
use crate::font::{FontSet, FontSource};
use crate::frame::{FRAME_COUNT, RAW_FRAME_LEN};
use crate::generate::{generate_all, verify_all, GenerateConfig};
use crate::log::init_logger;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// folder to write frames to
    #[arg(short, long, default_value_t = String::from("."))]
    output_dir: String,

    /// TrueType font used for the labels
    #[arg(short, long, default_value_t = String::from("DejaVuSansMono.ttf"))]
    font: String,

    /// use the built-in bitmap font instead of a font file
    #[arg(long)]
    builtin_font: bool,

    /// number of frames to generate
    #[arg(short = 'n', long, default_value_t = FRAME_COUNT)]
    frames: u32,

    /// byte order of the raw dumps
    #[arg(short, long, value_enum, default_value_t = RawOrder::Rgb)]
    channel_order: RawOrder,

    /// number of worker threads, 0 for one per core
    #[arg(short, long, default_value_t = 0)]
    workers: usize,

    /// re-read every frame after writing and check png and raw agree
    #[arg(long)]
    verify: bool,

    /// write a json manifest of the generated files
    #[arg(long)]
    manifest: Option<String>,

    /// log level
    #[arg(long, default_value_t = String::from("info"))]
    log_level: String,

    /// log file
    #[arg(long)]
    log_file: Option<String>,
}

/// Byte order of each pixel in the raw dumps
#[derive(ValueEnum, Debug, Clone, Copy)]
#[value(rename_all = "kebab-case")]
enum RawOrder {
    /// R, G, B
    Rgb,

    /// B, G, R
    Bgr,
}

impl From<RawOrder> for ChannelOrder {
    fn from(order: RawOrder) -> Self {
        match order {
            RawOrder::Rgb => ChannelOrder::Rgb,
            RawOrder::Bgr => ChannelOrder::Bgr,
        }
    }
}

fn main() -> Result<()> {
    let args: Args = Args::parse();

    let guard = init_logger(args.log_level.clone(), args.log_file.clone())?;

    let result = run(args);
    if let Err(e) = &result {
        error!("{:#}", e);
    }

    drop(guard);
    result
}

#[instrument(skip_all)]
fn run(args: Args) -> Result<()> {
    let start = Instant::now();

    let source = if args.builtin_font {
        FontSource::Builtin
    } else {
        FontSource::TrueType(PathBuf::from(&args.font))
    };
    let fonts = FontSet::load(&source).context("Failed to load fonts")?;
    info!("Fonts loaded from {:?}", source);

    ThreadPoolBuilder::new()
        .num_threads(args.workers)
        .build_global()
        .context("Failed to build worker pool")?;

    let config = GenerateConfig {
        output_dir: PathBuf::from(&args.output_dir),
        frames: args.frames,
        channel_order: args.channel_order.into(),
    };

    let pb = ProgressBar::new(config.frames as u64);
    pb.set_style(ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
    )?);

    let outputs = generate_all(&config, &fonts, &pb)?;
    pb.finish_and_clear();
    info!(
        "Wrote {} frames ({} bytes raw each) to {}",
        outputs.len(),
        RAW_FRAME_LEN,
        config.output_dir.display()
    );

    if args.verify {
        verify_all(&outputs, config.channel_order)?;
        info!("Verified {} frames", outputs.len());
    }

    if let Some(manifest) = &args.manifest {
        write_manifest(Path::new(manifest), &outputs)?;
        info!("Manifest written to {}", manifest);
    }

    let duration = start.elapsed();
    info!("Time elapsed: {:?}", duration);
    Ok(())
}
