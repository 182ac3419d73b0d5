//! Phototree - headless demo
//!
//! Grows a tree from the given image files, runs a few animation frames
//! against a logging renderer, and prints the final tree stats as JSON.
//!
//! Usage:
//!     phototree [OPTIONS] [IMAGES]...

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use phototree::core::config::GalleryConfig;
use phototree::core::error::Error;
use phototree::core::logging;
use phototree::gallery::{Gallery, IncomingFile, LoggingPresenter, SurfaceInfo};
use phototree::scene::LoggingRenderer;

#[derive(Debug, Parser)]
#[command(name = "phototree", version, about = "Grow a 3D tree from your photos")]
struct Args {
    /// Image files to upload, in order
    images: Vec<PathBuf>,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for leaf placement (overrides the config)
    #[arg(long)]
    seed: Option<u64>,

    /// Animation frames to run after uploading
    #[arg(short, long, default_value_t = 60)]
    frames: u32,

    /// Surface size as WIDTHxHEIGHT
    #[arg(long, default_value = "1280x720", value_parser = parse_surface)]
    surface: SurfaceInfo,

    /// Use basic drag/zoom controls instead of orbit controls
    #[arg(long)]
    basic_controls: bool,
}

fn parse_surface(s: &str) -> Result<SurfaceInfo, String> {
    let (w, h) = s
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let width = w.parse().map_err(|e| format!("bad width '{w}': {e}"))?;
    let height = h.parse().map_err(|e| format!("bad height '{h}': {e}"))?;
    Ok(SurfaceInfo::new(width, height))
}

fn run(args: Args) -> phototree::core::Result<()> {
    let mut config = match &args.config {
        Some(path) => GalleryConfig::load(path)?,
        None => GalleryConfig::default(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let mut gallery = Gallery::new(config, Some(args.surface), !args.basic_controls, LoggingPresenter)?;
    let mut renderer = LoggingRenderer::default();

    let mut files = Vec::with_capacity(args.images.len());
    for path in &args.images {
        match gallery.runtime().block_on(IncomingFile::from_path(path)) {
            Ok(file) => files.push(file),
            Err(e) => log::warn!("Could not read {}: {}", path.display(), e),
        }
    }

    let report = gallery.ingest_now(files);
    log::info!(
        "Uploaded {} photos ({} skipped, {} failed)",
        report.accepted.len(),
        report.skipped.len(),
        report.failed.len()
    );
    for (name, reason) in &report.failed {
        log::warn!("  {}: {}", name, reason);
    }

    gallery.wait_for_textures();
    for _ in 0..args.frames {
        gallery.frame(&mut renderer);
    }
    log::info!("Rendered {} frames", renderer.frames);

    println!("{}", serde_json::to_string_pretty(&gallery.stats())?);
    Ok(())
}

fn main() -> ExitCode {
    logging::init();
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::Initialization(message)) => {
            eprintln!("Could not start the gallery: {message}");
            eprintln!("Please try again, or run on a machine with 3D graphics support.");
            ExitCode::FAILURE
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
