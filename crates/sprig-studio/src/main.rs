//! Sprig studio: a small demo scene for the sprite loop.
//!
//! Opens a window by default; `headless` renders a fixed number of frames
//! with scripted timestamps and writes the last one as a PNG.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;

use sprig_engine::host::{self, ScriptedFrames};
use sprig_engine::logging::{LoggingConfig, init_logging};
use sprig_engine::surface::RasterSurface;
use sprig_window::{WindowConfig, WindowRuntime};

mod scene;
mod textures;

#[derive(Parser)]
#[command(name = "sprig-studio")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Surface width in pixels
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Surface height in pixels
    #[arg(long, default_value_t = 360)]
    height: u32,

    /// Extra image file to load in the background and show centered
    #[arg(long)]
    image: Option<PathBuf>,

    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand)]
enum Mode {
    /// Open a window (default)
    Window,

    /// Render without a window and save the final frame
    Headless {
        /// Number of frames to run
        #[arg(short, long, default_value_t = 120)]
        frames: u32,

        /// Simulated frame rate
        #[arg(long, default_value_t = 60)]
        fps: u32,

        /// Output PNG path
        #[arg(short, long, default_value = "sprig-frame.png")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    init_logging(LoggingConfig {
        default_level: level,
        ..LoggingConfig::default()
    });

    let surface = RasterSurface::new(cli.width, cli.height)
        .with_context(|| format!("invalid surface size {}x{}", cli.width, cli.height))?;
    let scheduler = scene::build(surface, cli.image.as_deref());

    match cli.mode.unwrap_or(Mode::Window) {
        Mode::Window => WindowRuntime::run(
            WindowConfig {
                title: "sprig studio".to_string(),
                ..WindowConfig::default()
            },
            scheduler,
        ),
        Mode::Headless { frames, fps, output } => {
            let mut scheduler = scheduler;
            let interval = Duration::from_secs(1) / fps.max(1);
            let mut source = ScriptedFrames::every(interval, frames);

            let ran = host::run(&mut scheduler, &mut source);
            log::info!("rendered {ran} frames headless");

            scheduler
                .surface()
                .save_png(&output)
                .with_context(|| format!("failed to write {}", output.display()))?;
            log::info!("wrote {}", output.display());
            Ok(())
        }
    }
}
