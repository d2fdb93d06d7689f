use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use lumen_core::RenderSettings;

/// Log levels accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "lumen")]
#[command(about = "An offline Monte Carlo path tracer")]
pub struct Args {
    /// Scene description (JSON); the built-in Cornell box when omitted
    #[arg(long)]
    pub scene: Option<PathBuf>,

    /// Image width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Image height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Camera rays per pixel
    #[arg(long, short = 's')]
    pub samples: Option<u32>,

    /// Maximum bounces per path
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Row slices per frame; may not exceed the hardware thread count
    #[arg(long)]
    pub slices: Option<u32>,

    /// Worker threads in the pool
    #[arg(long)]
    pub threads: Option<usize>,

    /// Seed for the per-pixel random streams
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of frames to render
    #[arg(long, default_value = "1")]
    pub frames: u32,

    /// Yaw added to the camera between frames, in radians
    #[arg(long, default_value = "0.0", allow_negative_numbers = true)]
    pub yaw_step: f64,

    /// Scan every primitive per ray instead of building a BVH
    #[arg(long)]
    pub no_bvh: bool,

    /// Bitmap written after the last frame
    #[arg(short, long, default_value = "lumen.bmp")]
    pub output: PathBuf,

    /// Logging level
    #[arg(long, default_value = "info")]
    pub log_level: LogLevel,
}

/// Default resolution of the built-in scene.
pub const DEFAULT_WIDTH: u32 = 640;
pub const DEFAULT_HEIGHT: u32 = 480;

impl Args {
    /// Apply command-line overrides on top of `base`.
    pub fn render_settings(&self, base: RenderSettings) -> RenderSettings {
        RenderSettings {
            samples_per_pixel: self.samples.unwrap_or(base.samples_per_pixel),
            max_depth: self.max_depth.unwrap_or(base.max_depth),
            num_slices: self.slices.unwrap_or(base.num_slices),
            threads: self.threads.unwrap_or(base.threads),
            seed: self.seed.unwrap_or(base.seed),
            accelerate: base.accelerate && !self.no_bvh,
        }
    }
}
