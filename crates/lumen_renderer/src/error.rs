//! Error types for scene setup and rendering.

use lumen_math::DVec3;
use thiserror::Error;

/// Invalid geometry found while building primitives.
///
/// These abort scene setup: they indicate a broken model, not a ray that
/// happens to miss.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Degenerate triangle ({v0}, {v1}, {v2}): its normal cannot be resolved")]
    DegenerateTriangle { v0: DVec3, v1: DVec3, v2: DVec3 },

    #[error("Invalid sphere radius: {radius}")]
    InvalidSphere { radius: f64 },
}

/// Errors that can occur while setting up or running a render.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid geometry: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Invalid scene or settings: {0}")]
    Settings(#[from] lumen_core::LoadError),

    #[error("{slices} slices requested but only {available} hardware threads are available")]
    TooManySlices { slices: u32, available: usize },

    #[error("Cannot split {height} rows into {slices} slices")]
    InvalidSliceCount { slices: u32, height: u32 },

    #[error("Thread pool needs at least one worker")]
    ZeroThreads,

    #[error("Failed to spawn worker thread: {0}")]
    ThreadSpawn(#[from] std::io::Error),

    #[error("{count} slice task(s) panicked; the frame is incomplete")]
    SliceFailed { count: usize },

    #[error("Image output error: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;
