//! Lumen Core - scene description and configuration.
//!
//! This crate provides the renderer-agnostic inputs of a render:
//!
//! - **Scene description**: `SceneDescription`, named materials and shapes
//! - **Camera configuration**: `CameraConfig`
//! - **Render settings**: `RenderSettings`
//! - **Loading**: JSON scene files and the built-in Cornell box
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::SceneDescription;
//!
//! let scene = SceneDescription::load("scenes/cornell.json")?;
//! println!("Loaded {} objects, {} materials",
//!     scene.object_count(),
//!     scene.material_count());
//! ```

pub mod camera;
pub mod cornell;
pub mod loader;
pub mod scene;
pub mod settings;

// Re-export commonly used types
pub use camera::CameraConfig;
pub use loader::{LoadError, LoadResult};
pub use scene::{MaterialDesc, NamedMaterial, ObjectDesc, SceneDescription, ShapeDesc};
pub use settings::RenderSettings;
