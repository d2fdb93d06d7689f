//! Lumen Renderer - CPU path tracing
//!
//! A Monte Carlo path tracer over spheres and triangles with diffuse,
//! metallic and glass materials. Frames are split into row slices and
//! rendered on a fixed thread pool into a shared framebuffer.

mod bvh;
mod camera;
mod error;
mod framebuffer;
mod hit;
mod latch;
mod material;
mod primitive;
mod renderer;
mod scene;
mod slice;
mod sphere;
mod thread_pool;
mod triangle;

pub mod integrator;

pub use bvh::{Bvh, BvhStats};
pub use camera::Camera;
pub use error::{GeometryError, RenderError, RenderResult};
pub use framebuffer::{pack_argb, unpack_rgb, Framebuffer, ALPHA};
pub use hit::{Hit, Hittable};
pub use integrator::{ray_colour, render, render_pixel};
pub use latch::Latch;
pub use material::{Color, Dielectric, Lambertian, Material, Metal, ScatterResult};
pub use primitive::Primitive;
pub use renderer::{FrameState, ParallelRenderer};
pub use scene::Scene;
pub use slice::{generate_slices, render_slice, Slice};
pub use sphere::Sphere;
pub use thread_pool::{Job, ThreadPool};
pub use triangle::Triangle;

/// Re-export the math types used throughout the public API
pub use lumen_math::{Aabb, DVec2, DVec3, Interval, Ray, Vec3};
