//! Recursive Monte Carlo path integrator.
//!
//! Implements path tracing with:
//! - Recursive ray tracing with a fixed bounce limit
//! - A sky gradient for rays that escape the scene
//! - Optional sub-pixel jitter and gamma correction

use lumen_core::RenderSettings;
use lumen_math::{DVec2, Interval};
use rand::{rngs::StdRng, RngCore, SeedableRng};

use crate::{hit::Hittable, material::gen_f64, Camera, Color, Framebuffer, Ray};

/// Closest distance a scattered ray may travel before it can hit anything,
/// keeping it from re-hitting the surface it left.
pub const T_MIN: f64 = 1e-3;

/// Farthest hit distance considered.
pub const T_MAX: f64 = 1e12;

/// Compute the colour seen by a ray.
///
/// `depth` is the only recursion bound: at zero the path contributes black.
pub fn ray_colour(ray: &Ray, world: &dyn Hittable, depth: u32, rng: &mut dyn RngCore) -> Color {
    if depth == 0 {
        return Color::ZERO;
    }

    let Some(hit) = world.intersect(ray, Interval::new(T_MIN, T_MAX)) else {
        return sky_gradient(ray);
    };

    match hit.material.scatter(ray, &hit, rng) {
        Some(result) => result.attenuation * ray_colour(&result.scattered, world, depth - 1, rng),
        // Absorbed
        None => Color::ZERO,
    }
}

/// White along -y blending to light blue along +y.
///
/// World +y points down the screen, so the blue end of the sky is below the
/// camera and the white end above it.
pub fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize();
    let a = (0.5 * (unit_direction.y + 1.0)) as f32;
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Apply gamma correction (gamma = 2.0) to each channel.
///
/// Negative channels are not clamped and come out as NaN, which the
/// framebuffer packs as zero.
#[inline]
pub fn linear_to_gamma(linear: Color) -> Color {
    Color::new(linear.x.sqrt(), linear.y.sqrt(), linear.z.sqrt())
}

/// Random stream for one pixel.
///
/// Seeded from the frame seed and the pixel coordinates alone, so a pixel's
/// samples do not depend on which thread renders it or in what order.
pub fn pixel_rng(seed: u64, x: u32, y: u32) -> StdRng {
    let key = seed ^ ((y as u64) << 32 | x as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    StdRng::seed_from_u64(splitmix64(key))
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Render a single pixel: the gamma-corrected mean of its samples.
///
/// A single sample goes through the pixel's corner exactly; more samples are
/// jittered uniformly across the pixel.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    x: u32,
    y: u32,
    settings: &RenderSettings,
    rng: &mut dyn RngCore,
) -> Color {
    let samples = settings.samples_per_pixel.max(1);
    let base = DVec2::new(x as f64, y as f64);

    let mut pixel_colour = Color::ZERO;
    for _ in 0..samples {
        let pixel = if samples > 1 {
            base + DVec2::new(gen_f64(rng), gen_f64(rng))
        } else {
            base
        };
        let ray = camera.ray_through(pixel);
        pixel_colour += ray_colour(&ray, world, settings.max_depth, rng);
    }

    linear_to_gamma(pixel_colour / samples as f32)
}

/// Render the whole image on the calling thread.
pub fn render(camera: &Camera, world: &dyn Hittable, settings: &RenderSettings) -> Framebuffer {
    let framebuffer = Framebuffer::new(camera.width(), camera.height());

    for y in 0..camera.height() {
        for x in 0..camera.width() {
            let mut rng = pixel_rng(settings.seed, x, y);
            let colour = render_pixel(camera, world, x, y, settings, &mut rng);
            framebuffer.put_pixel(x, y, colour);
        }
    }

    framebuffer
}
