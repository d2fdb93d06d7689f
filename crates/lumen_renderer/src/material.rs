//! Surface scattering models.

use lumen_core::MaterialDesc;
use lumen_math::{DVec3, Vec3};
use rand::{Rng, RngCore};

use crate::{hit::Hit, Ray};

/// Color type alias (linear RGB, typically 0-1)
pub type Color = Vec3;

/// Outcome of a ray scattering off a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterResult {
    /// Per-channel fraction of the scattered radiance that survives
    pub attenuation: Color,
    /// Continuation ray, starting at the hit point
    pub scattered: Ray,
}

/// Surface materials.
///
/// Materials hold configuration only. All randomness comes from the
/// generator handed to [`Material::scatter`], so one material can be shared
/// by any number of primitives and threads.
#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    Lambertian(Lambertian),
    Metal(Metal),
    Dielectric(Dielectric),
}

impl Material {
    /// Scatter an incoming ray.
    ///
    /// Returns `None` if the ray is absorbed.
    pub fn scatter(&self, ray_in: &Ray, hit: &Hit, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        match self {
            Material::Lambertian(m) => m.scatter(ray_in, hit, rng),
            Material::Metal(m) => m.scatter(ray_in, hit, rng),
            Material::Dielectric(m) => m.scatter(ray_in, hit, rng),
        }
    }
}

impl From<Lambertian> for Material {
    fn from(m: Lambertian) -> Self {
        Material::Lambertian(m)
    }
}

impl From<Metal> for Material {
    fn from(m: Metal) -> Self {
        Material::Metal(m)
    }
}

impl From<Dielectric> for Material {
    fn from(m: Dielectric) -> Self {
        Material::Dielectric(m)
    }
}

impl From<&MaterialDesc> for Material {
    fn from(desc: &MaterialDesc) -> Self {
        match *desc {
            MaterialDesc::Lambertian { albedo } => Lambertian::new(albedo).into(),
            MaterialDesc::Metal { albedo, fuzz } => Metal::new(albedo, fuzz).into(),
            MaterialDesc::Dielectric { ior } => Dielectric::new(ior).into(),
        }
    }
}

/// Lambertian (diffuse) material.
#[derive(Debug, Clone, PartialEq)]
pub struct Lambertian {
    albedo: Color,
}

impl Lambertian {
    /// Create a new Lambertian material with the given albedo color.
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }

    pub fn albedo(&self) -> Color {
        self.albedo
    }

    fn scatter(&self, _ray_in: &Ray, hit: &Hit, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let mut scatter_direction = hit.normal + random_unit_vector(rng);

        // Catch degenerate scatter direction
        if near_zero(scatter_direction) {
            scatter_direction = hit.normal;
        }

        Some(ScatterResult {
            attenuation: self.albedo,
            scattered: Ray::new(hit.p, scatter_direction),
        })
    }
}

/// Metal (specular) material.
#[derive(Debug, Clone, PartialEq)]
pub struct Metal {
    albedo: Color,
    fuzz: f64,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror, 1.0 = very rough
    pub fn new(albedo: Color, fuzz: f64) -> Self {
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    pub fn albedo(&self) -> Color {
        self.albedo
    }

    pub fn fuzz(&self) -> f64 {
        self.fuzz
    }

    fn scatter(&self, ray_in: &Ray, hit: &Hit, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let reflected = reflect(ray_in.direction().normalize(), hit.normal);
        let scattered_dir = reflected + self.fuzz * random_unit_vector(rng);

        // Absorbed if the perturbation pushed the ray below the surface
        if scattered_dir.dot(hit.normal) <= 0.0 {
            return None;
        }

        Some(ScatterResult {
            attenuation: self.albedo,
            scattered: Ray::new(hit.p, scattered_dir),
        })
    }
}

/// Dielectric (glass) material.
///
/// Non-absorbing: the attenuation is always white.
#[derive(Debug, Clone, PartialEq)]
pub struct Dielectric {
    /// Index of refraction
    ior: f64,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(ior: f64) -> Self {
        Self { ior }
    }

    pub fn ior(&self) -> f64 {
        self.ior
    }

    fn scatter(&self, ray_in: &Ray, hit: &Hit, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let refraction_ratio = if hit.front_face { 1.0 / self.ior } else { self.ior };

        let unit_direction = ray_in.direction().normalize();
        let cos_theta = (-unit_direction).dot(hit.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

        // Check for total internal reflection
        let cannot_refract = refraction_ratio * sin_theta > 1.0;

        let direction =
            if cannot_refract || gen_f64(rng) < reflectance(cos_theta, refraction_ratio) {
                reflect(unit_direction, hit.normal)
            } else {
                refract(unit_direction, hit.normal, refraction_ratio)
            };

        Some(ScatterResult {
            attenuation: Color::ONE,
            scattered: Ray::new(hit.p, direction),
        })
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: DVec3, n: DVec3) -> DVec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through a surface using Snell's law.
#[inline]
pub fn refract(uv: DVec3, n: DVec3, etai_over_etat: f64) -> DVec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}

/// Schlick's approximation for reflectance.
#[inline]
pub fn reflectance(cosine: f64, eta_ratio: f64) -> f64 {
    let r0 = ((1.0 - eta_ratio) / (1.0 + eta_ratio)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

/// Uniform draw in [0, 1).
#[inline]
pub fn gen_f64(rng: &mut dyn RngCore) -> f64 {
    rng.gen::<f64>()
}

/// Generate a random unit vector, uniformly distributed on the unit sphere.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> DVec3 {
    // Rejection sampling keeps the distribution uniform
    loop {
        let v = DVec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        let len_sq = v.length_squared();
        if 1e-160 < len_sq && len_sq <= 1.0 {
            return v / len_sq.sqrt();
        }
    }
}

/// True if every component is within 1e-8 of zero.
#[inline]
fn near_zero(v: DVec3) -> bool {
    v.abs().max_element() < 1e-8
}
