//! Hittable trait and Hit record for ray-object intersection.

use crate::{Material, Ray};
use lumen_math::{Aabb, DVec3, Interval};

/// Record of a ray-object intersection.
#[derive(Clone, Copy)]
pub struct Hit<'a> {
    /// Parameter t where the intersection occurs
    pub t: f64,
    /// Point of intersection
    pub p: DVec3,
    /// Unit surface normal; opposes the ray once `correct_normal` has run
    pub normal: DVec3,
    /// Whether the ray struck the side the geometric normal points out of
    pub front_face: bool,
    /// Surface coordinates (barycentric for triangles, spherical for spheres)
    pub u: f64,
    pub v: f64,
    /// Material at the intersection point
    pub material: &'a Material,
}

impl<'a> Hit<'a> {
    /// Create a hit with its outward normal already corrected against `ray`.
    pub fn new(ray: &Ray, t: f64, outward_normal: DVec3, material: &'a Material) -> Self {
        let mut hit = Self {
            t,
            p: ray.at(t),
            normal: outward_normal,
            front_face: true,
            u: 0.0,
            v: 0.0,
            material,
        };
        hit.correct_normal(ray.direction());
        hit
    }

    /// Flip the normal so it always points against the incoming ray.
    ///
    /// `front_face` records whether the stored normal already did.
    pub fn correct_normal(&mut self, ray_direction: DVec3) {
        self.front_face = ray_direction.dot(self.normal) < 0.0;
        if !self.front_face {
            self.normal = -self.normal;
        }
    }

    /// Set the surface coordinates.
    pub fn with_uv(mut self, u: f64, v: f64) -> Self {
        self.u = u;
        self.v = v;
        self
    }
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Find the nearest intersection with `ray_t.min <= t <= ray_t.max`.
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<Hit<'_>>;

    /// Get the axis-aligned bounding box of this object.
    fn bounding_box(&self) -> Aabb;
}
