//! Sphere primitive for ray tracing.

use std::f64::consts::PI;
use std::sync::Arc;

use crate::{
    hit::{Hit, Hittable},
    GeometryError, Material, Ray,
};
use lumen_math::{Aabb, DVec3, Interval};

/// A sphere primitive.
#[derive(Clone)]
pub struct Sphere {
    centre: DVec3,
    radius: f64,
    material: Arc<Material>,
    bbox: Aabb,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(centre: DVec3, radius: f64, material: Arc<Material>) -> Result<Self, GeometryError> {
        if !(radius.is_finite() && radius > 0.0) || !centre.is_finite() {
            return Err(GeometryError::InvalidSphere { radius });
        }

        let rvec = DVec3::splat(radius);
        let bbox = Aabb::from_points(centre - rvec, centre + rvec);

        Ok(Self {
            centre,
            radius,
            material,
            bbox,
        })
    }

    pub fn centre(&self) -> DVec3 {
        self.centre
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }

    /// Get the UV coordinates for a point on the unit sphere.
    fn sphere_uv(p: DVec3) -> (f64, f64) {
        // theta: angle down from +Y, phi: angle around Y from +X
        let theta = (-p.y).clamp(-1.0, 1.0).acos();
        let phi = (-p.z).atan2(p.x) + PI;

        (phi / (2.0 * PI), theta / PI)
    }
}

impl Hittable for Sphere {
    /// Solves `a t^2 + 2 half_b t + c = 0` and keeps the nearer root that
    /// falls inside `ray_t`.
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<Hit<'_>> {
        let oc = ray.origin() - self.centre;
        let a = ray.direction().length_squared();
        let half_b = oc.dot(ray.direction());
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = half_b * half_b - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        let mut root = (-half_b - sqrtd) / a;
        if !ray_t.contains(root) {
            root = (-half_b + sqrtd) / a;
            if !ray_t.contains(root) {
                return None;
            }
        }

        let outward_normal = (ray.at(root) - self.centre) / self.radius;
        let (u, v) = Self::sphere_uv(outward_normal);
        Some(Hit::new(ray, root, outward_normal, &self.material).with_uv(u, v))
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, Lambertian};

    fn white() -> Arc<Material> {
        Arc::new(Lambertian::new(Color::ONE).into())
    }

    #[test]
    fn test_sphere_hit() {
        let sphere = Sphere::new(DVec3::new(0.0, 0.0, -1.0), 0.5, white()).unwrap();

        let ray = Ray::new(DVec3::ZERO, DVec3::new(0.0, 0.0, -1.0));
        let hit = sphere.intersect(&ray, Interval::new(0.001, f64::INFINITY)).unwrap();

        assert!((hit.t - 0.5).abs() < 1e-12);
        assert!(hit.front_face);
        assert_eq!(hit.normal, DVec3::Z);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = Sphere::new(DVec3::new(0.0, 0.0, -1.0), 0.5, white()).unwrap();

        // Ray pointing away from sphere
        let ray = Ray::new(DVec3::ZERO, DVec3::Y);
        assert!(sphere.intersect(&ray, Interval::new(0.001, f64::INFINITY)).is_none());
    }

    #[test]
    fn test_nearer_root_is_chosen() {
        let sphere = Sphere::new(DVec3::new(0.0, 0.0, 5.0), 1.0, white()).unwrap();
        let ray = Ray::new(DVec3::ZERO, DVec3::Z);

        let hit = sphere.intersect(&ray, Interval::new(0.0, 100.0)).unwrap();
        assert!((hit.t - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_far_root_when_near_root_out_of_range() {
        // Ray starting inside the sphere only reaches the far wall
        let sphere = Sphere::new(DVec3::ZERO, 1.0, white()).unwrap();
        let ray = Ray::new(DVec3::ZERO, DVec3::Z);

        let hit = sphere.intersect(&ray, Interval::new(1e-3, 1e12)).unwrap();
        assert!((hit.t - 1.0).abs() < 1e-12);
        assert!(!hit.front_face);
        assert_eq!(hit.normal, -DVec3::Z);
    }

    #[test]
    fn test_no_root_in_range() {
        let sphere = Sphere::new(DVec3::new(0.0, 0.0, 5.0), 1.0, white()).unwrap();
        let ray = Ray::new(DVec3::ZERO, DVec3::Z);

        assert!(sphere.intersect(&ray, Interval::new(0.0, 3.9)).is_none());
        assert!(sphere.intersect(&ray, Interval::new(6.1, 10.0)).is_none());
        // Range endpoints are inclusive
        assert!(sphere.intersect(&ray, Interval::new(0.0, 4.0)).is_some());
    }

    #[test]
    fn test_cornell_sphere_scenario() {
        let centre = DVec3::new(0.4, 0.6, -0.2);
        let sphere = Sphere::new(centre, 0.4, white()).unwrap();
        let origin = DVec3::new(0.0, 0.0, -3.0);
        let ray = Ray::new(origin, centre - origin);

        let hit = sphere.intersect(&ray, Interval::new(1e-3, 1e12)).unwrap();

        // The ray passes through the centre, so it enters one radius early
        let length = (centre - origin).length();
        let expected = origin + (centre - origin) * (1.0 - 0.4 / length);

        assert!(hit.t > 0.0);
        assert!((hit.p - expected).length() < 1e-6);
        assert!(((hit.p - centre).length() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_bounding_box() {
        let sphere = Sphere::new(DVec3::new(1.0, 2.0, 3.0), 0.5, white()).unwrap();
        let bbox = sphere.bounding_box();

        assert_eq!(bbox.min(), DVec3::new(0.5, 1.5, 2.5));
        assert_eq!(bbox.max(), DVec3::new(1.5, 2.5, 3.5));
    }

    #[test]
    fn test_invalid_radius() {
        assert!(matches!(
            Sphere::new(DVec3::ZERO, 0.0, white()),
            Err(GeometryError::InvalidSphere { .. })
        ));
        assert!(Sphere::new(DVec3::ZERO, f64::NAN, white()).is_err());
    }
}
