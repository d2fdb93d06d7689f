//! Closed set of renderable shapes.

use std::sync::Arc;

use lumen_core::ShapeDesc;
use lumen_math::{Aabb, Interval};

use crate::{
    hit::{Hit, Hittable},
    GeometryError, Material, Ray, Sphere, Triangle,
};

/// A shape in the scene.
///
/// Dispatch is a plain `match`, so scene storage is one flat array with no
/// per-primitive boxing.
#[derive(Clone)]
pub enum Primitive {
    Sphere(Sphere),
    Triangle(Triangle),
}

impl Primitive {
    /// Build a primitive from its description.
    pub fn from_shape(shape: &ShapeDesc, material: Arc<Material>) -> Result<Self, GeometryError> {
        Ok(match *shape {
            ShapeDesc::Sphere { centre, radius } => Sphere::new(centre, radius, material)?.into(),
            ShapeDesc::Triangle { v0, v1, v2 } => Triangle::new(v0, v1, v2, material)?.into(),
        })
    }

    pub fn material(&self) -> &Arc<Material> {
        match self {
            Primitive::Sphere(s) => s.material(),
            Primitive::Triangle(t) => t.material(),
        }
    }
}

impl From<Sphere> for Primitive {
    fn from(s: Sphere) -> Self {
        Primitive::Sphere(s)
    }
}

impl From<Triangle> for Primitive {
    fn from(t: Triangle) -> Self {
        Primitive::Triangle(t)
    }
}

impl Hittable for Primitive {
    #[inline]
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<Hit<'_>> {
        match self {
            Primitive::Sphere(s) => s.intersect(ray, ray_t),
            Primitive::Triangle(t) => t.intersect(ray, ray_t),
        }
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            Primitive::Sphere(s) => s.bounding_box(),
            Primitive::Triangle(t) => t.bounding_box(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, Lambertian};
    use lumen_math::DVec3;

    #[test]
    fn test_from_shape() {
        let material: Arc<Material> = Arc::new(Lambertian::new(Color::ONE).into());

        let sphere = ShapeDesc::Sphere {
            centre: DVec3::ZERO,
            radius: 1.0,
        };
        let prim = Primitive::from_shape(&sphere, material.clone()).unwrap();
        assert!(matches!(prim, Primitive::Sphere(_)));
        assert!(Arc::ptr_eq(prim.material(), &material));

        let degenerate = ShapeDesc::Triangle {
            v0: DVec3::ZERO,
            v1: DVec3::X,
            v2: DVec3::X,
        };
        assert!(Primitive::from_shape(&degenerate, material).is_err());
    }

    #[test]
    fn test_dispatch_matches_variant() {
        let material: Arc<Material> = Arc::new(Lambertian::new(Color::ONE).into());
        let sphere = Sphere::new(DVec3::new(0.0, 0.0, 3.0), 1.0, material).unwrap();
        let prim = Primitive::from(sphere.clone());
        let ray = Ray::new(DVec3::ZERO, DVec3::Z);

        let a = prim.intersect(&ray, Interval::UNIVERSE).map(|h| h.t);
        let b = sphere.intersect(&ray, Interval::UNIVERSE).map(|h| h.t);
        assert_eq!(a, b);
        assert_eq!(prim.bounding_box(), sphere.bounding_box());
    }
}
