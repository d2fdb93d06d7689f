//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use std::sync::Arc;

use crate::{
    hit::{Hit, Hittable},
    GeometryError, Material, Ray,
};
use lumen_math::{Aabb, DVec3, Interval};

/// Determinant magnitude below which a ray counts as parallel to the plane.
const PARALLEL_EPSILON: f64 = 1e-12;

/// A triangle primitive.
#[derive(Clone)]
pub struct Triangle {
    v0: DVec3,
    /// Pre-computed edges v1 - v0 and v2 - v0
    edge1: DVec3,
    edge2: DVec3,
    /// Pre-computed face normal (unit length)
    normal: DVec3,
    material: Arc<Material>,
    bbox: Aabb,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    ///
    /// Fails when the vertices are collinear or not finite, since such a
    /// triangle has no plane to intersect.
    pub fn new(
        v0: DVec3,
        v1: DVec3,
        v2: DVec3,
        material: Arc<Material>,
    ) -> Result<Self, GeometryError> {
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        let normal = edge1
            .cross(edge2)
            .try_normalize()
            .ok_or(GeometryError::DegenerateTriangle { v0, v1, v2 })?;

        let bbox = Aabb::enclosing(&[v0, v1, v2]);

        Ok(Self {
            v0,
            edge1,
            edge2,
            normal,
            material,
            bbox,
        })
    }

    /// The three vertices in construction order.
    pub fn vertices(&self) -> [DVec3; 3] {
        [self.v0, self.v0 + self.edge1, self.v0 + self.edge2]
    }

    /// Unit face normal, following the winding of the vertices.
    pub fn normal(&self) -> DVec3 {
        self.normal
    }

    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }
}

impl Hittable for Triangle {
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<Hit<'_>> {
        let h = ray.direction().cross(self.edge2);
        let det = self.edge1.dot(h);

        // Ray is parallel to triangle
        if det.abs() < PARALLEL_EPSILON {
            return None;
        }

        let f = 1.0 / det;
        let s = ray.origin() - self.v0;
        let u = f * s.dot(h);

        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(self.edge1);
        let v = f * ray.direction().dot(q);

        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * self.edge2.dot(q);
        if !ray_t.contains(t) {
            return None;
        }

        Some(Hit::new(ray, t, self.normal, &self.material).with_uv(u, v))
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
