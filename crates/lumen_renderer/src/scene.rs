//! Scene aggregate: the primitives of a frame and their nearest-hit query.

use std::collections::HashMap;
use std::sync::Arc;

use lumen_core::SceneDescription;
use lumen_math::{Aabb, Interval};

use crate::{
    hit::{Hit, Hittable},
    Bvh, Material, Primitive, Ray, RenderResult,
};

/// An ordered collection of primitives.
///
/// Built single-threaded, then shared read-only between render threads.
#[derive(Clone, Default)]
pub struct Scene {
    primitives: Vec<Primitive>,
    bvh: Option<Bvh>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scene from its description.
    ///
    /// Every object naming the same material shares one material instance.
    /// The BVH is built when `accelerate` is set in the description's render
    /// settings.
    pub fn from_description(desc: &SceneDescription) -> RenderResult<Self> {
        desc.validate()?;

        let materials: HashMap<&str, Arc<Material>> = desc
            .materials
            .iter()
            .map(|m| (m.name.as_str(), Arc::new(Material::from(&m.material))))
            .collect();

        let mut scene = Scene::new();
        for object in &desc.objects {
            // Names resolved by `validate`
            let material = Arc::clone(&materials[object.material.as_str()]);
            scene.add(Primitive::from_shape(&object.shape, material)?);
        }

        if desc.render_settings().accelerate {
            scene.build_bvh();
        }

        log::info!(
            "Built scene '{}': {} primitives, {} materials{}",
            desc.name,
            scene.len(),
            materials.len(),
            if scene.is_accelerated() { ", BVH" } else { "" }
        );

        Ok(scene)
    }

    /// Append a primitive.
    ///
    /// Invalidates any BVH; call [`Scene::build_bvh`] again afterwards.
    pub fn add(&mut self, primitive: impl Into<Primitive>) {
        self.primitives.push(primitive.into());
        self.bvh = None;
    }

    /// Build the acceleration structure over the current primitives.
    pub fn build_bvh(&mut self) {
        self.bvh = Some(Bvh::build(&self.primitives));
    }

    pub fn is_accelerated(&self) -> bool {
        self.bvh.is_some()
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Nearest hit by scanning every primitive.
    ///
    /// On equal `t` the earlier primitive wins.
    pub fn intersect_linear(&self, ray: &Ray, ray_t: Interval) -> Option<Hit<'_>> {
        let mut closest: Option<Hit<'_>> = None;

        for primitive in &self.primitives {
            let range = ray_t.with_max(closest.map_or(ray_t.max, |hit| hit.t));
            if let Some(hit) = primitive.intersect(ray, range) {
                if closest.map_or(true, |c| hit.t < c.t) {
                    closest = Some(hit);
                }
            }
        }

        closest
    }
}

impl Hittable for Scene {
    /// Nearest hit, through the BVH when one is built.
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<Hit<'_>> {
        match &self.bvh {
            Some(bvh) => bvh.intersect(&self.primitives, ray, ray_t),
            None => self.intersect_linear(ray, ray_t),
        }
    }

    fn bounding_box(&self) -> Aabb {
        match &self.bvh {
            Some(bvh) => bvh.bounding_box(),
            None => self
                .primitives
                .iter()
                .fold(Aabb::EMPTY, |acc, p| Aabb::surrounding(&acc, &p.bounding_box())),
        }
    }
}
