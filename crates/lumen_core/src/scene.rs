//! Scene description types for Lumen.
//!
//! A scene is an ordered list of shapes, each naming one of a set of shared
//! materials, plus the camera and (optionally) the render settings it was
//! authored with. The renderer turns this into its own primitive and
//! material types; nothing here knows how to intersect a ray.

use glam::{DVec3, Vec3};
use serde::{Deserialize, Serialize};

use crate::camera::CameraConfig;
use crate::settings::RenderSettings;

/// Surface response of a material.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaterialDesc {
    /// Ideal diffuse reflector.
    Lambertian { albedo: Vec3 },

    /// Specular reflector; `fuzz` of 0 is a perfect mirror, clamped to [0, 1].
    Metal { albedo: Vec3, fuzz: f64 },

    /// Clear refractive material such as glass (ior 1.5) or water (1.33).
    Dielectric { ior: f64 },
}

/// A material with the name objects use to refer to it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamedMaterial {
    pub name: String,

    #[serde(flatten)]
    pub material: MaterialDesc,
}

impl NamedMaterial {
    pub fn new(name: impl Into<String>, material: MaterialDesc) -> Self {
        Self {
            name: name.into(),
            material,
        }
    }
}

/// Geometric shape of an object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeDesc {
    Sphere { centre: DVec3, radius: f64 },
    Triangle { v0: DVec3, v1: DVec3, v2: DVec3 },
}

/// A shape bound to a named material.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectDesc {
    #[serde(flatten)]
    pub shape: ShapeDesc,

    /// Name of an entry in `SceneDescription::materials`
    pub material: String,
}

impl ObjectDesc {
    pub fn sphere(centre: DVec3, radius: f64, material: impl Into<String>) -> Self {
        Self {
            shape: ShapeDesc::Sphere { centre, radius },
            material: material.into(),
        }
    }

    pub fn triangle(v0: DVec3, v1: DVec3, v2: DVec3, material: impl Into<String>) -> Self {
        Self {
            shape: ShapeDesc::Triangle { v0, v1, v2 },
            material: material.into(),
        }
    }
}

/// A complete, renderer-agnostic scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    /// Scene name (usually from filename)
    #[serde(default)]
    pub name: String,

    pub camera: CameraConfig,

    /// Materials shared by the objects that name them
    pub materials: Vec<NamedMaterial>,

    /// Objects in the order they are added to the scene
    pub objects: Vec<ObjectDesc>,

    /// Settings the scene was authored with; command-line values override these
    #[serde(default)]
    pub render: Option<RenderSettings>,
}

impl SceneDescription {
    /// Create an empty scene.
    pub fn new(name: impl Into<String>, camera: CameraConfig) -> Self {
        Self {
            name: name.into(),
            camera,
            materials: Vec::new(),
            objects: Vec::new(),
            render: None,
        }
    }

    /// Add a material and return its name for use by objects.
    pub fn add_material(&mut self, name: impl Into<String>, material: MaterialDesc) -> String {
        let material = NamedMaterial::new(name, material);
        let name = material.name.clone();
        self.materials.push(material);
        name
    }

    /// Add an object.
    pub fn add_object(&mut self, object: ObjectDesc) {
        self.objects.push(object);
    }

    /// Look up a material by name.
    pub fn material(&self, name: &str) -> Option<&MaterialDesc> {
        self.materials
            .iter()
            .find(|m| m.name == name)
            .map(|m| &m.material)
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Render settings from the file, or defaults.
    pub fn render_settings(&self) -> RenderSettings {
        self.render.clone().unwrap_or_default()
    }
}
