//! Scene file loading.
//!
//! Scenes are stored as JSON. Loading parses the file and then checks the
//! cross references serde cannot: every object must name a defined material,
//! material names must be unique, and the scene must not be empty.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::scene::SceneDescription;

/// Errors that can occur during scene loading.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Object {index} references unknown material: {name}")]
    UnknownMaterial { index: usize, name: String },

    #[error("Material defined more than once: {0}")]
    DuplicateMaterial(String),

    #[error("Scene contains no objects")]
    EmptyScene,

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

impl SceneDescription {
    /// Load a scene from a JSON file.
    ///
    /// The scene name defaults to the file stem when the file leaves it empty.
    pub fn load(path: impl AsRef<Path>) -> LoadResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let mut scene = Self::from_json_str(&text)?;

        if scene.name.is_empty() {
            scene.name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
        }

        log::info!(
            "Loaded scene '{}' from {}: {} objects, {} materials",
            scene.name,
            path.display(),
            scene.object_count(),
            scene.material_count()
        );
        Ok(scene)
    }

    /// Parse and validate a scene from JSON text.
    pub fn from_json_str(text: &str) -> LoadResult<Self> {
        let scene: SceneDescription = serde_json::from_str(text)?;
        scene.validate()?;
        Ok(scene)
    }

    /// Serialize the scene to pretty-printed JSON.
    pub fn to_json_string(&self) -> LoadResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check material references and render settings.
    pub fn validate(&self) -> LoadResult<()> {
        if self.objects.is_empty() {
            return Err(LoadError::EmptyScene);
        }

        let mut names = HashSet::new();
        for material in &self.materials {
            if !names.insert(material.name.as_str()) {
                return Err(LoadError::DuplicateMaterial(material.name.clone()));
            }
        }

        for (index, object) in self.objects.iter().enumerate() {
            if !names.contains(object.material.as_str()) {
                return Err(LoadError::UnknownMaterial {
                    index,
                    name: object.material.clone(),
                });
            }
        }

        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(LoadError::InvalidSettings(format!(
                "image resolution {}x{} is empty",
                self.camera.width, self.camera.height
            )));
        }

        if let Some(render) = &self.render {
            render.validate()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::MaterialDesc;

    const SCENE: &str = r#"{
        "name": "single sphere",
        "camera": { "position": [0.0, 0.0, -3.0], "look_at": [0.0, 0.0, 0.0], "width": 64, "height": 48 },
        "materials": [
            { "name": "white", "type": "lambertian", "albedo": [0.75, 0.75, 0.75] },
            { "name": "glass", "type": "dielectric", "ior": 1.5 }
        ],
        "objects": [
            { "type": "sphere", "centre": [0.4, 0.6, -0.2], "radius": 0.4, "material": "white" },
            { "type": "triangle", "v0": [-1, -1, 1], "v1": [1, -1, 1], "v2": [0, 1, 1], "material": "glass" }
        ],
        "render": { "samples_per_pixel": 16 }
    }"#;

    #[test]
    fn test_parse_scene() {
        let scene = SceneDescription::from_json_str(SCENE).unwrap();

        assert_eq!(scene.name, "single sphere");
        assert_eq!(scene.object_count(), 2);
        assert_eq!(scene.material_count(), 2);
        assert_eq!(scene.render_settings().samples_per_pixel, 16);
        assert_eq!(scene.render_settings().max_depth, 50);
    }

    #[test]
    fn test_unknown_material() {
        let text = SCENE.replace(r#""material": "glass""#, r#""material": "steel""#);
        let err = SceneDescription::from_json_str(&text).unwrap_err();

        match err {
            LoadError::UnknownMaterial { index, name } => {
                assert_eq!(index, 1);
                assert_eq!(name, "steel");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_material() {
        let text = SCENE.replace(r#""name": "glass""#, r#""name": "white""#);
        let err = SceneDescription::from_json_str(&text).unwrap_err();
        assert!(matches!(err, LoadError::DuplicateMaterial(name) if name == "white"));
    }

    #[test]
    fn test_empty_scene() {
        let text = r#"{
            "camera": { "position": [0, 0, 0], "width": 8, "height": 8 },
            "materials": [],
            "objects": []
        }"#;
        assert!(matches!(
            SceneDescription::from_json_str(text),
            Err(LoadError::EmptyScene)
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            SceneDescription::from_json_str("{ not json"),
            Err(LoadError::Json(_))
        ));
    }

    #[test]
    fn test_invalid_render_block() {
        let text = SCENE.replace(r#""samples_per_pixel": 16"#, r#""num_slices": 0"#);
        assert!(matches!(
            SceneDescription::from_json_str(&text),
            Err(LoadError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_load_from_file_names_scene_after_stem() {
        let text = SCENE.replace(r#""name": "single sphere","#, "");
        let path = std::env::temp_dir().join(format!("lumen_loader_{}.json", std::process::id()));
        fs::write(&path, text).unwrap();

        let scene = SceneDescription::load(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(scene.name, format!("lumen_loader_{}", std::process::id()));
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join("lumen_loader_does_not_exist.json");
        assert!(matches!(SceneDescription::load(path), Err(LoadError::Io(_))));
    }

    #[test]
    fn test_json_round_trip_keeps_scene() {
        let scene = SceneDescription::from_json_str(SCENE).unwrap();
        let text = scene.to_json_string().unwrap();
        assert_eq!(SceneDescription::from_json_str(&text).unwrap(), scene);
    }

    #[test]
    fn test_bundled_scene_is_valid() {
        let scene = SceneDescription::from_json_str(include_str!(
            "../../../scenes/glass_and_metal.json"
        ))
        .unwrap();

        assert_eq!(scene.object_count(), 6);
        assert_eq!(scene.render_settings().samples_per_pixel, 64);
        assert!(matches!(
            scene.material("glass"),
            Some(MaterialDesc::Dielectric { .. })
        ));
    }
}
