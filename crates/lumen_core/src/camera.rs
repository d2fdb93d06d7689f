//! Camera configuration.

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

/// Pinhole camera parameters.
///
/// Angles are in radians. When `look_at` is set the Euler angles are
/// replaced by the orientation that faces that point, with zero roll.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub position: DVec3,

    #[serde(default)]
    pub roll: f64,
    #[serde(default)]
    pub pitch: f64,
    #[serde(default)]
    pub yaw: f64,

    #[serde(default)]
    pub look_at: Option<DVec3>,

    /// Focal length in pixels; defaults to the image height
    #[serde(default)]
    pub focal_length: Option<f64>,

    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: f64,

    pub width: u32,
    pub height: u32,

    /// Principal point in pixels; defaults to the image centre
    #[serde(default)]
    pub centre: Option<DVec2>,
}

fn default_aspect_ratio() -> f64 {
    1.0
}

impl CameraConfig {
    /// A camera at the origin looking down +Z with default intrinsics.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: DVec3::ZERO,
            roll: 0.0,
            pitch: 0.0,
            yaw: 0.0,
            look_at: None,
            focal_length: None,
            aspect_ratio: default_aspect_ratio(),
            width,
            height,
            centre: None,
        }
    }

    /// Set the camera position.
    pub fn with_position(mut self, position: DVec3) -> Self {
        self.position = position;
        self
    }

    /// Aim the camera at a point.
    pub fn with_look_at(mut self, target: DVec3) -> Self {
        self.look_at = Some(target);
        self
    }

    /// Set the Euler angles (radians).
    pub fn with_angles(mut self, roll: f64, pitch: f64, yaw: f64) -> Self {
        self.roll = roll;
        self.pitch = pitch;
        self.yaw = yaw;
        self
    }

    /// Change the image resolution, keeping default intrinsics default.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Focal length in pixels.
    pub fn resolved_focal_length(&self) -> f64 {
        self.focal_length.unwrap_or(self.height as f64)
    }

    /// Principal point in pixels.
    pub fn resolved_centre(&self) -> DVec2 {
        self.centre
            .unwrap_or_else(|| DVec2::new(self.width as f64 / 2.0, self.height as f64 / 2.0))
    }
}
