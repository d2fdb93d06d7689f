//! Pinhole camera driven by Euler angles.
//!
//! Image coordinates have x to the right and y downward; the camera's
//! up vector is therefore the negated second column of its rotation.

use lumen_core::CameraConfig;
use lumen_math::{DMat3, DMat4, DVec2, DVec3, DVec4};

use crate::Ray;

/// Pinhole camera.
///
/// The rotation matrix is rebuilt from `(roll, pitch, yaw)` after every
/// orientation change.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: DVec3,
    roll: f64,
    pitch: f64,
    yaw: f64,
    /// Focal length in pixels
    focal_length: f64,
    aspect_ratio: f64,
    width: u32,
    height: u32,
    /// Principal point in pixels
    centre: DVec2,
    rotation: DMat3,
}

impl Camera {
    /// Create a camera. Angles are in radians.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        position: DVec3,
        roll: f64,
        pitch: f64,
        yaw: f64,
        focal_length: f64,
        aspect_ratio: f64,
        width: u32,
        height: u32,
        centre: DVec2,
    ) -> Self {
        let mut camera = Self {
            position,
            roll,
            pitch,
            yaw,
            focal_length,
            aspect_ratio,
            width,
            height,
            centre,
            rotation: DMat3::IDENTITY,
        };
        camera.update_rotation();
        camera
    }

    /// Create a camera from its configuration, aiming it when `look_at` is set.
    pub fn from_config(config: &CameraConfig) -> Self {
        let mut camera = Self::new(
            config.position,
            config.roll,
            config.pitch,
            config.yaw,
            config.resolved_focal_length(),
            config.aspect_ratio,
            config.width,
            config.height,
            config.resolved_centre(),
        );
        if let Some(target) = config.look_at {
            camera.look_at(target);
        }
        camera
    }

    fn update_rotation(&mut self) {
        self.rotation = DMat3::from_rotation_z(self.roll)
            * DMat3::from_rotation_y(self.yaw)
            * DMat3::from_rotation_x(self.pitch);
    }

    /// World-space direction through `pixel`, not normalised.
    #[inline]
    pub fn direction_from_pixel_unnormalised(&self, pixel: DVec2) -> DVec3 {
        self.rotation
            * DVec3::new(
                pixel.x - self.centre.x,
                pixel.y - self.centre.y,
                self.focal_length,
            )
    }

    /// Unit world-space direction through `pixel`.
    #[inline]
    pub fn direction_from_pixel(&self, pixel: DVec2) -> DVec3 {
        self.direction_from_pixel_unnormalised(pixel).normalize()
    }

    /// Primary ray through `pixel`, starting at the camera position.
    #[inline]
    pub fn ray_through(&self, pixel: DVec2) -> Ray {
        Ray::new(self.position, self.direction_from_pixel_unnormalised(pixel))
    }

    pub fn update_pitch(&mut self, delta: f64) {
        self.pitch += delta;
        self.update_rotation();
    }

    pub fn update_yaw(&mut self, delta: f64) {
        self.yaw += delta;
        self.update_rotation();
    }

    pub fn update_roll(&mut self, delta: f64) {
        self.roll += delta;
        self.update_rotation();
    }

    /// Point the camera at `target`, resetting roll to zero.
    ///
    /// Leaves the orientation unchanged if `target` is the camera position.
    pub fn look_at(&mut self, target: DVec3) {
        let Some(forward) = (target - self.position).try_normalize() else {
            log::warn!("look_at target {target} coincides with the camera position; ignored");
            return;
        };

        self.pitch = (-forward.y).clamp(-1.0, 1.0).asin();
        self.yaw = forward.x.atan2(forward.z);
        self.roll = 0.0;
        self.update_rotation();
    }

    pub fn translate(&mut self, delta: DVec3) {
        self.position += delta;
    }

    pub fn set_position(&mut self, position: DVec3) {
        self.position = position;
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    /// `(roll, pitch, yaw)` in radians.
    pub fn angles(&self) -> (f64, f64, f64) {
        (self.roll, self.pitch, self.yaw)
    }

    pub fn rotation(&self) -> DMat3 {
        self.rotation
    }

    pub fn right(&self) -> DVec3 {
        self.rotation.x_axis
    }

    pub fn up(&self) -> DVec3 {
        -self.rotation.y_axis
    }

    pub fn forward(&self) -> DVec3 {
        self.rotation.z_axis
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn focal_length(&self) -> f64 {
        self.focal_length
    }

    pub fn centre(&self) -> DVec2 {
        self.centre
    }

    /// True if `p` lies inside the image rectangle.
    pub fn in_image(&self, p: DVec2) -> bool {
        p.x >= 0.0 && p.x < self.width as f64 && p.y >= 0.0 && p.y < self.height as f64
    }

    /// Intrinsics times world-to-camera extrinsics.
    ///
    /// Only the top three rows are meaningful; the last row is `(0, 0, 0, 1)`.
    pub fn projection_matrix(&self) -> DMat4 {
        let f = self.focal_length;
        let intrinsics = DMat4::from_cols(
            DVec4::new(f, 0.0, 0.0, 0.0),
            DVec4::new(0.0, f * self.aspect_ratio, 0.0, 0.0),
            DVec4::new(self.centre.x, self.centre.y, 1.0, 0.0),
            DVec4::W,
        );

        let world_to_camera = self.rotation.transpose();
        let extrinsics = DMat4::from_cols(
            world_to_camera.x_axis.extend(0.0),
            world_to_camera.y_axis.extend(0.0),
            world_to_camera.z_axis.extend(0.0),
            (-(world_to_camera * self.position)).extend(1.0),
        );

        intrinsics * extrinsics
    }

    /// Pixel coordinates of a world-space point.
    ///
    /// Points behind the camera project through the pinhole and come out
    /// mirrored; callers should check depth themselves if that matters.
    pub fn project(&self, point: DVec3) -> DVec2 {
        let h = self.projection_matrix() * point.extend(1.0);
        DVec2::new(h.x / h.z, h.y / h.z)
    }
}
