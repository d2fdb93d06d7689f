//! Keyboard camera controls.

use std::f64::consts::PI;

use lumen_renderer::{Camera, DVec3};

use crate::display::{Key, ScreenEvent};

/// Rotation per key press, in radians.
pub const TURN_STEP: f64 = PI / 18.0;

/// Translation per key press, in world units.
pub const MOVE_STEP: f64 = 0.1;

/// Apply input to the camera between frames.
///
/// Returns `false` when the user asked to quit.
pub fn process_events(events: &[ScreenEvent], camera: &mut Camera, home: DVec3) -> bool {
    for event in events {
        let key = match event {
            ScreenEvent::Quit | ScreenEvent::KeyDown(Key::Escape) => return false,
            ScreenEvent::KeyDown(key) => *key,
        };

        match key {
            Key::Up => camera.update_pitch(-TURN_STEP),
            Key::Down => camera.update_pitch(TURN_STEP),
            Key::Left => camera.update_yaw(TURN_STEP),
            Key::Right => camera.update_yaw(-TURN_STEP),
            Key::Q => camera.update_roll(-TURN_STEP),
            Key::E => camera.update_roll(TURN_STEP),
            Key::R => camera.look_at(DVec3::ZERO),
            Key::T => {
                camera.set_position(home);
                camera.look_at(DVec3::ZERO);
            }
            Key::W => camera.translate(camera.up() * MOVE_STEP),
            Key::S => camera.translate(-camera.up() * MOVE_STEP),
            Key::A => camera.translate(-camera.right() * MOVE_STEP),
            Key::D => camera.translate(camera.right() * MOVE_STEP),
            Key::Plus => camera.translate(camera.forward() * MOVE_STEP),
            Key::Minus => camera.translate(-camera.forward() * MOVE_STEP),
            Key::Escape => return false,
        }
    }

    true
}
