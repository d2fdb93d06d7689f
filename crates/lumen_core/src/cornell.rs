//! Built-in Cornell box scene.

use glam::{DVec3, Vec3};

use crate::camera::CameraConfig;
use crate::scene::{MaterialDesc, ObjectDesc, SceneDescription};

/// Side length of the classic Cornell box, in its published units.
const BOX_SIZE: f64 = 555.0;

/// Map a point from Cornell box units into the [-1, 1] cube, flipping x and y.
fn to_unit_cube(p: DVec3) -> DVec3 {
    let scaled = p * (2.0 / BOX_SIZE) - DVec3::ONE;
    DVec3::new(-scaled.x, -scaled.y, scaled.z)
}

impl SceneDescription {
    /// The Cornell box room with one diffuse sphere, scaled to fill the
    /// volume -1 <= x, y, z <= +1.
    ///
    /// The camera sits at (0, 0, -3) looking at the origin with a focal
    /// length equal to the image height. The front of the box is open.
    pub fn cornell_box(width: u32, height: u32) -> Self {
        let camera = CameraConfig::new(width, height)
            .with_position(DVec3::new(0.0, 0.0, -3.0))
            .with_look_at(DVec3::ZERO);

        let mut scene = SceneDescription::new("cornell box", camera);

        let lambertian = |r, g, b| MaterialDesc::Lambertian {
            albedo: Vec3::new(r, g, b),
        };
        let red = scene.add_material("red", lambertian(0.75, 0.15, 0.15));
        let green = scene.add_material("green", lambertian(0.15, 0.75, 0.15));
        let purple = scene.add_material("purple", lambertian(0.75, 0.15, 0.75));
        let white = scene.add_material("white", lambertian(0.75, 0.75, 0.75));

        scene.add_object(ObjectDesc::sphere(DVec3::new(0.4, 0.6, -0.2), 0.4, &purple));

        let l = BOX_SIZE;
        let a = DVec3::new(l, 0.0, 0.0);
        let b = DVec3::new(0.0, 0.0, 0.0);
        let c = DVec3::new(l, 0.0, l);
        let d = DVec3::new(0.0, 0.0, l);

        let e = DVec3::new(l, l, 0.0);
        let f = DVec3::new(0.0, l, 0.0);
        let g = DVec3::new(l, l, l);
        let h = DVec3::new(0.0, l, l);

        let walls = [
            // Floor
            (c, b, a, &white),
            (c, d, b, &white),
            // Left wall
            (a, e, c, &green),
            (c, e, g, &green),
            // Right wall
            (f, b, d, &red),
            (h, f, d, &red),
            // Ceiling
            (e, f, g, &white),
            (f, h, g, &white),
            // Back wall
            (g, d, c, &white),
            (g, h, d, &white),
        ];

        for (v0, v1, v2, material) in walls {
            scene.add_object(ObjectDesc::triangle(
                to_unit_cube(v0),
                to_unit_cube(v1),
                to_unit_cube(v2),
                material,
            ));
        }

        scene
    }
}
