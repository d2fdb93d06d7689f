//! Row-band partitioning of the image for parallel rendering.

use lumen_core::RenderSettings;

use crate::integrator::{pixel_rng, render_pixel};
use crate::{hit::Hittable, Camera, Framebuffer, RenderError, RenderResult};

/// A contiguous band of image rows, `y_start..y_end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    /// Index of this slice, top to bottom
    pub index: u32,
    pub y_start: u32,
    pub y_end: u32,
}

impl Slice {
    pub fn rows(&self) -> std::ops::Range<u32> {
        self.y_start..self.y_end
    }

    pub fn row_count(&self) -> u32 {
        self.y_end - self.y_start
    }
}

/// Split `height` rows into `num_slices` disjoint bands covering every row.
///
/// Slice `i` covers rows `[i * height / n, (i + 1) * height / n)`, so band
/// heights differ by at most one row.
pub fn generate_slices(height: u32, num_slices: u32) -> RenderResult<Vec<Slice>> {
    if num_slices == 0 || num_slices > height {
        return Err(RenderError::InvalidSliceCount {
            slices: num_slices,
            height,
        });
    }

    let bound = |i: u32| (i as u64 * height as u64 / num_slices as u64) as u32;
    Ok((0..num_slices)
        .map(|index| Slice {
            index,
            y_start: bound(index),
            y_end: bound(index + 1),
        })
        .collect())
}

/// Render every pixel of `slice` into `framebuffer`.
pub fn render_slice(
    slice: &Slice,
    camera: &Camera,
    world: &dyn Hittable,
    settings: &RenderSettings,
    framebuffer: &Framebuffer,
) {
    for y in slice.rows() {
        for x in 0..camera.width() {
            let mut rng = pixel_rng(settings.seed, x, y);
            let colour = render_pixel(camera, world, x, y, settings, &mut rng);
            framebuffer.put_pixel(x, y, colour);
        }
    }
}
