//! Shared frame storage written disjointly by slice tasks.

use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

use image::{ImageFormat, RgbImage};

use crate::{Color, RenderResult};

/// Alpha stored in every packed cell.
pub const ALPHA: u32 = 128;

/// Pack a colour in [0, 1]³ into a 32-bit ARGB cell.
///
/// Each channel becomes `round(clamp(255 * c, 0, 255))`; NaN packs as zero.
#[inline]
pub fn pack_argb(colour: Color) -> u32 {
    let channel = |c: f32| (255.0 * c).clamp(0.0, 255.0).round() as u32;
    (ALPHA << 24) | (channel(colour.x) << 16) | (channel(colour.y) << 8) | channel(colour.z)
}

/// Split a packed cell into `[r, g, b]`.
#[inline]
pub fn unpack_rgb(argb: u32) -> [u8; 3] {
    [(argb >> 16) as u8, (argb >> 8) as u8, argb as u8]
}

/// A width × height grid of packed ARGB cells.
///
/// Cells are atomics so that several threads can fill disjoint rows through
/// a shared reference. Stores are relaxed; the frame's completion latch
/// publishes them to the reader.
pub struct Framebuffer {
    width: u32,
    height: u32,
    cells: Box<[AtomicU32]>,
}

impl Framebuffer {
    /// Create a framebuffer with every cell zero.
    pub fn new(width: u32, height: u32) -> Self {
        let cells = (0..width as usize * height as usize)
            .map(|_| AtomicU32::new(0))
            .collect();
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    /// Write a pixel. Writes outside the image are dropped.
    pub fn put_pixel(&self, x: u32, y: u32, colour: Color) {
        match self.index(x, y) {
            Some(i) => self.cells[i].store(pack_argb(colour), Ordering::Relaxed),
            None => log::warn!(
                "Dropped pixel write at ({x}, {y}) outside {}x{} framebuffer",
                self.width,
                self.height
            ),
        }
    }

    /// Packed cell at `(x, y)`, or `None` outside the image.
    pub fn get(&self, x: u32, y: u32) -> Option<u32> {
        self.index(x, y)
            .map(|i| self.cells[i].load(Ordering::Relaxed))
    }

    /// Copy of every cell in row-major order.
    pub fn to_argb(&self) -> Vec<u32> {
        self.cells.iter().map(|c| c.load(Ordering::Relaxed)).collect()
    }

    /// Convert to an 8-bit RGB image, dropping alpha.
    pub fn to_rgb_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| {
            image::Rgb(unpack_rgb(self.get(x, y).unwrap_or(0)))
        })
    }

    /// Save as an uncompressed 24-bit bitmap.
    pub fn save_image(&self, path: impl AsRef<Path>) -> RenderResult<()> {
        let path = path.as_ref();
        self.to_rgb_image().save_with_format(path, ImageFormat::Bmp)?;
        log::info!("Saved {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}

impl std::fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Framebuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}
