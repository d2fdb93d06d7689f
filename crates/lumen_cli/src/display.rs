//! Headless display surface for rendered frames.
//!
//! Mirrors a windowed screen's contract (pixels in, input events out) without
//! opening a window: frames are kept in memory, timed and saved to disk.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use lumen_renderer::{Color, Framebuffer, RenderResult};

/// Keys the camera controls respond to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Q,
    E,
    R,
    T,
    W,
    S,
    A,
    D,
    Plus,
    Minus,
    Escape,
}

/// Input collected since the previous `render`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenEvent {
    Quit,
    KeyDown(Key),
}

/// An in-memory screen.
pub struct Screen {
    title: String,
    fullscreen: bool,
    buffer: Arc<Framebuffer>,
    pending: Vec<ScreenEvent>,
    last_present: Instant,
}

impl Screen {
    pub fn create(width: u32, height: u32, title: impl Into<String>, fullscreen: bool) -> Self {
        let title = title.into();
        log::info!(
            "Created {width}x{height} screen '{title}'{}",
            if fullscreen { " (fullscreen)" } else { "" }
        );
        Self {
            title,
            fullscreen,
            buffer: Arc::new(Framebuffer::new(width, height)),
            pending: Vec::new(),
            last_present: Instant::now(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Write one pixel. Coordinates outside the screen are dropped.
    pub fn put_pixel(&self, x: i32, y: i32, colour: Color) {
        match (u32::try_from(x), u32::try_from(y)) {
            (Ok(x), Ok(y)) => self.buffer.put_pixel(x, y, colour),
            _ => log::warn!("Dropped pixel write at ({x}, {y})"),
        }
    }

    /// Show a completed frame.
    pub fn present_framebuffer(&mut self, framebuffer: Arc<Framebuffer>) {
        self.buffer = framebuffer;
    }

    /// Queue input as if it came from the window system.
    pub fn push_event(&mut self, event: ScreenEvent) {
        self.pending.push(event);
    }

    /// Present the current buffer and return the input gathered since the
    /// previous call.
    pub fn render(&mut self) -> Vec<ScreenEvent> {
        let elapsed = self.last_present.elapsed();
        self.last_present = Instant::now();

        let ms = elapsed.as_secs_f64() * 1000.0;
        let fps = if ms > 0.0 { 1000.0 / ms } else { f64::INFINITY };
        log::info!("Render time: {ms:.1} ms. FPS: {fps:.2}");

        std::mem::take(&mut self.pending)
    }

    /// Save the current buffer as a bitmap.
    pub fn save_image(&self, path: impl AsRef<Path>) -> RenderResult<()> {
        self.buffer.save_image(path)
    }

    /// Packed ARGB cell at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        self.buffer.get(x, y)
    }
}
