use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use lumen_core::SceneDescription;
use lumen_renderer::{Camera, ParallelRenderer, Scene};

mod cli;
mod controls;
mod display;

use cli::{Args, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use controls::process_events;
use display::Screen;

/// Load the requested scene, or the Cornell box, at the requested size.
fn load_description(args: &Args) -> Result<SceneDescription> {
    let mut desc = match &args.scene {
        Some(path) => SceneDescription::load(path)
            .with_context(|| format!("Failed to load scene {}", path.display()))?,
        None => SceneDescription::cornell_box(
            args.width.unwrap_or(DEFAULT_WIDTH),
            args.height.unwrap_or(DEFAULT_HEIGHT),
        ),
    };

    let width = args.width.unwrap_or(desc.camera.width);
    let height = args.height.unwrap_or(desc.camera.height);
    desc.camera = desc.camera.clone().with_resolution(width, height);

    desc.render = Some(args.render_settings(desc.render_settings()));
    Ok(desc)
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.into())
        .init();

    log::info!("Starting Lumen");

    let desc = load_description(&args)?;
    let settings = desc.render_settings();
    let hardware_threads = thread::available_parallelism().map_or(1, |n| n.get());

    let scene = Scene::from_description(&desc).context("Failed to build scene")?;
    let mut camera = Camera::from_config(&desc.camera);
    let home = camera.position();

    log::info!(
        "Rendering '{}' at {}x{}: {} spp, depth {}, {} slices on {} threads",
        desc.name,
        camera.width(),
        camera.height(),
        settings.samples_per_pixel,
        settings.max_depth,
        settings.num_slices,
        settings.threads
    );

    let mut renderer = ParallelRenderer::new(Arc::new(scene), settings, hardware_threads)
        .context("Failed to start renderer")?;
    let mut screen = Screen::create(camera.width(), camera.height(), "Lumen", false);

    for frame in 0..args.frames {
        let framebuffer = renderer
            .render_frame(&camera)
            .with_context(|| format!("Frame {frame} failed"))?;
        screen.present_framebuffer(framebuffer);

        let events = screen.render();
        if !process_events(&events, &mut camera, home) {
            log::info!("Quit requested after frame {frame}");
            break;
        }

        if args.yaw_step != 0.0 {
            camera.update_yaw(args.yaw_step);
        }
    }

    screen
        .save_image(&args.output)
        .with_context(|| format!("Failed to save {}", args.output.display()))?;

    Ok(())
}
