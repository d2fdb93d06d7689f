//! Frame driver: slices dispatched to the pool, then one barrier wait.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use lumen_core::RenderSettings;

use crate::{
    generate_slices, render_slice, Camera, Framebuffer, Latch, RenderError, RenderResult, Scene,
    Slice, ThreadPool,
};

/// Where the most recent frame got to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameState {
    /// No frame started, or the last one failed before dispatch
    #[default]
    Idle,
    /// Slice tasks queued
    Dispatched,
    /// Driving thread blocked on the completion latch
    BarrierWait,
    /// Every slice finished; the framebuffer is complete
    Complete,
}

/// Counts a slice down on the latch however its task exits.
struct SliceCompletion {
    latch: Arc<Latch>,
    failures: Arc<AtomicUsize>,
}

impl Drop for SliceCompletion {
    fn drop(&mut self) {
        if thread::panicking() {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
        self.latch.count_down();
    }
}

/// Renders frames by splitting rows across a long-lived thread pool.
pub struct ParallelRenderer {
    scene: Arc<Scene>,
    settings: Arc<RenderSettings>,
    pool: ThreadPool,
    state: FrameState,
}

impl ParallelRenderer {
    /// Create a renderer and its worker pool.
    ///
    /// Fails if the settings are invalid or ask for more slices than
    /// `hardware_threads`.
    pub fn new(
        scene: Arc<Scene>,
        settings: RenderSettings,
        hardware_threads: usize,
    ) -> RenderResult<Self> {
        settings.validate()?;

        if settings.num_slices as usize > hardware_threads {
            return Err(RenderError::TooManySlices {
                slices: settings.num_slices,
                available: hardware_threads,
            });
        }

        let pool = ThreadPool::new(settings.threads)?;

        Ok(Self {
            scene,
            settings: Arc::new(settings),
            pool,
            state: FrameState::Idle,
        })
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn scene(&self) -> &Arc<Scene> {
        &self.scene
    }

    /// State reached by the most recent frame.
    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Render one frame and return it once every slice has finished.
    ///
    /// The camera is snapshotted for the frame; the `&mut self` receiver
    /// keeps frames from overlapping.
    pub fn render_frame(&mut self, camera: &Camera) -> RenderResult<Arc<Framebuffer>> {
        self.state = FrameState::Idle;
        let start = Instant::now();

        let slices = generate_slices(camera.height(), self.settings.num_slices)?;
        let framebuffer = Arc::new(Framebuffer::new(camera.width(), camera.height()));

        let scene = Arc::clone(&self.scene);
        let settings = Arc::clone(&self.settings);
        let target = Arc::clone(&framebuffer);
        let camera = camera.clone();
        self.run_slices(slices, move |slice| {
            render_slice(slice, &camera, scene.as_ref(), &settings, &target);
        })?;

        log::info!(
            "Frame {}x{} rendered in {:.2?}",
            framebuffer.width(),
            framebuffer.height(),
            start.elapsed()
        );

        Ok(framebuffer)
    }

    /// Queue `task` once per slice and block until every slice has counted
    /// down, panicking or not.
    fn run_slices<F>(&mut self, slices: Vec<Slice>, task: F) -> RenderResult<()>
    where
        F: Fn(&Slice) + Send + Sync + 'static,
    {
        let count = slices.len();
        let latch = Arc::new(Latch::new(count));
        let failures = Arc::new(AtomicUsize::new(0));
        let task = Arc::new(task);

        for slice in slices {
            let completion = SliceCompletion {
                latch: Arc::clone(&latch),
                failures: Arc::clone(&failures),
            };
            let task = Arc::clone(&task);

            self.pool.execute(move || {
                let _completion = completion;
                log::trace!("Slice {} rows {:?}", slice.index, slice.rows());
                task(&slice);
            });
        }
        self.state = FrameState::Dispatched;
        log::debug!("Dispatched {count} slices");

        self.state = FrameState::BarrierWait;
        latch.wait();

        let failed = failures.load(Ordering::Relaxed);
        if failed > 0 {
            self.state = FrameState::Idle;
            return Err(RenderError::SliceFailed { count: failed });
        }

        self.state = FrameState::Complete;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrator;
    use lumen_core::SceneDescription;

    fn cornell(width: u32, height: u32) -> (Arc<Scene>, Camera) {
        let desc = SceneDescription::cornell_box(width, height);
        let scene = Scene::from_description(&desc).unwrap();
        (Arc::new(scene), Camera::from_config(&desc.camera))
    }

    fn settings(num_slices: u32, threads: usize) -> RenderSettings {
        RenderSettings {
            samples_per_pixel: 1,
            max_depth: 16,
            num_slices,
            threads,
            seed: 0,
            accelerate: true,
        }
    }

    #[test]
    fn test_partition_independent_output() {
        let (scene, camera) = cornell(640, 480);

        let mut one = ParallelRenderer::new(Arc::clone(&scene), settings(1, 1), 8).unwrap();
        let mut eight = ParallelRenderer::new(Arc::clone(&scene), settings(8, 4), 8).unwrap();

        let a = one.render_frame(&camera).unwrap();
        let b = eight.render_frame(&camera).unwrap();

        assert_eq!(one.state(), FrameState::Complete);
        assert_eq!(eight.state(), FrameState::Complete);
        assert!(a.to_argb() == b.to_argb(), "framebuffers differ");
    }

    #[test]
    fn test_matches_single_threaded_render() {
        let (scene, camera) = cornell(96, 64);
        let mut s = settings(4, 3);
        s.samples_per_pixel = 3;

        let mut renderer = ParallelRenderer::new(Arc::clone(&scene), s.clone(), 4).unwrap();
        let parallel = renderer.render_frame(&camera).unwrap();
        let serial = integrator::render(&camera, scene.as_ref(), &s);

        assert_eq!(parallel.to_argb(), serial.to_argb());
    }

    #[test]
    fn test_too_many_slices_is_fatal() {
        let (scene, _) = cornell(64, 48);
        let err = ParallelRenderer::new(scene, settings(9, 2), 8).err().unwrap();
        assert!(matches!(
            err,
            RenderError::TooManySlices {
                slices: 9,
                available: 8
            }
        ));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let (scene, _) = cornell(64, 48);
        let err = ParallelRenderer::new(scene, settings(0, 2), 8).err().unwrap();
        assert!(matches!(err, RenderError::Settings(_)));
    }

    #[test]
    fn test_more_slices_than_rows() {
        let (scene, _) = cornell(4, 3);
        let camera = Camera::from_config(&lumen_core::CameraConfig::new(4, 3));
        let mut renderer = ParallelRenderer::new(scene, settings(4, 2), 8).unwrap();

        let err = renderer.render_frame(&camera).err().unwrap();
        assert!(matches!(err, RenderError::InvalidSliceCount { .. }));
        assert_eq!(renderer.state(), FrameState::Idle);
    }

    #[test]
    fn test_panicking_slice_fails_frame_without_deadlock() {
        let (scene, camera) = cornell(32, 24);
        let mut renderer = ParallelRenderer::new(scene, settings(4, 2), 8).unwrap();
        let slices = generate_slices(24, 4).unwrap();

        let ran = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ran);
        let err = renderer
            .run_slices(slices, move |slice| {
                counter.fetch_add(1, Ordering::SeqCst);
                if slice.index == 2 {
                    panic!("slice {} failed", slice.index);
                }
            })
            .err()
            .unwrap();

        assert!(matches!(err, RenderError::SliceFailed { count: 1 }));
        assert_eq!(ran.load(Ordering::SeqCst), 4);
        assert_eq!(renderer.state(), FrameState::Idle);

        // The pool keeps serving frames afterwards
        let frame = renderer.render_frame(&camera).unwrap();
        assert_eq!(renderer.state(), FrameState::Complete);
        assert_eq!(frame.width(), 32);
    }

    #[test]
    fn test_completion_guard_counts_down_on_panic() {
        let pool = ThreadPool::new(1).unwrap();
        let latch = Arc::new(Latch::new(2));
        let failures = Arc::new(AtomicUsize::new(0));

        for fail in [true, false] {
            let completion = SliceCompletion {
                latch: Arc::clone(&latch),
                failures: Arc::clone(&failures),
            };
            pool.execute(move || {
                let _completion = completion;
                if fail {
                    panic!("slice task failed");
                }
            });
        }

        latch.wait();
        assert_eq!(latch.count(), 0);
        assert_eq!(failures.load(Ordering::Relaxed), 1);

        let (tx, rx) = std::sync::mpsc::channel();
        pool.execute(move || tx.send(7).unwrap());
        assert_eq!(rx.recv().unwrap(), 7);
    }

    #[test]
    fn test_frames_between_camera_moves() {
        let (scene, mut camera) = cornell(32, 24);
        let mut renderer = ParallelRenderer::new(scene, settings(2, 2), 8).unwrap();

        let first = renderer.render_frame(&camera).unwrap();
        camera.update_yaw(0.3);
        let second = renderer.render_frame(&camera).unwrap();

        assert_eq!(renderer.state(), FrameState::Complete);
        assert_ne!(first.to_argb(), second.to_argb());
    }
}
