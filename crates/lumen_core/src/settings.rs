//! Render settings.

use serde::{Deserialize, Serialize};

use crate::loader::{LoadError, LoadResult};

/// Quality and parallelism settings for a render.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Camera rays averaged per pixel; more than one enables sub-pixel jitter
    pub samples_per_pixel: u32,
    /// Maximum number of bounces per path
    pub max_depth: u32,
    /// Number of row bands the image is split into, one task each
    pub num_slices: u32,
    /// Worker threads in the pool
    pub threads: usize,
    /// Base seed for the per-pixel random streams
    pub seed: u64,
    /// Build a BVH instead of scanning every primitive per ray
    pub accelerate: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            samples_per_pixel: 1,
            max_depth: 50,
            num_slices: 4,
            threads: 4,
            seed: 0,
            accelerate: true,
        }
    }
}

impl RenderSettings {
    /// Reject settings that cannot produce an image.
    pub fn validate(&self) -> LoadResult<()> {
        if self.samples_per_pixel == 0 {
            return Err(LoadError::InvalidSettings(
                "samples_per_pixel must be at least 1".into(),
            ));
        }
        if self.num_slices == 0 {
            return Err(LoadError::InvalidSettings(
                "num_slices must be at least 1".into(),
            ));
        }
        if self.threads == 0 {
            return Err(LoadError::InvalidSettings("threads must be at least 1".into()));
        }
        Ok(())
    }
}
