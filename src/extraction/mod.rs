//! Brightness extraction.
//!
//! Reduces the ROI to a coarse block matrix and compares it with the two
//! previous matrices to derive one brightness sample per frame, driven by
//! the cells that actually change.

mod downsample;
mod temporal;

pub use downsample::{downsample, DownsampledMatrix, BLOCK_SIZE};
pub use temporal::{
    BrightnessSample, FrameRing, StaticSceneFallback, TemporalChangeDetector,
    DEFAULT_CHANGE_THRESHOLD, RING_DEPTH,
};

use crate::capture::DetectorConfig;

impl TemporalChangeDetector {
    /// Creates a detector from the pipeline configuration.
    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::new(config.change_threshold, config.static_fallback)
    }
}
