//! Frame input, regions of interest and configuration.
//!
//! Frames arrive as borrowed plane views so the detector works on the
//! caller's buffers directly. The synthetic source stands in for a camera
//! in the CLI and in tests.

mod config;
mod frame;
mod roi;
mod source;

pub use config::{ConfigError, DetectorConfig, FileConfig, OutputConfig, SceneConfig};
pub use frame::{ChromaPlanes, Frame, FrameError, LumaPlane, YuvFrame};
pub use roi::{ParseRoiError, Roi, RoiError, MAX_ROI_DIM};
pub use source::{FrameSource, SourceError, SyntheticLedSource};
