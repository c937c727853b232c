//! LED Indicator Detection Library
//!
//! Watches a fixed region of interest across successive YUV 4:2:0 camera
//! frames and reports whether an indicator light is lit and which colour
//! it shows, while tolerating ambient brightness drift, sensor noise and
//! flicker.
//!
//! # Architecture
//!
//! ```text
//! planes + ROI → extraction (downsample, temporal change) → analysis (history, state)
//!      ↓                                                            ↓
//!    color (HSV, dominant hue, class) ───────────────────────→ Detection
//! ```
//!
//! # Design Principles
//!
//! - **Explicit state**: every piece of temporal state lives in one
//!   [`LedDetector`]; independent streams use independent detectors
//! - **Validated input**: ROIs and plane strides are checked before any
//!   pixel is read
//! - **Numeric guards**: empty regions yield `0.0`, never NaN
//!
//! # Example
//!
//! ```no_run
//! use led_indicator::{
//!     capture::{FrameSource, SceneConfig, SyntheticLedSource},
//!     DetectorConfig, LedDetector,
//! };
//!
//! let scene = SceneConfig::default();
//! let mut source = SyntheticLedSource::new();
//! source.open(&scene).unwrap();
//!
//! let mut detector = LedDetector::new(DetectorConfig::default());
//! for _ in 0..10 {
//!     let frame = source.capture().unwrap();
//!     let detection = detector.process_frame(&frame.view().unwrap(), &scene.roi).unwrap();
//!     println!("{:?}", detection.to_values());
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod analysis;
pub mod capture;
pub mod color;
pub mod detector;
pub mod extraction;
pub mod metrics;

// Re-export commonly used types at crate root
pub use analysis::{LedHistoryCode, LedState};
pub use capture::{DetectorConfig, Frame, LumaPlane, Roi, RoiError, YuvFrame};
pub use color::{classify_hsv_color, dominant_hue, yuv_to_hsv, ColorClass, DominantHue, Hsv};
pub use detector::{BrightnessReading, Detection, DetectorError, LedDetector};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
