//! Prometheus metrics for LED detection.
//!
//! # Metrics Exposed
//!
//! - `led_frames_processed_total` - Frames processed by the detector
//! - `led_frames_rejected_total` - Frames rejected for an invalid ROI or frame
//! - `led_state` - Current LED state (1=on, 0=off)
//! - `led_history_code` - Packed decisions of the last three ring slots
//! - `led_brightness` - Derived brightness of the latest frame
//! - `led_dynamic_min` / `led_dynamic_max` - Brightness history extremes
//! - `led_hue_degrees` - Dominant hue of the ROI
//! - `led_saturation` - Mean saturation of the dominant hue
//! - `led_color_class` - Colour class id
//!
//! # Example
//!
//! ```no_run
//! use led_indicator::metrics::{MetricsRegistry, MetricsSnapshot};
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//! registry.update(&MetricsSnapshot {
//!     frames_processed: 30,
//!     led_on: true,
//!     brightness: Some(212.5),
//!     ..Default::default()
//! });
//! println!("{}", registry.encode().expect("Failed to encode"));
//! ```

mod collector;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
