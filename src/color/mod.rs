//! Colour estimation.
//!
//! Converts ROI pixels to HSV, picks the dominant hue and maps it to one
//! of twelve named classes. Stateless: nothing here survives a call.

mod class;
mod histogram;
mod hsv;

pub use class::{classify_hsv_color, ColorClass};
pub use histogram::{dominant_hue, DominantHue, HueHistogram, DEFAULT_MIN_SATURATION, HUE_BINS};
pub use hsv::{rgb_to_hsv, rgb_to_yuv, yuv_to_hsv, yuv_to_rgb, Hsv};
