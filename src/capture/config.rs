//! Detector, scene and output configuration.
//!
//! Everything can be loaded from one TOML file with `[detector]`,
//! `[scene]` and `[output]` sections; missing sections take defaults.

use super::roi::{Roi, RoiError};
use crate::color::DEFAULT_MIN_SATURATION;
use crate::extraction::{StaticSceneFallback, DEFAULT_CHANGE_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables of the detection pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Three-frame spread a cell must exceed to count as changing.
    pub change_threshold: u8,
    /// Minimum saturation for a pixel to vote in the hue histogram.
    pub min_saturation: f64,
    /// Brightness reported for a fully static scene.
    pub static_fallback: StaticSceneFallback,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            change_threshold: DEFAULT_CHANGE_THRESHOLD,
            min_saturation: DEFAULT_MIN_SATURATION,
            static_fallback: StaticSceneFallback::Zero,
        }
    }
}

impl DetectorConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.min_saturation) {
            return Err(ConfigError::InvalidSaturation(self.min_saturation));
        }
        Ok(())
    }
}

/// Synthetic scene rendered by [`SyntheticLedSource`](super::SyntheticLedSource).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Frame width in pixels.
    pub width: usize,
    /// Frame height in pixels.
    pub height: usize,
    /// Region watched by the detector.
    pub roi: Roi,
    /// Rectangle lit by the LED.
    pub led: Roi,
    /// LED colour when lit.
    pub led_rgb: [u8; 3],
    /// Luma of the static background.
    pub background_luma: u8,
    /// Frames the LED stays lit per blink period.
    pub on_frames: u32,
    /// Frames the LED stays dark per blink period.
    pub off_frames: u32,
    /// Peak sensor noise added to luma, in code values.
    pub noise_amplitude: u8,
    /// Seed for the noise generator.
    pub noise_seed: u64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            roi: Roi::new(120, 80, 80, 80),
            led: Roi::new(140, 100, 40, 40),
            led_rgb: [0, 220, 40],
            background_luma: 90,
            on_frames: 3,
            off_frames: 3,
            noise_amplitude: 2,
            noise_seed: 0x1ED,
        }
    }
}

impl SceneConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if self.on_frames == 0 && self.off_frames == 0 {
            return Err(ConfigError::InvalidBlinkPeriod);
        }
        self.roi
            .validate(self.width, self.height)
            .map_err(ConfigError::InvalidRoi)?;
        // The LED may be larger than the detector's ROI capacity, only the
        // frame bounds matter for drawing it.
        let fits = |start: usize, len: usize, bound: usize| {
            start.checked_add(len).is_some_and(|end| end <= bound)
        };
        if !fits(self.led.x0, self.led.width, self.width)
            || !fits(self.led.y0, self.led.height, self.height)
        {
            return Err(ConfigError::LedOutsideFrame(self.led));
        }
        Ok(())
    }
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Run continuously (true) or process a fixed number of frames (false).
    pub continuous: bool,
    /// Number of frames to process if not continuous.
    pub frame_count: u32,
    /// Print Prometheus metrics when done.
    pub print_metrics: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            continuous: false,
            frame_count: 30,
            print_metrics: false,
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid frame dimensions")]
    InvalidDimensions,
    #[error("blink period must span at least one frame")]
    InvalidBlinkPeriod,
    #[error("minimum saturation {0} is outside [0, 1]")]
    InvalidSaturation(f64),
    #[error("invalid region of interest: {0}")]
    InvalidRoi(#[source] RoiError),
    #[error("LED rectangle {0} lies outside the frame")]
    LedOutsideFrame(Roi),
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// `[detector]` section.
    #[serde(default)]
    pub detector: DetectorConfig,
    /// `[scene]` section.
    #[serde(default)]
    pub scene: SceneConfig,
    /// `[output]` section.
    #[serde(default)]
    pub output: OutputConfig,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.detector.validate()?;
        self.scene.validate()
    }
}
