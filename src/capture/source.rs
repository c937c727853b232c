//! Frame sources.
//!
//! The detector only sees plane views, so any capture stack can feed it.
//! This module defines the source abstraction used by the CLI and a
//! synthetic source that renders a blinking LED over a static background.

use super::frame::{chroma_dim, Frame};
use super::SceneConfig;
use crate::color::rgb_to_yuv;
use rand_chacha::ChaCha8Rng;
use rand_core::{RngCore, SeedableRng};
use thiserror::Error;

/// Neutral chroma (no colour).
const NEUTRAL_CHROMA: u8 = 128;

/// Errors that can occur while producing frames.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The scene configuration was rejected.
    #[error("failed to configure source: {0}")]
    ConfigFailed(String),
    /// `capture` was called before `open`.
    #[error("source not initialized")]
    NotInitialized,
}

/// Trait for frame producers.
pub trait FrameSource {
    /// Opens the source for the given scene.
    fn open(&mut self, config: &SceneConfig) -> Result<(), SourceError>;

    /// Produces the next frame.
    fn capture(&mut self) -> Result<Frame, SourceError>;

    fn is_open(&self) -> bool;

    fn close(&mut self);
}

/// Renders an LED that is lit for `on_frames`, dark for `off_frames`,
/// over a flat background with seeded sensor noise.
#[derive(Debug)]
pub struct SyntheticLedSource {
    config: Option<SceneConfig>,
    rng: ChaCha8Rng,
    sequence: u64,
}

impl SyntheticLedSource {
    /// Creates a closed source.
    pub fn new() -> Self {
        Self {
            config: None,
            rng: ChaCha8Rng::seed_from_u64(0),
            sequence: 0,
        }
    }

    /// Whether the LED is lit in the frame with zero-based index `frame`.
    pub fn is_lit(config: &SceneConfig, frame: u64) -> bool {
        let period = config.on_frames as u64 + config.off_frames as u64;
        period != 0 && frame % period < config.on_frames as u64
    }

    fn noisy(&mut self, base: u8, amplitude: u8) -> u8 {
        if amplitude == 0 {
            return base;
        }
        let span = 2 * amplitude as u32 + 1;
        let offset = (self.rng.next_u32() % span) as i32 - amplitude as i32;
        (base as i32 + offset).clamp(0, 255) as u8
    }
}

impl Default for SyntheticLedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for SyntheticLedSource {
    fn open(&mut self, config: &SceneConfig) -> Result<(), SourceError> {
        config
            .validate()
            .map_err(|e| SourceError::ConfigFailed(e.to_string()))?;
        self.rng = ChaCha8Rng::seed_from_u64(config.noise_seed);
        self.config = Some(config.clone());
        self.sequence = 0;
        tracing::info!(
            width = config.width,
            height = config.height,
            led = %config.led,
            "Synthetic LED source opened"
        );
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame, SourceError> {
        let config = self.config.clone().ok_or(SourceError::NotInitialized)?;
        let lit = Self::is_lit(&config, self.sequence);
        let [r, g, b] = config.led_rgb;
        let (led_y, led_u, led_v) = rgb_to_yuv(r, g, b);

        let led_rows = config.led.rows();
        let led_cols = config.led.columns();
        let in_led = |x: usize, y: usize| lit && led_rows.contains(&y) && led_cols.contains(&x);

        let mut luma = Vec::with_capacity(config.width * config.height);
        for y in 0..config.height {
            for x in 0..config.width {
                let base = if in_led(x, y) {
                    led_y
                } else {
                    config.background_luma
                };
                luma.push(self.noisy(base, config.noise_amplitude));
            }
        }

        let chroma_width = chroma_dim(config.width);
        let chroma_len = chroma_width * chroma_dim(config.height);
        let mut u = vec![NEUTRAL_CHROMA; chroma_len];
        let mut v = vec![NEUTRAL_CHROMA; chroma_len];
        if lit {
            for (i, (u, v)) in u.iter_mut().zip(v.iter_mut()).enumerate() {
                if in_led((i % chroma_width) * 2, (i / chroma_width) * 2) {
                    *u = led_u;
                    *v = led_v;
                }
            }
        }

        self.sequence += 1;
        let frame = Frame::new(luma, u, v, config.width, config.height, self.sequence);
        tracing::trace!(sequence = frame.sequence(), lit, "Synthetic frame rendered");
        Ok(frame)
    }

    fn is_open(&self) -> bool {
        self.config.is_some()
    }

    fn close(&mut self) {
        self.config = None;
        tracing::info!("Synthetic LED source closed");
    }
}
