//! Metrics collection and registry.

use crate::detector::{DetectorError, Detection};
use prometheus::{Encoder, Gauge, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Registration or encoding failed.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of detector output for a metrics update.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Frames processed so far.
    pub frames_processed: u64,
    /// Frames rejected so far.
    pub frames_rejected: u64,
    /// Whether the LED is currently lit.
    pub led_on: bool,
    /// Latest derived brightness.
    pub brightness: Option<f64>,
    /// Latest history minimum.
    pub dyn_min: Option<f64>,
    /// Latest history maximum.
    pub dyn_max: Option<f64>,
    /// Latest dominant hue.
    pub hue: Option<f64>,
    /// Latest dominant saturation.
    pub saturation: Option<f64>,
    /// Latest colour class id.
    pub color_class: Option<u8>,
    /// Latest packed history code.
    pub history_code: Option<u8>,
}

impl MetricsSnapshot {
    /// Builds a snapshot from the latest detection and running counters.
    pub fn from_detection(detection: &Detection, frames_processed: u64, frames_rejected: u64) -> Self {
        Self {
            frames_processed,
            frames_rejected,
            led_on: detection.led.is_on(),
            brightness: Some(detection.brightness),
            dyn_min: Some(detection.dyn_min),
            dyn_max: Some(detection.dyn_max),
            hue: Some(detection.hue),
            saturation: Some(detection.saturation),
            color_class: Some(detection.color.id()),
            history_code: Some(detection.history_code.packed()),
        }
    }
}

/// Prometheus metrics registry for LED detection.
pub struct MetricsRegistry {
    registry: Registry,

    frames_processed: IntCounter,
    frames_rejected: IntCounter,

    led_state: IntGauge,
    history_code: IntGauge,
    brightness: Gauge,
    dyn_min: Gauge,
    dyn_max: Gauge,

    hue: Gauge,
    saturation: Gauge,
    color_class: IntGauge,
}

impl MetricsRegistry {
    /// Creates a new registry with all detector metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let frames_processed = IntCounter::new(
            "led_frames_processed_total",
            "Total frames processed by the detector",
        )?;
        let frames_rejected = IntCounter::new(
            "led_frames_rejected_total",
            "Total frames rejected for an invalid ROI or frame",
        )?;

        let led_state = IntGauge::new("led_state", "Current LED state (1=on, 0=off)")?;
        let history_code = IntGauge::new(
            "led_history_code",
            "Packed on/off decisions of the last three ring slots",
        )?;
        let brightness = Gauge::new("led_brightness", "Derived ROI brightness of the latest frame")?;
        let dyn_min = Gauge::new("led_dynamic_min", "Smallest brightness in the history")?;
        let dyn_max = Gauge::new("led_dynamic_max", "Largest brightness in the history")?;

        let hue = Gauge::new("led_hue_degrees", "Dominant hue of the ROI in degrees")?;
        let saturation = Gauge::new("led_saturation", "Mean saturation of the dominant hue")?;
        let color_class = IntGauge::new("led_color_class", "Colour class id of the ROI")?;

        registry.register(Box::new(frames_processed.clone()))?;
        registry.register(Box::new(frames_rejected.clone()))?;
        registry.register(Box::new(led_state.clone()))?;
        registry.register(Box::new(history_code.clone()))?;
        registry.register(Box::new(brightness.clone()))?;
        registry.register(Box::new(dyn_min.clone()))?;
        registry.register(Box::new(dyn_max.clone()))?;
        registry.register(Box::new(hue.clone()))?;
        registry.register(Box::new(saturation.clone()))?;
        registry.register(Box::new(color_class.clone()))?;

        Ok(Self {
            registry,
            frames_processed,
            frames_rejected,
            led_state,
            history_code,
            brightness,
            dyn_min,
            dyn_max,
            hue,
            saturation,
            color_class,
        })
    }

    /// Updates all metrics from a snapshot.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        // Counters only move forward by the difference.
        let processed = self.frames_processed.get();
        if snapshot.frames_processed > processed {
            self.frames_processed.inc_by(snapshot.frames_processed - processed);
        }
        let rejected = self.frames_rejected.get();
        if snapshot.frames_rejected > rejected {
            self.frames_rejected.inc_by(snapshot.frames_rejected - rejected);
        }

        self.led_state.set(i64::from(snapshot.led_on));

        if let Some(code) = snapshot.history_code {
            self.history_code.set(i64::from(code));
        }
        if let Some(value) = snapshot.brightness {
            self.brightness.set(value);
        }
        if let Some(value) = snapshot.dyn_min {
            self.dyn_min.set(value);
        }
        if let Some(value) = snapshot.dyn_max {
            self.dyn_max.set(value);
        }
        if let Some(value) = snapshot.hue {
            self.hue.set(value);
        }
        if let Some(value) = snapshot.saturation {
            self.saturation.set(value);
        }
        if let Some(class) = snapshot.color_class {
            self.color_class.set(i64::from(class));
        }
    }

    /// Counts one rejected frame.
    pub fn record_rejection(&self, error: &DetectorError) {
        self.frames_rejected.inc();
        tracing::debug!(error = %error, "Recorded rejected frame");
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
