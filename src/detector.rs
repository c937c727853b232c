//! The LED detector: one instance per watched light.
//!
//! Owns every piece of state that survives between frames (frame ring,
//! brightness history, LED state and history code). A detector is driven
//! by one stream at a time; independent streams get independent detectors.

use crate::analysis::{BrightnessHistory, LedHistoryCode, LedState, LedStateMachine};
use crate::capture::{DetectorConfig, FrameError, LumaPlane, Roi, RoiError, YuvFrame};
use crate::color::{classify_hsv_color, dominant_hue, ColorClass, DominantHue};
use crate::extraction::TemporalChangeDetector;
use thiserror::Error;

/// Inputs the detector refuses before reading any pixel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectorError {
    /// ROI over capacity or outside the frame.
    #[error("invalid ROI: {0}")]
    InvalidRoi(#[from] RoiError),
    /// Plane buffers too short for their strides and dimensions.
    #[error("invalid frame: {0}")]
    InvalidFrame(#[from] FrameError),
}

/// Brightness half of a detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrightnessReading {
    /// Derived brightness `Y` of this frame.
    pub brightness: f64,
    /// Smallest brightness in the history.
    pub dyn_min: f64,
    /// Largest brightness in the history.
    pub dyn_max: f64,
    /// Midpoint threshold `Y` was judged against.
    pub threshold: f64,
    /// LED state after this frame.
    pub led: LedState,
    /// On/off judgements of the three history slots.
    pub history_code: LedHistoryCode,
    /// Cells whose three-frame spread exceeded the change threshold.
    pub changed_cells: usize,
    /// Whether `brightness` came from the three-frame comparison.
    pub three_frames_captured: bool,
}

/// Full result for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    /// Derived brightness `Y` of this frame.
    pub brightness: f64,
    /// Smallest brightness in the history.
    pub dyn_min: f64,
    /// Largest brightness in the history.
    pub dyn_max: f64,
    /// Dominant hue in degrees, `bin + 0.5`, or 0 when achromatic.
    pub hue: f64,
    /// Saturation in `[0, 1]` at the dominant hue.
    pub saturation: f64,
    /// HSV value in `[0, 1]` at the dominant hue.
    pub value: f64,
    /// Colour class of `(hue, saturation, value)`.
    pub color: ColorClass,
    /// LED state after this frame.
    pub led: LedState,
    /// On/off judgements of the three history slots.
    pub history_code: LedHistoryCode,
    /// Cells whose three-frame spread exceeded the change threshold.
    pub changed_cells: usize,
    /// Whether `brightness` came from the three-frame comparison.
    pub three_frames_captured: bool,
}

impl Detection {
    fn from_parts(reading: BrightnessReading, dominant: DominantHue, color: ColorClass) -> Self {
        Self {
            brightness: reading.brightness,
            dyn_min: reading.dyn_min,
            dyn_max: reading.dyn_max,
            hue: dominant.hue,
            saturation: dominant.saturation,
            value: dominant.value,
            color,
            led: reading.led,
            history_code: reading.history_code,
            changed_cells: reading.changed_cells,
            three_frames_captured: reading.three_frames_captured,
        }
    }

    /// `[Y, dynMin, dynMax, hue, sat, colorClassId, ledHistoryCode]`.
    pub fn to_values(&self) -> [f64; 7] {
        [
            self.brightness,
            self.dyn_min,
            self.dyn_max,
            self.hue,
            self.saturation,
            f64::from(self.color.id()),
            f64::from(self.history_code.packed()),
        ]
    }
}

/// Stateful indicator-light detector.
///
/// ```
/// use led_indicator::{capture::{Frame, Roi}, DetectorConfig, LedDetector};
///
/// let mut detector = LedDetector::new(DetectorConfig::default());
/// let frame = Frame::uniform(64, 64, 180, 128, 128, 1);
/// let detection = detector
///     .process_frame(&frame.view().unwrap(), &Roi::new(0, 0, 40, 40))
///     .unwrap();
/// assert_eq!(detection.to_values()[0], 180.0);
/// ```
#[derive(Debug, Clone)]
pub struct LedDetector {
    config: DetectorConfig,
    temporal: TemporalChangeDetector,
    history: BrightnessHistory,
    state: LedStateMachine,
    frames_processed: u64,
}

impl LedDetector {
    /// Creates a detector with empty history.
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            temporal: TemporalChangeDetector::from_config(&config),
            config,
            history: BrightnessHistory::new(),
            state: LedStateMachine::new(),
            frames_processed: 0,
        }
    }

    /// Processes one frame: brightness, LED state and colour.
    ///
    /// The ROI is checked against the frame before any state changes.
    pub fn process_frame(
        &mut self,
        frame: &YuvFrame<'_>,
        roi: &Roi,
    ) -> Result<Detection, DetectorError> {
        Self::check_roi(roi, frame.width(), frame.height())?;

        let dominant = dominant_hue(frame, roi, self.config.min_saturation)?;
        let color = classify_hsv_color(dominant.hue, dominant.saturation, dominant.value);
        let reading = self.track_brightness(frame.luma(), roi)?;

        tracing::trace!(
            color = %color,
            hue = dominant.hue,
            saturation = dominant.saturation,
            support = dominant.support,
            "Colour classified"
        );

        Ok(Detection::from_parts(reading, dominant, color))
    }

    /// Processes raw plane buffers as handed over by a camera callback.
    ///
    /// The ROI is checked against `width` x `height` first, then the plane
    /// buffers against their strides, then the frame is processed as in
    /// [`process_frame`](Self::process_frame).
    #[allow(clippy::too_many_arguments)]
    pub fn process_planes(
        &mut self,
        y: &[u8],
        u: &[u8],
        v: &[u8],
        width: usize,
        height: usize,
        y_row_stride: usize,
        uv_row_stride: usize,
        uv_pixel_stride: usize,
        roi: &Roi,
    ) -> Result<Detection, DetectorError> {
        Self::check_roi(roi, width, height)?;
        let frame = YuvFrame::from_planes(
            y,
            u,
            v,
            width,
            height,
            y_row_stride,
            uv_row_stride,
            uv_pixel_stride,
        )
        .map_err(|e| {
            tracing::warn!(error = %e, "Rejected frame");
            DetectorError::from(e)
        })?;
        self.process_frame(&frame, roi)
    }

    /// Processes the luma plane alone: brightness and LED state, no colour.
    ///
    /// Shares the temporal state with [`process_frame`](Self::process_frame).
    pub fn process_luma(
        &mut self,
        luma: &LumaPlane<'_>,
        roi: &Roi,
    ) -> Result<BrightnessReading, DetectorError> {
        Self::check_roi(roi, luma.width(), luma.height())?;
        self.track_brightness(luma, roi)
    }

    fn check_roi(roi: &Roi, width: usize, height: usize) -> Result<(), DetectorError> {
        roi.validate(width, height).map_err(|e| {
            tracing::warn!(error = %e, "Rejected frame");
            DetectorError::from(e)
        })
    }

    fn track_brightness(
        &mut self,
        luma: &LumaPlane<'_>,
        roi: &Roi,
    ) -> Result<BrightnessReading, DetectorError> {
        let sample = self.temporal.observe(luma, roi)?;
        let slot = self.history.push(sample.value);
        debug_assert_eq!(slot, sample.slot, "history and frame ring out of step");

        let decision = self.state.update(&self.history, sample.value, slot);
        self.temporal.advance();
        self.frames_processed += 1;

        tracing::trace!(
            frame = self.frames_processed,
            brightness = sample.value,
            changed = sample.changed_cells,
            threshold = decision.threshold,
            code = %decision.code,
            "Brightness tracked"
        );

        Ok(BrightnessReading {
            brightness: sample.value,
            dyn_min: decision.range.min,
            dyn_max: decision.range.max,
            threshold: decision.threshold,
            led: decision.state,
            history_code: decision.code,
            changed_cells: sample.changed_cells,
            three_frames_captured: sample.three_frames_captured,
        })
    }

    /// Current LED state.
    #[inline]
    pub fn led_state(&self) -> LedState {
        self.state.state()
    }

    /// History code as of the last frame.
    #[inline]
    pub fn history_code(&self) -> LedHistoryCode {
        self.state.code()
    }

    /// Whether the last frame used the three-frame comparison.
    #[inline]
    pub fn three_frames_captured(&self) -> bool {
        self.temporal.three_frames_captured()
    }

    /// Frames accepted since construction or the last reset.
    #[inline]
    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Brightness history.
    pub fn history(&self) -> &BrightnessHistory {
        &self.history
    }

    /// Active configuration.
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Drops all temporal state, e.g. after the stream restarts.
    pub fn reset(&mut self) {
        self.temporal.reset();
        self.history.reset();
        self.state.reset();
        self.frames_processed = 0;
        tracing::debug!("LED detector reset");
    }
}

impl Default for LedDetector {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::Frame;
    use crate::color::rgb_to_yuv;
    use crate::extraction::StaticSceneFallback;

    const SIZE: usize = 60;
    const ROI: Roi = Roi::new(10, 10, 40, 40);

    /// Background at 200 everywhere, with the centre 20x20 of the ROI at
    /// `led_luma` and chroma `(u, v)`.
    fn scene(led_luma: u8, u: u8, v: u8) -> Frame {
        let mut y = vec![200u8; SIZE * SIZE];
        let cw = SIZE / 2;
        let mut cu = vec![128u8; cw * cw];
        let mut cv = vec![128u8; cw * cw];
        for row in 20..40 {
            for col in 20..40 {
                y[row * SIZE + col] = led_luma;
            }
        }
        for row in 10..20 {
            for col in 10..20 {
                cu[row * cw + col] = u;
                cv[row * cw + col] = v;
            }
        }
        Frame::new(y, cu, cv, SIZE, SIZE, 1)
    }

    fn run(detector: &mut LedDetector, frame: &Frame) -> Detection {
        detector.process_frame(&frame.view().unwrap(), &ROI).unwrap()
    }

    #[test]
    fn test_uniform_roi_matches_mean() {
        let mut detector = LedDetector::new(DetectorConfig {
            static_fallback: StaticSceneFallback::MatrixMean,
            ..Default::default()
        });
        let frame = Frame::uniform(SIZE, SIZE, 137, 128, 128, 1);

        for _ in 0..4 {
            let detection = run(&mut detector, &frame);
            assert_eq!(detection.changed_cells, 0);
            assert!((detection.brightness - 137.0).abs() <= 1.0);
        }
        assert!(detector.three_frames_captured());
    }

    #[test]
    fn test_static_scene_reads_zero_by_default() {
        let mut detector = LedDetector::default();
        let frame = Frame::uniform(SIZE, SIZE, 137, 128, 128, 1);
        let values: Vec<f64> = (0..3).map(|_| run(&mut detector, &frame).brightness).collect();
        assert_eq!(values, vec![137.0, 137.0, 0.0]);
    }

    #[test]
    fn test_bright_dark_bright_sequence() {
        let mut detector = LedDetector::default();
        let bright = scene(250, 128, 128);
        let dark = scene(20, 128, 128);

        let first = run(&mut detector, &bright);
        let second = run(&mut detector, &dark);
        let third = run(&mut detector, &bright);

        assert!(!first.three_frames_captured);
        assert!(!second.three_frames_captured);
        assert!(third.three_frames_captured);

        // Only the 2x2 centre cells of the 4x4 matrix toggle.
        assert_eq!(third.changed_cells, 4);
        assert_eq!(third.brightness, 250.0);

        // Bootstrap means: (12*200 + 4*250)/16 and (12*200 + 4*20)/16.
        assert_eq!(first.brightness, 212.5);
        assert_eq!(second.brightness, 155.0);
        assert_eq!(third.dyn_min, 155.0);
        assert_eq!(third.dyn_max, 250.0);

        let mid = (third.dyn_min + third.dyn_max) / 2.0;
        assert_eq!(third.led, LedState::from_threshold(third.brightness, mid));
        assert_eq!(detector.led_state(), LedState::On);
        // mid 202.5: slot0 212.5 on, slot1 155 off, slot2 250 on.
        assert_eq!(third.history_code.packed(), 0b101);
        assert_eq!(third.to_values()[6], 5.0);
    }

    #[test]
    fn test_colored_led_is_classified() {
        let (y, u, v) = rgb_to_yuv(255, 0, 0);
        let mut detector = LedDetector::default();
        let detection = run(&mut detector, &scene(y, u, v));
        assert_eq!(detection.color, ColorClass::Red);
        assert_eq!(detection.to_values()[5], f64::from(ColorClass::Red.id()));
        assert!(detection.saturation > 0.9);
    }

    #[test]
    fn test_gray_scene_is_achromatic() {
        let mut detector = LedDetector::default();
        let detection = run(&mut detector, &Frame::uniform(SIZE, SIZE, 240, 128, 128, 1));
        assert_eq!(detection.hue, 0.0);
        assert_eq!(detection.saturation, 0.0);
        assert_eq!(detection.color, ColorClass::White);
    }

    #[test]
    fn test_oversized_roi_rejected_without_state_change() {
        let mut detector = LedDetector::default();
        let frame = Frame::uniform(400, 300, 100, 128, 128, 1);
        let result = detector.process_frame(&frame.view().unwrap(), &Roi::new(0, 0, 300, 40));

        assert!(matches!(
            result,
            Err(DetectorError::InvalidRoi(RoiError::ExceedsCapacity { .. }))
        ));
        assert_eq!(detector.frames_processed(), 0);
        assert!(detector.history().is_empty());
    }

    #[test]
    fn test_roi_outside_frame_rejected() {
        let mut detector = LedDetector::default();
        let frame = Frame::uniform(SIZE, SIZE, 100, 128, 128, 1);
        let result = detector.process_frame(&frame.view().unwrap(), &Roi::new(30, 30, 40, 40));
        assert!(matches!(
            result,
            Err(DetectorError::InvalidRoi(RoiError::OutOfBounds { .. }))
        ));
    }

    #[test]
    fn test_raw_nv21_planes() {
        // 20x20 frame, padded luma rows, interleaved VU chroma.
        let (ly, lu, lv) = rgb_to_yuv(0, 0, 255);
        let y = vec![ly; 24 * 20];
        let mut vu = Vec::with_capacity(10 * 10 * 2);
        for _ in 0..100 {
            vu.push(lv);
            vu.push(lu);
        }

        let mut detector = LedDetector::default();
        let detection = detector
            .process_planes(&y, &vu[1..], &vu, 20, 20, 24, 20, 2, &Roi::new(0, 0, 20, 20))
            .unwrap();
        assert_eq!(detection.color, ColorClass::Blue);
        assert_eq!(detection.brightness, f64::from(ly));
    }

    #[test]
    fn test_raw_planes_validated() {
        let mut detector = LedDetector::default();
        let y = vec![0u8; 10];
        let c = vec![128u8; 100];

        let oversized = detector.process_planes(&y, &c, &c, 400, 400, 400, 200, 1, &Roi::new(0, 0, 300, 10));
        assert!(matches!(oversized, Err(DetectorError::InvalidRoi(_))));

        let short = detector.process_planes(&y, &c, &c, 20, 20, 20, 10, 1, &Roi::new(0, 0, 10, 10));
        assert!(matches!(
            short,
            Err(DetectorError::InvalidFrame(FrameError::PlaneTooSmall { .. }))
        ));
        assert_eq!(detector.frames_processed(), 0);
    }

    #[test]
    fn test_zero_width_planes_read_zero() {
        let mut detector = LedDetector::default();
        let detection = detector
            .process_planes(&[], &[], &[], 0, 5, 10, 5, 1, &Roi::new(0, 0, 0, 5))
            .unwrap();
        assert_eq!(detection.brightness, 0.0);
        assert_eq!(detection.value, 0.0);
        assert_eq!(detection.color, ColorClass::Black);
        assert_eq!(detector.frames_processed(), 1);
    }

    #[test]
    fn test_luma_only_shares_state() {
        let mut detector = LedDetector::default();
        let bright = scene(250, 128, 128);
        let dark = scene(20, 128, 128);

        run(&mut detector, &bright);
        let view = dark.view().unwrap();
        let reading = detector.process_luma(view.luma(), &ROI).unwrap();
        assert_eq!(reading.brightness, 155.0);
        assert_eq!(reading.led, LedState::Off);
        assert_eq!(detector.frames_processed(), 2);

        let third = run(&mut detector, &bright);
        assert!(third.three_frames_captured);
    }

    #[test]
    fn test_empty_roi_reads_zero() {
        let mut detector = LedDetector::default();
        let frame = Frame::uniform(SIZE, SIZE, 100, 128, 128, 1);
        let detection = detector
            .process_frame(&frame.view().unwrap(), &Roi::new(0, 0, 5, 5))
            .unwrap();
        assert_eq!(detection.brightness, 0.0);
        assert!(detection.brightness.is_finite());
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut detector = LedDetector::default();
        let frame = scene(250, 128, 128);
        for _ in 0..4 {
            run(&mut detector, &frame);
        }
        detector.reset();
        assert_eq!(detector.frames_processed(), 0);
        assert_eq!(detector.led_state(), LedState::Off);
        assert_eq!(detector.history_code().packed(), 0);
        assert!(!detector.three_frames_captured());
    }

    #[test]
    fn test_independent_detectors() {
        let mut a = LedDetector::default();
        let mut b = LedDetector::default();
        run(&mut a, &scene(250, 128, 128));
        run(&mut a, &scene(20, 128, 128));
        assert_eq!(a.frames_processed(), 2);
        assert_eq!(b.frames_processed(), 0);
        assert_eq!(run(&mut b, &scene(20, 128, 128)).led, LedState::On);
    }
}
