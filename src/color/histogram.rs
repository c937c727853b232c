//! Dominant-hue estimation over an ROI.
//!
//! Every sufficiently saturated pixel votes for its integer hue degree.
//! The most voted degree wins, and its mean saturation and value describe
//! the light's colour. Near-gray pixels are skipped since their hue is
//! mostly noise.

use super::hsv::{yuv_to_hsv, Hsv};
use crate::capture::{Roi, RoiError, YuvFrame};

/// One bin per integer degree.
pub const HUE_BINS: usize = 360;

/// Pixels below this saturation do not vote.
pub const DEFAULT_MIN_SATURATION: f64 = 0.05;

/// Most frequent hue of an ROI with the mean saturation/value of its bin.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DominantHue {
    /// Bin centre in degrees, or 0 for the achromatic fallback.
    pub hue: f64,
    /// Mean saturation of the winning bin, or 0.
    pub saturation: f64,
    /// Mean value of the winning bin, or mean ROI luma / 255.
    pub value: f64,
    /// Pixels in the winning bin, 0 for the achromatic fallback.
    pub support: u32,
}

impl DominantHue {
    /// `[hue, sat, val]`.
    pub fn to_values(&self) -> [f64; 3] {
        [self.hue, self.saturation, self.value]
    }

    /// As an [`Hsv`] triple.
    pub fn as_hsv(&self) -> Hsv {
        Hsv {
            hue: self.hue,
            saturation: self.saturation,
            value: self.value,
        }
    }

    /// Whether no pixel passed the saturation filter.
    pub fn is_achromatic(&self) -> bool {
        self.support == 0
    }
}

/// Per-degree hue counts with saturation and value accumulators.
#[derive(Debug, Clone)]
pub struct HueHistogram {
    counts: [u32; HUE_BINS],
    saturation_sums: [f64; HUE_BINS],
    value_sums: [f64; HUE_BINS],
    total: u64,
}

impl HueHistogram {
    /// Creates an empty histogram.
    pub fn new() -> Self {
        Self {
            counts: [0; HUE_BINS],
            saturation_sums: [0.0; HUE_BINS],
            value_sums: [0.0; HUE_BINS],
            total: 0,
        }
    }

    #[inline]
    fn bin(hue: f64) -> usize {
        (hue.max(0.0).floor() as usize).min(HUE_BINS - 1)
    }

    /// Adds one pixel's colour.
    pub fn add(&mut self, hsv: &Hsv) {
        let bin = Self::bin(hsv.hue);
        self.counts[bin] += 1;
        self.saturation_sums[bin] += hsv.saturation;
        self.value_sums[bin] += hsv.value;
        self.total += 1;
    }

    /// Count in the bin for integer degree `bin`.
    pub fn count(&self, bin: usize) -> u32 {
        self.counts.get(bin).copied().unwrap_or(0)
    }

    /// Total pixels added.
    #[inline]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// The most populated bin; ties go to the lowest degree.
    pub fn dominant(&self) -> Option<DominantHue> {
        let (bin, &count) = self
            .counts
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, &u32)>, (bin, count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((bin, count)),
            })?;

        if count == 0 {
            return None;
        }

        let n = count as f64;
        Some(DominantHue {
            hue: bin as f64 + 0.5,
            saturation: self.saturation_sums[bin] / n,
            value: self.value_sums[bin] / n,
            support: count,
        })
    }
}

impl Default for HueHistogram {
    fn default() -> Self {
        Self::new()
    }
}

/// Finds the dominant hue of the ROI.
///
/// Each luma pixel is paired with the chroma sample covering it. When no
/// pixel reaches `min_saturation`, the result is achromatic with
/// `value = mean ROI luma / 255` (0 for an empty ROI).
pub fn dominant_hue(
    frame: &YuvFrame<'_>,
    roi: &Roi,
    min_saturation: f64,
) -> Result<DominantHue, RoiError> {
    roi.validate(frame.width(), frame.height())?;

    let luma = frame.luma();
    let chroma = frame.chroma();
    let mut histogram = HueHistogram::new();
    let mut luma_sum = 0u64;

    let rows = if roi.is_empty() { 0..0 } else { roi.rows() };
    for y in rows {
        let row = luma.row(y);
        for x in roi.columns() {
            let l = row[x];
            luma_sum += l as u64;

            let (u, v) = chroma.pair_for_luma(x, y);
            let hsv = yuv_to_hsv(l, u, v);
            if hsv.saturation < min_saturation {
                continue;
            }
            histogram.add(&hsv);
        }
    }

    if let Some(dominant) = histogram.dominant() {
        return Ok(dominant);
    }

    let mean_luma = if roi.is_empty() {
        0.0
    } else {
        luma_sum as f64 / roi.area() as f64
    };
    Ok(DominantHue {
        hue: 0.0,
        saturation: 0.0,
        value: mean_luma / 255.0,
        support: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::Frame;
    use crate::color::hsv::rgb_to_yuv;

    fn hsv(hue: f64, saturation: f64, value: f64) -> Hsv {
        Hsv {
            hue,
            saturation,
            value,
        }
    }

    #[test]
    fn test_empty_histogram_has_no_dominant() {
        assert!(HueHistogram::new().dominant().is_none());
    }

    #[test]
    fn test_dominant_bin_means() {
        let mut hist = HueHistogram::new();
        hist.add(&hsv(120.2, 0.8, 0.6));
        hist.add(&hsv(120.9, 0.6, 0.4));
        hist.add(&hsv(30.0, 1.0, 1.0));

        let dominant = hist.dominant().unwrap();
        assert_eq!(dominant.hue, 120.5);
        assert!((dominant.saturation - 0.7).abs() < 1e-12);
        assert!((dominant.value - 0.5).abs() < 1e-12);
        assert_eq!(dominant.support, 2);
        assert_eq!(hist.total(), 3);
    }

    #[test]
    fn test_ties_go_to_lowest_bin() {
        let mut hist = HueHistogram::new();
        hist.add(&hsv(200.0, 0.5, 0.5));
        hist.add(&hsv(10.0, 0.5, 0.5));
        assert_eq!(hist.dominant().unwrap().hue, 10.5);
    }

    #[test]
    fn test_last_bin_clamped() {
        let mut hist = HueHistogram::new();
        hist.add(&hsv(359.99, 0.5, 0.5));
        assert_eq!(hist.count(359), 1);
    }

    #[test]
    fn test_gray_roi_falls_back_to_luma_mean() {
        let frame = Frame::uniform(20, 20, 102, 128, 128, 1);
        let view = frame.view().unwrap();
        let result = dominant_hue(&view, &Roi::new(0, 0, 20, 20), DEFAULT_MIN_SATURATION).unwrap();
        assert!(result.is_achromatic());
        assert_eq!(result.hue, 0.0);
        assert_eq!(result.saturation, 0.0);
        assert!((result.value - 102.0 / 255.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_roi_is_black_fallback() {
        let frame = Frame::uniform(20, 20, 200, 128, 128, 1);
        let view = frame.view().unwrap();
        let result = dominant_hue(&view, &Roi::new(4, 4, 0, 0), DEFAULT_MIN_SATURATION).unwrap();
        assert_eq!(result.value, 0.0);
    }

    #[test]
    fn test_uniform_green_roi() {
        let (y, u, v) = rgb_to_yuv(0, 200, 0);
        let frame = Frame::uniform(16, 16, y, u, v, 1);
        let view = frame.view().unwrap();
        let result = dominant_hue(&view, &Roi::new(2, 2, 8, 8), DEFAULT_MIN_SATURATION).unwrap();
        assert_eq!(result.support, 64);
        assert!((result.hue - 120.5).abs() < 3.0);
        assert!(result.saturation > 0.9);
    }

    #[test]
    fn test_out_of_bounds_roi_rejected() {
        let frame = Frame::uniform(16, 16, 0, 128, 128, 1);
        let view = frame.view().unwrap();
        assert!(dominant_hue(&view, &Roi::new(10, 10, 10, 10), DEFAULT_MIN_SATURATION).is_err());
    }
}
