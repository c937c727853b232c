//! Per-pixel YUV to HSV conversion (BT.601, bias-128 chroma).

/// Below this, `delta` or `max` is treated as zero.
const EPSILON: f64 = 1e-8;

/// A colour in HSV space.
///
/// `hue` is in degrees `[0, 360)`, `saturation` and `value` in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Hsv {
    /// Hue in degrees.
    pub hue: f64,
    /// Saturation, 0 for gray.
    pub saturation: f64,
    /// Value, the largest RGB component.
    pub value: f64,
}

/// Wraps an angle in degrees into `[0, 360)`.
#[inline]
pub(crate) fn wrap_degrees(hue: f64) -> f64 {
    let wrapped = hue.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Converts a YUV triple to RGB in `[0, 255]`.
pub fn yuv_to_rgb(y: u8, u: u8, v: u8) -> [f64; 3] {
    let y = y as f64;
    let u = u as f64 - 128.0;
    let v = v as f64 - 128.0;

    let r = y + 1.402 * v;
    let g = y - 0.344136 * u - 0.714136 * v;
    let b = y + 1.772 * u;

    [r.clamp(0.0, 255.0), g.clamp(0.0, 255.0), b.clamp(0.0, 255.0)]
}

/// Converts an 8-bit RGB triple to YUV with bias-128 chroma.
///
/// Inverse of [`yuv_to_rgb`] up to rounding.
pub fn rgb_to_yuv(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let (r, g, b) = (r as f64, g as f64, b as f64);
    let y = 0.299 * r + 0.587 * g + 0.114 * b;
    let u = -0.168736 * r - 0.331264 * g + 0.5 * b + 128.0;
    let v = 0.5 * r - 0.418688 * g - 0.081312 * b + 128.0;
    let to_byte = |c: f64| c.round().clamp(0.0, 255.0) as u8;
    (to_byte(y), to_byte(u), to_byte(v))
}

/// Converts normalized RGB in `[0, 1]` to HSV.
///
/// Achromatic colours (`delta < 1e-8`) get hue 0.
pub fn rgb_to_hsv(r: f64, g: f64, b: f64) -> Hsv {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let saturation = if max < EPSILON { 0.0 } else { delta / max };

    let hue = if delta < EPSILON {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    Hsv {
        hue: wrap_degrees(hue),
        saturation,
        value: max,
    }
}

/// Converts one YUV pixel to HSV.
pub fn yuv_to_hsv(y: u8, u: u8, v: u8) -> Hsv {
    let [r, g, b] = yuv_to_rgb(y, u, v);
    rgb_to_hsv(r / 255.0, g / 255.0, b / 255.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_neutral_chroma_is_achromatic() {
        let hsv = yuv_to_hsv(200, 128, 128);
        assert_eq!(hsv.hue, 0.0);
        assert_eq!(hsv.saturation, 0.0);
        assert!((hsv.value - 200.0 / 255.0).abs() < 1e-12);
    }

    #[test]
    fn test_black_has_zero_saturation() {
        let hsv = yuv_to_hsv(0, 128, 128);
        assert_eq!(hsv, Hsv::default());
    }

    #[test]
    fn test_primaries_round_trip() {
        let cases = [((255, 0, 0), 0.0), ((0, 255, 0), 120.0), ((0, 0, 255), 240.0)];
        for ((r, g, b), expected) in cases {
            let (y, u, v) = rgb_to_yuv(r, g, b);
            let hsv = yuv_to_hsv(y, u, v);
            let diff = (hsv.hue - expected).abs().min(360.0 - (hsv.hue - expected).abs());
            assert!(diff < 3.0, "rgb {:?} -> hue {}", (r, g, b), hsv.hue);
            assert!(hsv.saturation > 0.9);
            assert!(hsv.value > 0.9);
        }
    }

    #[test]
    fn test_rgb_to_hsv_sectors() {
        assert!((rgb_to_hsv(1.0, 1.0, 0.0).hue - 60.0).abs() < 1e-9);
        assert!((rgb_to_hsv(0.0, 1.0, 1.0).hue - 180.0).abs() < 1e-9);
        assert!((rgb_to_hsv(1.0, 0.0, 1.0).hue - 300.0).abs() < 1e-9);
        // Red with a touch of blue lands just below 360.
        let hue = rgb_to_hsv(1.0, 0.0, 0.1).hue;
        assert!(hue > 350.0 && hue < 360.0);
    }

    #[test]
    fn test_wrap_degrees() {
        assert_eq!(wrap_degrees(360.0), 0.0);
        assert_eq!(wrap_degrees(-30.0), 330.0);
        assert_eq!(wrap_degrees(725.0), 5.0);
        assert_eq!(wrap_degrees(-1e-20), 0.0);
    }

    proptest! {
        #[test]
        fn hsv_components_stay_in_range(y in any::<u8>(), u in any::<u8>(), v in any::<u8>()) {
            let hsv = yuv_to_hsv(y, u, v);
            prop_assert!((0.0..360.0).contains(&hsv.hue));
            prop_assert!((0.0..=1.0).contains(&hsv.saturation));
            prop_assert!((0.0..=1.0).contains(&hsv.value));
        }
    }
}
