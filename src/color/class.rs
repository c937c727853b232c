//! Named colour classes for an HSV triple.

use super::hsv::{wrap_degrees, Hsv};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Below this value every colour is black.
pub const BLACK_MAX_VALUE: f64 = 0.05;
/// Below this saturation a colour is white or gray.
pub const ACHROMATIC_MAX_SATURATION: f64 = 0.15;
/// Achromatic colours brighter than this are white.
pub const WHITE_MIN_VALUE: f64 = 0.85;

/// Colour of the indicator. The discriminant is the numeric class id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ColorClass {
    Black = 0,
    White = 1,
    Gray = 2,
    Red = 3,
    Orange = 4,
    Yellow = 5,
    Green = 6,
    Cyan = 7,
    Blue = 8,
    Magenta = 9,
    Pink = 10,
    Unknown = 11,
}

impl ColorClass {
    /// Every class in id order.
    pub const ALL: [ColorClass; 12] = [
        Self::Black,
        Self::White,
        Self::Gray,
        Self::Red,
        Self::Orange,
        Self::Yellow,
        Self::Green,
        Self::Cyan,
        Self::Blue,
        Self::Magenta,
        Self::Pink,
        Self::Unknown,
    ];

    /// Numeric class id.
    #[inline]
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Class with the given id, if any.
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    /// Lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::White => "white",
            Self::Gray => "gray",
            Self::Red => "red",
            Self::Orange => "orange",
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Cyan => "cyan",
            Self::Blue => "blue",
            Self::Magenta => "magenta",
            Self::Pink => "pink",
            Self::Unknown => "unknown",
        }
    }

    /// Classifies an [`Hsv`] colour.
    pub fn of(hsv: &Hsv) -> Self {
        classify_hsv_color(hsv.hue, hsv.saturation, hsv.value)
    }
}

impl fmt::Display for ColorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Maps `(hue, sat, val)` to a colour class.
///
/// Value is checked first, then saturation, then hue bands. The red band
/// is closed at both 350 and 360 as well as at 0 and 10.
pub fn classify_hsv_color(hue: f64, sat: f64, val: f64) -> ColorClass {
    if val < BLACK_MAX_VALUE {
        return ColorClass::Black;
    }
    if sat < ACHROMATIC_MAX_SATURATION {
        return if val > WHITE_MIN_VALUE {
            ColorClass::White
        } else {
            ColorClass::Gray
        };
    }

    let h = wrap_degrees(hue);
    if (350.0..=360.0).contains(&h) || (0.0..=10.0).contains(&h) {
        ColorClass::Red
    } else if h > 10.0 && h <= 40.0 {
        ColorClass::Orange
    } else if h > 40.0 && h <= 70.0 {
        ColorClass::Yellow
    } else if h > 70.0 && h <= 160.0 {
        ColorClass::Green
    } else if h > 160.0 && h <= 200.0 {
        ColorClass::Cyan
    } else if h > 200.0 && h <= 260.0 {
        ColorClass::Blue
    } else if h > 260.0 && h <= 330.0 {
        ColorClass::Magenta
    } else if h > 330.0 && h < 350.0 {
        ColorClass::Pink
    } else {
        ColorClass::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::hsv::{rgb_to_yuv, yuv_to_hsv};
    use proptest::prelude::*;

    #[test]
    fn test_reference_points() {
        assert_eq!(classify_hsv_color(45.0, 0.5, 0.5), ColorClass::Orange);
        assert_eq!(classify_hsv_color(123.0, 0.5, 0.02), ColorClass::Black);
        assert_eq!(classify_hsv_color(0.0, 0.05, 0.9), ColorClass::White);
        assert_eq!(classify_hsv_color(0.0, 0.05, 0.5), ColorClass::Gray);
    }

    #[test]
    fn test_band_edges() {
        let cases = [
            (0.0, ColorClass::Red),
            (10.0, ColorClass::Red),
            (10.5, ColorClass::Orange),
            (40.0, ColorClass::Orange),
            (40.5, ColorClass::Yellow),
            (70.0, ColorClass::Yellow),
            (70.5, ColorClass::Green),
            (160.0, ColorClass::Green),
            (160.5, ColorClass::Cyan),
            (200.0, ColorClass::Cyan),
            (200.5, ColorClass::Blue),
            (260.0, ColorClass::Blue),
            (260.5, ColorClass::Magenta),
            (330.0, ColorClass::Magenta),
            (330.5, ColorClass::Pink),
            (349.5, ColorClass::Pink),
            (350.0, ColorClass::Red),
            (359.5, ColorClass::Red),
            (360.0, ColorClass::Red),
        ];
        for (hue, expected) in cases {
            assert_eq!(classify_hsv_color(hue, 0.8, 0.8), expected, "hue {}", hue);
        }
    }

    #[test]
    fn test_hue_wraps() {
        assert_eq!(classify_hsv_color(-10.0, 0.8, 0.8), ColorClass::Red);
        assert_eq!(classify_hsv_color(480.0, 0.8, 0.8), ColorClass::Green);
    }

    #[test]
    fn test_nan_is_unknown() {
        assert_eq!(classify_hsv_color(f64::NAN, 0.8, 0.8), ColorClass::Unknown);
    }

    #[test]
    fn test_pure_red_pixel() {
        let (y, u, v) = rgb_to_yuv(255, 0, 0);
        assert_eq!(ColorClass::of(&yuv_to_hsv(y, u, v)), ColorClass::Red);
    }

    #[test]
    fn test_ids_round_trip() {
        for class in ColorClass::ALL {
            assert_eq!(ColorClass::from_id(class.id()), Some(class));
        }
        assert_eq!(ColorClass::Unknown.id(), 11);
        assert_eq!(ColorClass::from_id(12), None);
    }

    proptest! {
        #[test]
        fn saturated_finite_hues_are_never_unknown(hue in -720.0f64..720.0) {
            prop_assert_ne!(classify_hsv_color(hue, 0.9, 0.9), ColorClass::Unknown);
        }
    }
}
