//! Region of interest within a frame.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use thiserror::Error;

/// Largest ROI width or height the detector accepts.
pub const MAX_ROI_DIM: usize = 256;

/// Reasons an ROI is rejected before any pixel is read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoiError {
    /// Wider or taller than [`MAX_ROI_DIM`].
    #[error("ROI {width}x{height} exceeds the {max}x{max} capacity")]
    ExceedsCapacity {
        width: usize,
        height: usize,
        max: usize,
    },
    /// Not fully inside the frame.
    #[error("ROI {roi} lies outside the {frame_width}x{frame_height} frame")]
    OutOfBounds {
        roi: Roi,
        frame_width: usize,
        frame_height: usize,
    },
}

/// Error parsing an ROI from its `x,y,w,h` text form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected ROI as x,y,w,h but got {0:?}")]
pub struct ParseRoiError(String);

/// Axis-aligned rectangle `(x0, y0, width, height)` in luma pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Roi {
    /// Left column.
    pub x0: usize,
    /// Top row.
    pub y0: usize,
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
}

impl Roi {
    /// Creates an ROI without validating it.
    pub const fn new(x0: usize, y0: usize, width: usize, height: usize) -> Self {
        Self {
            x0,
            y0,
            width,
            height,
        }
    }

    /// Number of pixels covered.
    #[inline]
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Whether the ROI covers no pixel.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Absolute column range covered.
    #[inline]
    pub fn columns(&self) -> Range<usize> {
        self.x0..self.x0 + self.width
    }

    /// Absolute row range covered.
    #[inline]
    pub fn rows(&self) -> Range<usize> {
        self.y0..self.y0 + self.height
    }

    /// Checks the capacity limit and that the ROI lies inside a
    /// `frame_width` x `frame_height` frame.
    pub fn validate(&self, frame_width: usize, frame_height: usize) -> Result<(), RoiError> {
        if self.width > MAX_ROI_DIM || self.height > MAX_ROI_DIM {
            return Err(RoiError::ExceedsCapacity {
                width: self.width,
                height: self.height,
                max: MAX_ROI_DIM,
            });
        }

        let fits = |start: usize, len: usize, bound: usize| {
            start.checked_add(len).is_some_and(|end| end <= bound)
        };
        if !fits(self.x0, self.width, frame_width) || !fits(self.y0, self.height, frame_height) {
            return Err(RoiError::OutOfBounds {
                roi: *self,
                frame_width,
                frame_height,
            });
        }

        Ok(())
    }
}

impl fmt::Display for Roi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}+{}+{}",
            self.width, self.height, self.x0, self.y0
        )
    }
}

impl FromStr for Roi {
    type Err = ParseRoiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<usize> = s
            .split(',')
            .map(|p| p.trim().parse::<usize>())
            .collect::<Result<_, _>>()
            .map_err(|_| ParseRoiError(s.to_string()))?;

        match parts.as_slice() {
            &[x0, y0, width, height] => Ok(Self::new(x0, y0, width, height)),
            _ => Err(ParseRoiError(s.to_string())),
        }
    }
}
