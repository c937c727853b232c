//! Temporal change detection over a three-frame ring.
//!
//! A toggling light changes the cells it covers from frame to frame while
//! a static background does not. Comparing the last three downsampled
//! matrices isolates the changing cells, so their mean brightness follows
//! the light even when a bright background dominates the plain ROI mean.

use super::downsample::{downsample, DownsampledMatrix};
use crate::capture::{LumaPlane, Roi, RoiError};
use serde::{Deserialize, Serialize};

/// Number of frames kept for comparison.
pub const RING_DEPTH: usize = 3;

/// Minimum max-min spread across the ring for a cell to count as changing.
pub const DEFAULT_CHANGE_THRESHOLD: u8 = 20;

/// Brightness reported once the ring is full but no cell changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaticSceneFallback {
    /// Report `0.0`.
    #[default]
    Zero,
    /// Report the plain mean of the current matrix.
    MatrixMean,
}

/// Fixed-depth ring of downsampled matrices.
#[derive(Debug, Clone, Default)]
pub struct FrameRing {
    slots: [Option<DownsampledMatrix>; RING_DEPTH],
    index: usize,
}

impl FrameRing {
    /// Creates an empty ring at slot 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot the current frame is written to.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the matrix held in `slot`, if any.
    pub fn slot(&self, slot: usize) -> Option<&DownsampledMatrix> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Overwrites the current slot.
    pub fn store(&mut self, matrix: DownsampledMatrix) {
        self.slots[self.index] = Some(matrix);
    }

    /// Moves to the next slot, wrapping after the last.
    pub fn advance(&mut self) {
        self.index = (self.index + 1) % RING_DEPTH;
    }

    /// True when every slot holds a matrix of `shape`.
    pub fn is_complete_for(&self, shape: (usize, usize)) -> bool {
        self.slots
            .iter()
            .all(|slot| slot.as_ref().is_some_and(|m| m.shape() == shape))
    }

    /// Empties every slot and rewinds to slot 0.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// One brightness sample derived from the ring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrightnessSample {
    /// Derived brightness `Y`.
    pub value: f64,
    /// Ring slot the frame was written to.
    pub slot: usize,
    /// Cells whose spread exceeded the change threshold.
    pub changed_cells: usize,
    /// Whether the three-frame comparison was used.
    pub three_frames_captured: bool,
}

/// Derives a brightness sample per frame from the temporal change between
/// the current, previous and prior downsampled ROI.
#[derive(Debug, Clone)]
pub struct TemporalChangeDetector {
    ring: FrameRing,
    change_threshold: u8,
    static_fallback: StaticSceneFallback,
    was_captured: bool,
}

impl TemporalChangeDetector {
    /// Creates a detector with an empty ring.
    pub fn new(change_threshold: u8, static_fallback: StaticSceneFallback) -> Self {
        Self {
            ring: FrameRing::new(),
            change_threshold,
            static_fallback,
            was_captured: false,
        }
    }

    /// Downsamples the ROI into the current ring slot and derives `Y`.
    ///
    /// The ring index is left untouched; call [`advance`](Self::advance)
    /// once every consumer of this frame's slot is done with it.
    pub fn observe(
        &mut self,
        luma: &LumaPlane<'_>,
        roi: &Roi,
    ) -> Result<BrightnessSample, RoiError> {
        let matrix = downsample(luma, roi)?;
        let shape = matrix.shape();
        let slot = self.ring.index();
        self.ring.store(matrix);

        let captured = self.ring.is_complete_for(shape);
        if captured != self.was_captured {
            tracing::debug!(captured, slot, "Temporal comparison availability changed");
            self.was_captured = captured;
        }

        let (value, changed_cells) = if captured {
            self.changed_mean(slot)
        } else {
            (self.ring.slot(slot).map_or(0.0, DownsampledMatrix::mean), 0)
        };

        Ok(BrightnessSample {
            value,
            slot,
            changed_cells,
            three_frames_captured: captured,
        })
    }

    /// Mean of the current matrix over cells whose three-frame spread
    /// exceeds the threshold.
    fn changed_mean(&self, slot: usize) -> (f64, usize) {
        let (Some(current), Some(previous), Some(prior)) = (
            self.ring.slot(slot),
            self.ring.slot((slot + RING_DEPTH - 1) % RING_DEPTH),
            self.ring.slot((slot + RING_DEPTH - 2) % RING_DEPTH),
        ) else {
            return (0.0, 0);
        };

        let mut sum = 0u64;
        let mut count = 0usize;
        for ((&a, &b), &c) in current
            .cells()
            .iter()
            .zip(previous.cells())
            .zip(prior.cells())
        {
            let range = a.max(b).max(c) - a.min(b).min(c);
            if range > self.change_threshold {
                sum += a as u64;
                count += 1;
            }
        }

        if count == 0 {
            let value = match self.static_fallback {
                StaticSceneFallback::Zero => 0.0,
                StaticSceneFallback::MatrixMean => current.mean(),
            };
            return (value, 0);
        }

        (sum as f64 / count as f64, count)
    }

    /// Advances the ring to the next slot.
    pub fn advance(&mut self) {
        self.ring.advance();
    }

    /// Slot the next frame will be written to.
    #[inline]
    pub fn slot_index(&self) -> usize {
        self.ring.index()
    }

    /// Whether the last observed frame used the three-frame comparison.
    #[inline]
    pub fn three_frames_captured(&self) -> bool {
        self.was_captured
    }

    /// Stored matrices.
    pub fn ring(&self) -> &FrameRing {
        &self.ring
    }

    /// Clears the ring.
    pub fn reset(&mut self) {
        self.ring.reset();
        self.was_captured = false;
    }
}

impl Default for TemporalChangeDetector {
    fn default() -> Self {
        Self::new(DEFAULT_CHANGE_THRESHOLD, StaticSceneFallback::default())
    }
}
