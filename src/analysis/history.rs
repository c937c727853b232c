//! Short brightness history and the adaptive on/off threshold.

/// Number of brightness samples kept.
pub const HISTORY_DEPTH: usize = 3;

/// Min/max over the valid history samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DynamicRange {
    /// Darkest valid sample.
    pub min: f64,
    /// Brightest valid sample.
    pub max: f64,
}

impl DynamicRange {
    /// Adaptive threshold halfway between the darkest and brightest sample.
    #[inline]
    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

/// Circular buffer of the last three brightness samples.
///
/// Samples are written in slot order 0, 1, 2, 0, ... so the write cursor
/// always matches the frame ring index.
#[derive(Debug, Clone, Default)]
pub struct BrightnessHistory {
    samples: [f64; HISTORY_DEPTH],
    cursor: usize,
    full: bool,
}

impl BrightnessHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a sample over the oldest one and returns the slot written.
    pub fn push(&mut self, sample: f64) -> usize {
        let slot = self.cursor;
        self.samples[slot] = sample;
        self.cursor = (self.cursor + 1) % HISTORY_DEPTH;
        if self.cursor == 0 {
            self.full = true;
        }
        slot
    }

    /// Number of valid samples (0 to 3).
    #[inline]
    pub fn len(&self) -> usize {
        if self.full {
            HISTORY_DEPTH
        } else {
            self.cursor
        }
    }

    /// True before the first sample.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True once the buffer has wrapped at least once.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Valid samples in slot order.
    #[inline]
    pub fn samples(&self) -> &[f64] {
        &self.samples[..self.len()]
    }

    /// Returns the sample in `slot`, if it has been written.
    pub fn get(&self, slot: usize) -> Option<f64> {
        self.samples().get(slot).copied()
    }

    /// Running min/max over the valid samples.
    pub fn range(&self) -> Option<DynamicRange> {
        let samples = self.samples();
        let (&first, rest) = samples.split_first()?;
        Some(rest.iter().fold(
            DynamicRange {
                min: first,
                max: first,
            },
            |acc, &s| DynamicRange {
                min: acc.min.min(s),
                max: acc.max.max(s),
            },
        ))
    }

    /// Forgets every sample.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
