//! LED on/off state machine and the packed three-slot history code.

use super::history::{BrightnessHistory, DynamicRange, HISTORY_DEPTH};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether the indicator is lit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedState {
    /// Dark, or below the adaptive threshold.
    #[default]
    Off,
    /// At or above the adaptive threshold.
    On,
}

impl LedState {
    /// `On` when `sample >= threshold`.
    #[inline]
    pub fn from_threshold(sample: f64, threshold: f64) -> Self {
        if sample >= threshold {
            Self::On
        } else {
            Self::Off
        }
    }

    /// Whether the indicator is lit.
    #[inline]
    pub fn is_on(self) -> bool {
        self == Self::On
    }
}

impl fmt::Display for LedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Off => "off",
            Self::On => "on",
        })
    }
}

/// One on/off decision per ring slot, packed slot 0 into the high bit.
///
/// `packed() == slot0 << 2 | slot1 << 1 | slot2`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LedHistoryCode {
    slots: [bool; HISTORY_DEPTH],
}

impl LedHistoryCode {
    /// Unpacks a 3-bit code; higher bits are ignored.
    pub fn from_packed(code: u8) -> Self {
        Self {
            slots: [code & 0b100 != 0, code & 0b010 != 0, code & 0b001 != 0],
        }
    }

    /// Records the decision for `slot`. Slots past the history depth are ignored.
    pub fn set(&mut self, slot: usize, on: bool) {
        if let Some(entry) = self.slots.get_mut(slot) {
            *entry = on;
        }
    }

    /// Decision recorded for `slot`, or `None` past the history depth.
    pub fn slot(&self, slot: usize) -> Option<bool> {
        self.slots.get(slot).copied()
    }

    /// Packed code in `0..=7`.
    pub fn packed(&self) -> u8 {
        self.slots
            .iter()
            .fold(0u8, |code, &on| (code << 1) | u8::from(on))
    }
}

impl fmt::Display for LedHistoryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03b}", self.packed())
    }
}

/// Outcome of one state machine step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedDecision {
    /// State of the sample just applied.
    pub state: LedState,
    /// Threshold the sample was judged against.
    pub threshold: f64,
    /// Dynamic range of the history the threshold came from.
    pub range: DynamicRange,
    /// History code after this step.
    pub code: LedHistoryCode,
    /// Whether the state differs from the previous step.
    pub toggled: bool,
}

/// Thresholds each brightness sample against the adaptive midpoint.
///
/// The decision is a pure level test re-evaluated every frame, not an
/// edge detector. When the third slot of a cycle is written, the decisions
/// for slots 0 and 1 are re-judged against that cycle's final midpoint.
#[derive(Debug, Clone, Default)]
pub struct LedStateMachine {
    state: LedState,
    code: LedHistoryCode,
}

impl LedStateMachine {
    /// Creates a machine in the `Off` state with an all-zero code.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies the sample just pushed into `history` at `slot`.
    ///
    /// A `slot` past the history depth still updates the state but leaves
    /// the code untouched.
    pub fn update(&mut self, history: &BrightnessHistory, sample: f64, slot: usize) -> LedDecision {
        let range = history.range().unwrap_or(DynamicRange {
            min: sample,
            max: sample,
        });
        let threshold = range.midpoint();

        let state = LedState::from_threshold(sample, threshold);
        let toggled = state != self.state;
        self.state = state;
        self.code.set(slot, state.is_on());

        if slot == HISTORY_DEPTH - 1 {
            for earlier in 0..slot {
                if let Some(past) = history.get(earlier) {
                    self.code.set(earlier, past >= threshold);
                }
            }
        }

        if toggled {
            tracing::info!(
                state = %state,
                brightness = sample,
                threshold,
                "LED state changed"
            );
        }

        LedDecision {
            state,
            threshold,
            range,
            code: self.code,
            toggled,
        }
    }

    /// Current LED state.
    #[inline]
    pub fn state(&self) -> LedState {
        self.state
    }

    /// Current history code.
    #[inline]
    pub fn code(&self) -> LedHistoryCode {
        self.code
    }

    /// Back to `Off` with an all-zero code.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
