//! Brightness history and LED state tracking.
//!
//! Brightness samples from the extraction stage feed a three-deep history
//! whose midpoint is the adaptive on/off threshold. The state machine
//! judges each sample against it and keeps a packed code of the last
//! three decisions.

mod history;
mod state;

pub use history::{BrightnessHistory, DynamicRange, HISTORY_DEPTH};
pub use state::{LedDecision, LedHistoryCode, LedState, LedStateMachine};
