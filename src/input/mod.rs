//! Pointer input: gesture recognition and swipe classification.
//!
//! - [`direction`]: 8-way swipe bucketing
//! - [`timer`]: cancellable timers driven by caller-supplied time
//! - [`recognizer`]: the per-sequence tap / long-press / swipe / drag state machine

pub mod direction;
pub mod recognizer;
pub mod timer;

pub use direction::{classify_swipe, direction_for_angle};
pub use recognizer::{GestureHandler, GestureRecognizer, RecognizerConfig, RecognizerState, SWIPE_THRESHOLD_DP};
pub use timer::{TimerHandle, TimerQueue};
