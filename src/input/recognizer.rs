//! Per-target gesture disambiguation.
//!
//! A [`GestureRecognizer`] turns a stream of pointer events into exactly one outcome
//! per pointer sequence: tap, double tap, long press, swipe or drag. Outcomes are
//! delivered through a caller-supplied [`GestureHandler`], and the `bool` returned by
//! the handler's fallible callbacks tells the recognizer whether the gesture was
//! consumed.
//!
//! # State machine
//!
//! ```text
//! Idle --down--> Down --timer--> LongPressArmed --move > slop (consumed)--> Dragging
//!                  |                                                          |
//!                  +--move > slop--> Cancelled                                up / lost
//!                  |                    |                                     |
//!                  +-------- up --------+--> tap | double tap | swipe        drag end / cancel
//! ```
//!
//! Time is supplied by the caller in milliseconds. Every entry point first fires the
//! timers that are due at the supplied time, so a caller that never sends explicit
//! ticks still sees deferred taps fire before the next pointer event is processed.
//!
//! Single taps are deferred by the double-tap timeout and tracked per target: a
//! pointer going down on a target with a pending tap suspends that tap, and a second
//! tap within the window turns both into a double tap. If the second sequence ends
//! as anything else, the suspended tap is dropped. Taps pending on other targets are
//! never affected.

use std::collections::HashMap;
use std::hash::Hash;

use kurbo::{Point, Vec2};

use super::direction::classify_swipe;
use super::timer::{TimerHandle, TimerQueue};
use crate::domain::GestureDirection;

/// Density-independent swipe threshold.
pub const SWIPE_THRESHOLD_DP: f64 = 48.0;

/// Thresholds used by the recognizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecognizerConfig {
    pub long_press_timeout_ms: u64,
    pub double_tap_timeout_ms: u64,
    /// Movement in pixels that cancels a pending long press and arms a drag.
    pub touch_slop_px: f64,
    /// Displacement in pixels at or above which a release is a swipe.
    pub swipe_threshold_px: f64,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            long_press_timeout_ms: 500,
            double_tap_timeout_ms: 300,
            touch_slop_px: 8.0,
            swipe_threshold_px: SWIPE_THRESHOLD_DP,
        }
    }
}

impl From<&crate::Config> for RecognizerConfig {
    fn from(config: &crate::Config) -> Self {
        Self {
            long_press_timeout_ms: config.long_press_timeout_ms,
            double_tap_timeout_ms: config.double_tap_timeout_ms,
            touch_slop_px: config.touch_slop_px,
            swipe_threshold_px: SWIPE_THRESHOLD_DP * config.density,
        }
    }
}

/// Receives gesture outcomes for a target of type `K`.
///
/// Callbacks returning `bool` report whether the gesture was consumed. A consumed
/// long press is the only way into a drag.
pub trait GestureHandler<K> {
    fn on_tap(&mut self, target: &K);
    fn on_double_tap(&mut self, target: &K) -> bool;
    fn on_long_press(&mut self, target: &K) -> bool;
    fn on_swipe(&mut self, target: &K, direction: GestureDirection) -> bool;
    fn on_drag_start(&mut self, target: &K);
    fn on_drag(&mut self, target: &K, delta: Vec2);
    fn on_drag_end(&mut self, target: &K);
    fn on_drag_cancel(&mut self, target: &K);
}

/// Observable phase of the current pointer sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognizerState {
    Idle,
    /// Pointer down, long-press timer armed.
    Down,
    /// Long-press timer fired before the pointer moved past slop.
    LongPressArmed,
    /// Pointer moved past slop before the long press; only tap or swipe remain.
    Cancelled,
    Dragging,
}

#[derive(Debug, Clone, Copy)]
enum LongPress {
    Pending(TimerHandle),
    SlopExceeded,
    Fired { consumed: bool },
}

#[derive(Debug)]
struct Sequence<K> {
    id: u64,
    target: K,
    origin: Point,
    last: Point,
    long_press: LongPress,
    dragging: bool,
}

#[derive(Debug)]
enum Timer<K> {
    LongPress { sequence: u64 },
    SingleTap { target: K },
}

#[derive(Debug, Clone, Copy)]
struct PendingTap {
    /// `None` while suspended by a pointer-down on the same target.
    timer: Option<TimerHandle>,
    up_at_ms: u64,
}

#[derive(Debug)]
pub struct GestureRecognizer<K> {
    config: RecognizerConfig,
    timers: TimerQueue<Timer<K>>,
    active: Option<Sequence<K>>,
    pending_taps: HashMap<K, PendingTap>,
    next_sequence: u64,
}

impl<K> GestureRecognizer<K>
where
    K: Clone + Eq + Hash,
{
    #[must_use]
    pub fn new(config: RecognizerConfig) -> Self {
        Self {
            config,
            timers: TimerQueue::new(),
            active: None,
            pending_taps: HashMap::new(),
            next_sequence: 0,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &RecognizerConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> RecognizerState {
        match &self.active {
            None => RecognizerState::Idle,
            Some(seq) if seq.dragging => RecognizerState::Dragging,
            Some(seq) => match seq.long_press {
                LongPress::Pending(_) => RecognizerState::Down,
                LongPress::SlopExceeded => RecognizerState::Cancelled,
                LongPress::Fired { .. } => RecognizerState::LongPressArmed,
            },
        }
    }

    /// Target of the sequence in progress, if any.
    #[must_use]
    pub fn active_target(&self) -> Option<&K> {
        self.active.as_ref().map(|seq| &seq.target)
    }

    /// Earliest time at which [`advance`](Self::advance) has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    /// Fires every timer due at `now_ms`.
    pub fn advance<H: GestureHandler<K>>(&mut self, now_ms: u64, handler: &mut H) {
        while let Some((handle, timer)) = self.timers.pop_due(now_ms) {
            match timer {
                Timer::LongPress { sequence } => self.fire_long_press(sequence, handler),
                Timer::SingleTap { target } => {
                    let current = self.pending_taps.get(&target).and_then(|pending| pending.timer);
                    if current == Some(handle) {
                        self.pending_taps.remove(&target);
                        tracing::debug!("single tap fired");
                        handler.on_tap(&target);
                    }
                }
            }
        }
    }

    fn fire_long_press<H: GestureHandler<K>>(&mut self, sequence: u64, handler: &mut H) {
        let Some(seq) = self.active.as_mut() else {
            return;
        };
        if seq.id != sequence || seq.dragging || !matches!(seq.long_press, LongPress::Pending(_)) {
            return;
        }
        let consumed = handler.on_long_press(&seq.target);
        tracing::debug!(consumed, "long press fired");
        seq.long_press = LongPress::Fired { consumed };
    }

    /// Starts a pointer sequence on `target`. Returns whether a sequence started.
    ///
    /// A second pointer going down while a sequence is active is ignored.
    pub fn on_down<H: GestureHandler<K>>(&mut self, target: K, position: Point, now_ms: u64, handler: &mut H) -> bool {
        self.advance(now_ms, handler);
        if self.active.is_some() {
            return false;
        }

        if let Some(pending) = self.pending_taps.get_mut(&target) {
            if let Some(handle) = pending.timer.take() {
                self.timers.cancel(handle);
            }
        }

        let id = self.next_sequence;
        self.next_sequence += 1;
        let handle = self.timers.schedule(
            now_ms.saturating_add(self.config.long_press_timeout_ms),
            Timer::LongPress { sequence: id },
        );
        self.active = Some(Sequence {
            id,
            target,
            origin: position,
            last: position,
            long_press: LongPress::Pending(handle),
            dragging: false,
        });
        true
    }

    /// Feeds a pointer move. Returns whether the move was consumed.
    pub fn on_move<H: GestureHandler<K>>(&mut self, position: Point, now_ms: u64, handler: &mut H) -> bool {
        self.advance(now_ms, handler);
        let slop = self.config.touch_slop_px;
        let Some(seq) = self.active.as_mut() else {
            return false;
        };

        let delta = position - seq.last;
        seq.last = position;
        let total = position - seq.origin;

        if seq.dragging {
            handler.on_drag(&seq.target, delta);
            return true;
        }

        match seq.long_press {
            LongPress::Fired { consumed: true } if total.hypot() > slop => {
                seq.dragging = true;
                tracing::debug!("drag started");
                handler.on_drag_start(&seq.target);
                handler.on_drag(&seq.target, total);
                true
            }
            LongPress::Pending(handle) if total.hypot() > slop => {
                self.timers.cancel(handle);
                seq.long_press = LongPress::SlopExceeded;
                true
            }
            _ => false,
        }
    }

    /// Ends the sequence with a pointer release. Returns whether it was consumed.
    pub fn on_up<H: GestureHandler<K>>(&mut self, position: Point, now_ms: u64, handler: &mut H) -> bool {
        self.advance(now_ms, handler);
        let Some(seq) = self.active.take() else {
            return false;
        };
        if let LongPress::Pending(handle) = seq.long_press {
            self.timers.cancel(handle);
        }

        if seq.dragging {
            self.drop_pending_tap(&seq.target);
            handler.on_drag_end(&seq.target);
            return true;
        }

        if let LongPress::Fired { consumed } = seq.long_press {
            self.drop_pending_tap(&seq.target);
            return consumed;
        }

        let total = position - seq.origin;
        if total.hypot() >= self.config.swipe_threshold_px {
            self.drop_pending_tap(&seq.target);
            let direction = classify_swipe(total);
            let consumed = handler.on_swipe(&seq.target, direction);
            tracing::debug!(%direction, consumed, "swipe");
            return consumed;
        }

        self.resolve_tap(seq.target, now_ms, handler)
    }

    fn resolve_tap<H: GestureHandler<K>>(&mut self, target: K, now_ms: u64, handler: &mut H) -> bool {
        if let Some(previous) = self.pending_taps.remove(&target) {
            if let Some(handle) = previous.timer {
                self.timers.cancel(handle);
            }
            if now_ms.saturating_sub(previous.up_at_ms) < self.config.double_tap_timeout_ms {
                let consumed = handler.on_double_tap(&target);
                tracing::debug!(consumed, "double tap");
                return consumed;
            }
        }

        let handle = self.timers.schedule(
            now_ms.saturating_add(self.config.double_tap_timeout_ms),
            Timer::SingleTap {
                target: target.clone(),
            },
        );
        self.pending_taps.insert(
            target,
            PendingTap {
                timer: Some(handle),
                up_at_ms: now_ms,
            },
        );
        true
    }

    fn drop_pending_tap(&mut self, target: &K) {
        if let Some(pending) = self.pending_taps.remove(target) {
            if let Some(handle) = pending.timer {
                self.timers.cancel(handle);
            }
        }
    }

    /// The pointer was lost (e.g. the touch was stolen by a parent). Returns whether
    /// a sequence was in progress.
    pub fn on_lost<H: GestureHandler<K>>(&mut self, now_ms: u64, handler: &mut H) -> bool {
        self.advance(now_ms, handler);
        let active = self.active.is_some();
        self.cancel(handler);
        active
    }

    /// Aborts the current sequence. Emits a drag cancel if a drag was in progress.
    /// Calling this while idle does nothing.
    pub fn cancel<H: GestureHandler<K>>(&mut self, handler: &mut H) {
        let Some(seq) = self.active.take() else {
            return;
        };
        if let LongPress::Pending(handle) = seq.long_press {
            self.timers.cancel(handle);
        }
        self.drop_pending_tap(&seq.target);
        if seq.dragging {
            handler.on_drag_cancel(&seq.target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Tap(&'static str),
        DoubleTap(&'static str),
        LongPress(&'static str),
        Swipe(&'static str, GestureDirection),
        DragStart(&'static str),
        Drag(Vec2),
        DragEnd,
        DragCancel,
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
        consume_long_press: bool,
        consume_swipe: bool,
        consume_double_tap: bool,
    }

    impl GestureHandler<&'static str> for Recorder {
        fn on_tap(&mut self, target: &&'static str) {
            self.calls.push(Call::Tap(*target));
        }
        fn on_double_tap(&mut self, target: &&'static str) -> bool {
            self.calls.push(Call::DoubleTap(*target));
            self.consume_double_tap
        }
        fn on_long_press(&mut self, target: &&'static str) -> bool {
            self.calls.push(Call::LongPress(*target));
            self.consume_long_press
        }
        fn on_swipe(&mut self, target: &&'static str, direction: GestureDirection) -> bool {
            self.calls.push(Call::Swipe(*target, direction));
            self.consume_swipe
        }
        fn on_drag_start(&mut self, target: &&'static str) {
            self.calls.push(Call::DragStart(*target));
        }
        fn on_drag(&mut self, _target: &&'static str, delta: Vec2) {
            self.calls.push(Call::Drag(delta));
        }
        fn on_drag_end(&mut self, _target: &&'static str) {
            self.calls.push(Call::DragEnd);
        }
        fn on_drag_cancel(&mut self, _target: &&'static str) {
            self.calls.push(Call::DragCancel);
        }
    }

    fn recognizer() -> GestureRecognizer<&'static str> {
        GestureRecognizer::new(RecognizerConfig::default())
    }

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn quick_release_is_a_deferred_tap() {
        let mut r = recognizer();
        let mut h = Recorder::default();
        r.on_down("a", p(0.0, 0.0), 0, &mut h);
        assert!(r.on_up(p(2.0, 1.0), 50, &mut h));
        assert!(h.calls.is_empty());

        r.advance(349, &mut h);
        assert!(h.calls.is_empty());
        r.advance(350, &mut h);
        assert_eq!(h.calls, vec![Call::Tap("a")]);
        assert_eq!(r.state(), RecognizerState::Idle);
    }

    #[test]
    fn displacement_below_threshold_never_swipes() {
        let mut r = recognizer();
        let mut h = Recorder::default();
        r.on_down("a", p(0.0, 0.0), 0, &mut h);
        r.on_move(p(30.0, 0.0), 10, &mut h);
        assert_eq!(r.state(), RecognizerState::Cancelled);
        r.on_up(p(47.9, 0.0), 20, &mut h);
        r.advance(1_000, &mut h);
        assert_eq!(h.calls, vec![Call::Tap("a")]);
    }

    #[test]
    fn displacement_at_threshold_swipes() {
        let mut r = recognizer();
        let mut h = Recorder {
            consume_swipe: true,
            ..Recorder::default()
        };
        r.on_down("a", p(100.0, 100.0), 0, &mut h);
        assert!(r.on_up(p(100.0, 52.0), 80, &mut h));
        r.advance(1_000, &mut h);
        assert_eq!(h.calls, vec![Call::Swipe("a", GestureDirection::Up)]);
    }

    #[test]
    fn clock_near_its_limit_still_schedules_timers() {
        let mut r = recognizer();
        let mut h = Recorder::default();
        r.on_down("b", p(0.0, 0.0), u64::MAX - 200, &mut h);
        assert!(r.on_up(p(1.0, 0.0), u64::MAX - 100, &mut h));
        assert!(h.calls.is_empty());
        r.advance(u64::MAX, &mut h);
        assert_eq!(h.calls, vec![Call::Tap("b")]);

        r.on_down("a", p(0.0, 0.0), u64::MAX - 50, &mut h);
        r.advance(u64::MAX, &mut h);
        assert_eq!(h.calls, vec![Call::Tap("b"), Call::LongPress("a")]);
    }

    #[test]
    fn second_tap_within_window_is_a_double_tap() {
        let mut r = recognizer();
        let mut h = Recorder {
            consume_double_tap: true,
            ..Recorder::default()
        };
        r.on_down("a", p(0.0, 0.0), 0, &mut h);
        r.on_up(p(0.0, 0.0), 40, &mut h);
        r.on_down("a", p(0.0, 0.0), 150, &mut h);
        assert!(r.on_up(p(0.0, 0.0), 200, &mut h));
        r.advance(2_000, &mut h);
        assert_eq!(h.calls, vec![Call::DoubleTap("a")]);
    }

    #[test]
    fn taps_on_different_targets_do_not_interfere() {
        let mut r = recognizer();
        let mut h = Recorder::default();
        r.on_down("a", p(0.0, 0.0), 0, &mut h);
        r.on_up(p(0.0, 0.0), 40, &mut h);
        r.on_down("b", p(0.0, 0.0), 100, &mut h);
        r.on_up(p(0.0, 0.0), 140, &mut h);
        r.advance(2_000, &mut h);
        assert_eq!(h.calls, vec![Call::Tap("a"), Call::Tap("b")]);
    }

    #[test]
    fn suspended_tap_is_dropped_when_second_sequence_swipes() {
        let mut r = recognizer();
        let mut h = Recorder::default();
        r.on_down("a", p(0.0, 0.0), 0, &mut h);
        r.on_up(p(0.0, 0.0), 40, &mut h);
        r.on_down("a", p(0.0, 0.0), 100, &mut h);
        r.on_up(p(200.0, 0.0), 420, &mut h);
        r.advance(2_000, &mut h);
        assert_eq!(h.calls, vec![Call::Swipe("a", GestureDirection::Right)]);
    }

    #[test]
    fn consumed_long_press_then_slop_starts_drag() {
        let mut r = recognizer();
        let mut h = Recorder {
            consume_long_press: true,
            ..Recorder::default()
        };
        r.on_down("a", p(10.0, 10.0), 0, &mut h);
        r.advance(500, &mut h);
        assert_eq!(r.state(), RecognizerState::LongPressArmed);

        r.on_move(p(12.0, 10.0), 510, &mut h);
        assert_eq!(r.state(), RecognizerState::LongPressArmed);
        assert!(r.on_move(p(30.0, 10.0), 520, &mut h));
        assert!(r.on_move(p(35.0, 15.0), 530, &mut h));
        assert!(r.on_up(p(35.0, 15.0), 540, &mut h));

        assert_eq!(
            h.calls,
            vec![
                Call::LongPress("a"),
                Call::DragStart("a"),
                Call::Drag(Vec2::new(20.0, 0.0)),
                Call::Drag(Vec2::new(5.0, 5.0)),
                Call::DragEnd,
            ]
        );
    }

    #[test]
    fn unconsumed_long_press_blocks_tap_and_drag() {
        let mut r = recognizer();
        let mut h = Recorder::default();
        r.on_down("a", p(0.0, 0.0), 0, &mut h);
        r.on_move(p(20.0, 0.0), 600, &mut h);
        assert!(!r.on_up(p(100.0, 0.0), 700, &mut h));
        r.advance(2_000, &mut h);
        assert_eq!(h.calls, vec![Call::LongPress("a")]);
    }

    #[test]
    fn slop_before_timeout_cancels_long_press() {
        let mut r = recognizer();
        let mut h = Recorder::default();
        r.on_down("a", p(0.0, 0.0), 0, &mut h);
        r.on_move(p(9.0, 0.0), 100, &mut h);
        r.advance(5_000, &mut h);
        assert!(h.calls.is_empty());
        assert_eq!(r.state(), RecognizerState::Cancelled);
    }

    #[test]
    fn lost_pointer_cancels_drag_once() {
        let mut r = recognizer();
        let mut h = Recorder {
            consume_long_press: true,
            ..Recorder::default()
        };
        r.on_down("a", p(0.0, 0.0), 0, &mut h);
        r.advance(500, &mut h);
        r.on_move(p(50.0, 0.0), 600, &mut h);
        r.on_lost(610, &mut h);
        r.on_lost(620, &mut h);
        r.cancel(&mut h);

        let cancels = h.calls.iter().filter(|c| **c == Call::DragCancel).count();
        assert_eq!(cancels, 1);
        assert_eq!(r.state(), RecognizerState::Idle);
    }

    #[test]
    fn deferred_tap_fires_before_next_down_is_processed() {
        let mut r = recognizer();
        let mut h = Recorder::default();
        r.on_down("a", p(0.0, 0.0), 0, &mut h);
        r.on_up(p(0.0, 0.0), 10, &mut h);
        r.on_down("a", p(0.0, 0.0), 400, &mut h);
        assert_eq!(h.calls, vec![Call::Tap("a")]);
    }

    #[test]
    fn config_scales_swipe_threshold_by_density() {
        let config = crate::Config {
            density: 2.5,
            ..crate::Config::default()
        };
        let recognizer_config = RecognizerConfig::from(&config);
        assert!((recognizer_config.swipe_threshold_px - 120.0).abs() < f64::EPSILON);
    }
}
