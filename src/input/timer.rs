//! Cancellable one-shot timers driven by an external clock.
//!
//! The recognizer never sleeps. Callers schedule payloads against a deadline in
//! milliseconds and later call [`TimerQueue::pop_due`] with the current time. A
//! cancelled handle is removed from the queue immediately, so it can never be
//! returned afterwards.

use std::collections::BTreeMap;

/// Handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Debug)]
pub struct TimerQueue<T> {
    next_id: u64,
    // (deadline, id) keeps due timers in firing order with insertion as tie-break
    pending: BTreeMap<(u64, u64), T>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            pending: BTreeMap::new(),
        }
    }
}

impl<T> TimerQueue<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, deadline_ms: u64, payload: T) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.pending.insert((deadline_ms, id), payload);
        TimerHandle(id)
    }

    /// Cancels a timer. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let key = self.pending.keys().find(|(_, id)| *id == handle.0).copied();
        key.is_some_and(|key| self.pending.remove(&key).is_some())
    }

    #[must_use]
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.keys().any(|(_, id)| *id == handle.0)
    }

    /// Earliest deadline still pending.
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.pending.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Removes and returns the earliest timer whose deadline is at or before `now_ms`.
    ///
    /// Callers loop on this rather than draining everything at once, since firing
    /// one timer may cancel others.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(TimerHandle, T)> {
        let key = *self.pending.keys().next()?;
        if key.0 > now_ms {
            return None;
        }
        self.pending.remove(&key).map(|payload| (TimerHandle(key.1), payload))
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timers_fire_in_deadline_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(300, "late");
        queue.schedule(100, "early");
        queue.schedule(100, "early-second");

        assert_eq!(queue.next_deadline(), Some(100));
        assert!(queue.pop_due(99).is_none());
        assert_eq!(queue.pop_due(300).map(|(_, p)| p), Some("early"));
        assert_eq!(queue.pop_due(300).map(|(_, p)| p), Some("early-second"));
        assert_eq!(queue.pop_due(300).map(|(_, p)| p), Some("late"));
        assert!(queue.is_empty());
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut queue = TimerQueue::new();
        let handle = queue.schedule(10, ());
        assert!(queue.is_pending(handle));
        assert!(queue.cancel(handle));
        assert!(!queue.cancel(handle));
        assert!(queue.pop_due(1_000).is_none());
    }
}
