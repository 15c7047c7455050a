//! Cooperative timer queue.
//!
//! Nothing here sleeps or spawns. Events are stored with a deadline and
//! handed back by `pop_due` once the caller's clock has passed it; the owner
//! decides what firing means. Cancelled events are simply removed.
//!
//! ```
//! use std::time::{Duration, Instant};
//! use memory_match::rules::TimerQueue;
//!
//! let start = Instant::now();
//! let mut timers = TimerQueue::new();
//! let early = timers.schedule(start + Duration::from_millis(10), "early");
//! timers.schedule(start + Duration::from_millis(20), "late");
//!
//! assert_eq!(timers.next_deadline(), Some(start + Duration::from_millis(10)));
//! assert!(timers.pop_due(start).is_empty());
//! assert_eq!(timers.pop_due(start + Duration::from_millis(15)), vec!["early"]);
//! assert_eq!(timers.cancel(early), None);
//! assert_eq!(timers.cancel_all(), 1);
//! ```

use std::time::Instant;

/// Handle for cancelling a scheduled event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Clone, Debug)]
struct Scheduled<E> {
    id: TimerId,
    due: Instant,
    event: E,
}

/// Deadline-ordered queue of deferred events.
#[derive(Clone, Debug)]
pub struct TimerQueue<E> {
    entries: Vec<Scheduled<E>>,
    next_id: u64,
}

impl<E> TimerQueue<E> {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Schedule `event` to fire at `due`.
    pub fn schedule(&mut self, due: Instant, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;

        // Keep entries sorted by deadline; equal deadlines fire in schedule order.
        let index = self.entries.partition_point(|entry| entry.due <= due);
        self.entries.insert(index, Scheduled { id, due, event });
        id
    }

    /// Cancel one event, returning it if it had not fired yet.
    pub fn cancel(&mut self, id: TimerId) -> Option<E> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(index).event)
    }

    /// Cancel every event matching `predicate`. Returns how many were removed.
    pub fn cancel_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&E) -> bool,
    {
        let before = self.entries.len();
        self.entries.retain(|entry| !predicate(&entry.event));
        before - self.entries.len()
    }

    /// Cancel everything. Returns how many events were pending.
    pub fn cancel_all(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.first().map(|entry| entry.due)
    }

    /// Remove and return every event due at or before `now`, earliest first.
    pub fn pop_due(&mut self, now: Instant) -> Vec<E> {
        let split = self.entries.partition_point(|entry| entry.due <= now);
        self.entries.drain(..split).map(|entry| entry.event).collect()
    }

    /// Number of pending events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}
