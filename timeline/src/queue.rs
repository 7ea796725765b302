//! Event queue ordered by timestep
//!
//! A min-priority queue over [`Event`]s built on `BinaryHeap`. Entries
//! compare by `(timestep, insertion sequence)` in reverse, so the max-heap
//! pops the earliest event first and events sharing a timestep pop in the
//! order they were inserted.
//!
//! Payloads never take part in ordering.
//!
//! # Example
//!
//! ```rust
//! use timeline_core::{Event, EventQueue};
//!
//! let mut queue = EventQueue::new();
//! queue.insert_at(9, "late");
//! queue.insert_at(2, "early");
//!
//! assert_eq!(queue.peek_timestep(), Some(2));
//! let first = queue.pop_min().unwrap();
//! assert_eq!(first.payload_as::<&str>(), Ok(&"early"));
//! ```

use crate::core::time::Tick;
use crate::models::Event;
use std::any::Any;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Heap entry: the event plus its insertion sequence number
#[derive(Debug)]
struct QueuedEvent {
    seq: u64,
    event: Event,
}

impl QueuedEvent {
    fn key(&self) -> (Tick, u64) {
        (self.event.timestep(), self.seq)
    }
}

impl PartialEq for QueuedEvent {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for QueuedEvent {}

impl PartialOrd for QueuedEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// BinaryHeap is a max-heap, so the ordering is reversed for min-first pops.
impl Ord for QueuedEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key()).reverse()
    }
}

/// Ordered multiset of pending events
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<QueuedEvent>,
    next_seq: u64,
}

impl EventQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an event. O(log n).
    ///
    /// There is no constraint on the timestep: it may lie in the past, and
    /// any number of events may share it.
    pub fn insert(&mut self, event: Event) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(QueuedEvent { seq, event });
    }

    /// Build and insert an event carrying `value` at `timestep`
    pub fn insert_at<T: Any + Clone>(&mut self, timestep: Tick, value: T) {
        self.insert(Event::new(timestep, value));
    }

    /// The earliest event, without removing it
    pub fn peek_min(&self) -> Option<&Event> {
        self.heap.peek().map(|entry| &entry.event)
    }

    /// Timestep of the earliest event
    pub fn peek_timestep(&self) -> Option<Tick> {
        self.peek_min().map(Event::timestep)
    }

    /// Remove and return the earliest event
    pub fn pop_min(&mut self) -> Option<Event> {
        self.heap.pop().map(|entry| entry.event)
    }

    /// Remove and return the earliest event if it is due at `tick`
    pub fn pop_due(&mut self, tick: Tick) -> Option<Event> {
        match self.peek_timestep() {
            Some(timestep) if timestep <= tick => self.pop_min(),
            _ => None,
        }
    }

    /// Number of queued events
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl Extend<Event> for EventQueue {
    fn extend<I: IntoIterator<Item = Event>>(&mut self, iter: I) {
        for event in iter {
            self.insert(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain_ticks(queue: &mut EventQueue) -> Vec<Tick> {
        std::iter::from_fn(|| queue.pop_min())
            .map(|event| event.timestep())
            .collect()
    }

    #[test]
    fn test_empty_queue() {
        let mut queue = EventQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
        assert!(queue.peek_min().is_none());
        assert!(queue.pop_min().is_none());
    }

    #[test]
    fn test_pops_in_ascending_timestep() {
        let mut queue = EventQueue::new();
        for tick in [8, 1, 9, 4, 3, 4, -2] {
            queue.insert_at(tick, ());
        }

        assert_eq!(queue.len(), 7);
        assert_eq!(drain_ticks(&mut queue), vec![-2, 1, 3, 4, 4, 8, 9]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_ties_pop_in_insertion_order() {
        let mut queue = EventQueue::new();
        queue.insert_at(4, "first");
        queue.insert_at(2, "unrelated");
        queue.insert_at(4, "second");
        queue.insert_at(4, "third");

        queue.pop_min();
        let order: Vec<&str> = std::iter::from_fn(|| queue.pop_min())
            .map(|event| *event.payload_as::<&str>().unwrap())
            .collect();
        assert_eq!(order, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_repeated_peek_is_stable() {
        let mut queue = EventQueue::new();
        queue.insert_at(5, 'a');
        queue.insert_at(5, 'b');

        let first = *queue.peek_min().unwrap().payload_as::<char>().unwrap();
        let second = *queue.peek_min().unwrap().payload_as::<char>().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_pop_due_respects_tick() {
        let mut queue = EventQueue::new();
        queue.insert_at(3, ());

        assert!(queue.pop_due(2).is_none());
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pop_due(3).map(|e| e.timestep()), Some(3));
        assert!(queue.pop_due(100).is_none());
    }

    #[test]
    fn test_extend() {
        let mut queue = EventQueue::new();
        queue.extend(vec![Event::new(2, ()), Event::new(1, ())]);
        assert_eq!(queue.peek_timestep(), Some(1));
    }
}
