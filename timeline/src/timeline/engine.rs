//! Timeline Engine
//!
//! Owns the event queue, the subscriber registry and the tick clock, and
//! implements the advance loop:
//!
//! ```text
//! On each advance:
//! 1. Increment the current tick
//! 2. Release events held back by an enclosing dispatch into the queue
//! 3. Prune subscribers whose tokens were dropped
//! 4. While the earliest queued event is due (timestep <= current tick):
//!    a. Pop it
//!    b. Snapshot the registry
//!    c. Deliver it to every live subscriber in the snapshot, in
//!       registration order
//! 5. Release events that subscribers enqueued during step 4
//! ```
//!
//! # Re-entrancy
//!
//! Subscribers usually need to talk back to the timeline: schedule follow-up
//! events, register more subscribers, or drop their own token. They do so
//! through a [`TimelineHandle`], which is why every operation here takes
//! `&self`. No internal borrow is held while a subscriber runs.
//!
//! - An event enqueued from inside a subscriber with a timestep that is
//!   already due is held back until the next advance starts (nested or not),
//!   so a subscriber that re-queues itself cannot loop within one advance.
//!   Future events go straight into the queue.
//! - Subscribers registered from inside a subscriber receive nothing from the
//!   tick in progress.
//! - Dropping a token from inside a subscriber takes effect for every
//!   delivery that has not happened yet.
//! - A subscriber may call `advance` itself. The nested advance delivers to
//!   every live subscriber, including the one that called it.
//!
//! # Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use timeline_core::{Event, Timeline};
//!
//! let timeline = Timeline::new();
//! let seen = Rc::new(RefCell::new(Vec::new()));
//!
//! let sink = Rc::clone(&seen);
//! let _token = timeline.subscribe(move |event: &Event| {
//!     sink.borrow_mut().push(*event.payload_as::<u32>().unwrap());
//! });
//!
//! timeline.emplace(2, 20_u32);
//! timeline.emplace(1, 10_u32);
//!
//! timeline.advance();
//! assert_eq!(*seen.borrow(), vec![10]);
//!
//! timeline.advance();
//! assert_eq!(*seen.borrow(), vec![10, 20]);
//! assert_eq!(timeline.current_tick(), 2);
//! ```

use crate::core::time::{Tick, TickClock};
use crate::models::Event;
use crate::queue::EventQueue;
use crate::subscription::{Subscriber, SubscriberRegistry, Token};
use crate::timeline::config::TimelineConfig;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::mem;
use std::rc::{Rc, Weak};
use thiserror::Error;

// ============================================================================
// Result and Error Types
// ============================================================================

/// Summary of a single advance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// Tick reached by the advance
    pub tick: Tick,

    /// Number of events popped and dispatched
    pub events_dispatched: usize,

    /// Total subscriber invocations across all dispatched events
    pub deliveries: usize,

    /// Number of dead registry entries removed before dispatch
    pub subscribers_pruned: usize,
}

/// Errors raised through a [`TimelineHandle`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimelineError {
    #[error("Timeline has been dropped")]
    Dropped,
}

// ============================================================================
// Shared State
// ============================================================================

struct Shared {
    clock: Cell<TickClock>,
    queue: RefCell<EventQueue>,
    registry: RefCell<SubscriberRegistry>,

    /// Already-due events pushed while a dispatch is in progress
    deferred: RefCell<Vec<Event>>,

    /// Number of advances currently on the call stack
    dispatch_depth: Cell<usize>,
}

impl Shared {
    fn new(config: &TimelineConfig) -> Self {
        Self {
            clock: Cell::new(TickClock::starting_at(config.start_tick)),
            queue: RefCell::new(EventQueue::new()),
            registry: RefCell::new(SubscriberRegistry::new()),
            deferred: RefCell::new(Vec::new()),
            dispatch_depth: Cell::new(0),
        }
    }

    fn current_tick(&self) -> Tick {
        self.clock.get().current_tick()
    }

    fn subscribe<S>(&self, subscriber: S) -> Token
    where
        S: Subscriber + 'static,
    {
        self.registry.borrow_mut().subscribe(subscriber)
    }

    fn push(&self, event: Event) {
        let dispatching = self.dispatch_depth.get() > 0;
        if dispatching && self.clock.get().is_due(event.timestep()) {
            self.deferred.borrow_mut().push(event);
        } else {
            self.queue.borrow_mut().insert(event);
        }
    }

    /// Move held-back events into the queue
    fn release_deferred(&self) {
        let deferred = mem::take(&mut *self.deferred.borrow_mut());
        if !deferred.is_empty() {
            log::trace!("releasing {} deferred event(s)", deferred.len());
            self.queue.borrow_mut().extend(deferred);
        }
    }

    fn advance(&self) -> TickReport {
        let mut clock = self.clock.get();
        let tick = clock.advance_tick();
        self.clock.set(clock);

        // Held back by an enclosing dispatch; this is the advance after it.
        self.release_deferred();

        // Subscriptions created from here on must not see this tick.
        let (subscribers_pruned, watermark) = {
            let mut registry = self.registry.borrow_mut();
            (registry.prune(), registry.next_id())
        };

        let mut report = TickReport {
            tick,
            events_dispatched: 0,
            deliveries: 0,
            subscribers_pruned,
        };

        let guard = DispatchGuard::enter(self);
        loop {
            let next = self.queue.borrow_mut().pop_due(tick);
            let Some(event) = next else {
                break;
            };

            let snapshot = self
                .registry
                .borrow()
                .snapshot()
                .registered_before(watermark);
            log::trace!(
                "tick {}: dispatching {:?} (timestep {}) to {} subscriber(s)",
                tick,
                event.payload(),
                event.timestep(),
                snapshot.len()
            );

            report.deliveries += snapshot.deliver(&event);
            report.events_dispatched += 1;
        }
        drop(guard);

        log::debug!(
            "tick {}: {} event(s), {} delivery(ies), {} subscriber(s) pruned",
            report.tick,
            report.events_dispatched,
            report.deliveries,
            report.subscribers_pruned
        );
        report
    }

    fn pending_events(&self) -> usize {
        self.queue.borrow().len() + self.deferred.borrow().len()
    }
}

/// Tracks dispatch nesting; the outermost exit releases deferred events into
/// the queue, including when a subscriber panics.
struct DispatchGuard<'a> {
    shared: &'a Shared,
}

impl<'a> DispatchGuard<'a> {
    fn enter(shared: &'a Shared) -> Self {
        shared.dispatch_depth.set(shared.dispatch_depth.get() + 1);
        Self { shared }
    }
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        let depth = self.shared.dispatch_depth.get() - 1;
        self.shared.dispatch_depth.set(depth);
        if depth == 0 {
            self.shared.release_deferred();
        }
    }
}

// ============================================================================
// Timeline
// ============================================================================

/// Discrete-event scheduler
///
/// Events are queued for a target tick and delivered, in timestep order, to
/// every live subscriber when [`Timeline::advance`] reaches that tick.
/// Events sharing a timestep are delivered in the order they were queued.
///
/// The timeline is single-threaded (`!Send`); all subscribers run inline on
/// the thread calling `advance`.
pub struct Timeline {
    shared: Rc<Shared>,
}

impl Timeline {
    /// Create an empty timeline at tick 0
    pub fn new() -> Self {
        Self::with_config(TimelineConfig::default())
    }

    /// Create an empty timeline from a configuration
    pub fn with_config(config: TimelineConfig) -> Self {
        Self {
            shared: Rc::new(Shared::new(&config)),
        }
    }

    /// Register a subscriber
    ///
    /// The subscriber receives every event dispatched while the returned
    /// token is alive, starting with the next advance.
    pub fn subscribe<S>(&self, subscriber: S) -> Token
    where
        S: Subscriber + 'static,
    {
        self.shared.subscribe(subscriber)
    }

    /// Queue `value` for delivery at `timestep`
    ///
    /// Never dispatches by itself: an event whose timestep has already been
    /// reached goes out on the next advance, even when queued by a
    /// subscriber during dispatch.
    pub fn emplace<T: Any + Clone>(&self, timestep: Tick, value: T) {
        self.push(Event::new(timestep, value));
    }

    /// Alias of [`Timeline::emplace`]
    pub fn enqueue<T: Any + Clone>(&self, timestep: Tick, value: T) {
        self.emplace(timestep, value);
    }

    /// Queue an already-built event
    pub fn push(&self, event: Event) {
        self.shared.push(event);
    }

    /// Advance one tick and dispatch every event now due
    pub fn advance(&self) {
        self.shared.advance();
    }

    /// Advance one tick and report what happened
    pub fn advance_with_report(&self) -> TickReport {
        self.shared.advance()
    }

    /// Advance until the current tick equals `tick`
    ///
    /// Returns one report per advance; empty if `tick` has already been
    /// reached.
    pub fn run_until(&self, tick: Tick) -> Vec<TickReport> {
        let mut reports = Vec::new();
        while self.current_tick() < tick {
            reports.push(self.shared.advance());
        }
        reports
    }

    /// The current tick
    pub fn current_tick(&self) -> Tick {
        self.shared.current_tick()
    }

    /// Number of events not yet dispatched
    pub fn pending_events(&self) -> usize {
        self.shared.pending_events()
    }

    /// Timestep of the earliest queued event
    pub fn next_event_tick(&self) -> Option<Tick> {
        self.shared.queue.borrow().peek_timestep()
    }

    /// Number of subscribers whose tokens are alive
    pub fn subscriber_count(&self) -> usize {
        self.shared.registry.borrow().live_count()
    }

    /// Non-owning handle for use inside subscribers
    pub fn handle(&self) -> TimelineHandle {
        TimelineHandle {
            shared: Rc::downgrade(&self.shared),
        }
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timeline")
            .field("current_tick", &self.current_tick())
            .field("pending_events", &self.pending_events())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Handle
// ============================================================================

/// Weak, clonable reference to a [`Timeline`]
///
/// Subscribers capture a handle to call back into the timeline that is
/// dispatching to them. A handle does not keep the timeline alive; once the
/// timeline is dropped every call fails with [`TimelineError::Dropped`].
#[derive(Clone)]
pub struct TimelineHandle {
    shared: Weak<Shared>,
}

impl TimelineHandle {
    fn upgrade(&self) -> Result<Rc<Shared>, TimelineError> {
        self.shared.upgrade().ok_or(TimelineError::Dropped)
    }

    /// Check whether the timeline still exists
    pub fn is_alive(&self) -> bool {
        self.shared.strong_count() > 0
    }

    /// See [`Timeline::subscribe`]
    pub fn subscribe<S>(&self, subscriber: S) -> Result<Token, TimelineError>
    where
        S: Subscriber + 'static,
    {
        Ok(self.upgrade()?.subscribe(subscriber))
    }

    /// See [`Timeline::emplace`]
    pub fn emplace<T: Any + Clone>(&self, timestep: Tick, value: T) -> Result<(), TimelineError> {
        self.push(Event::new(timestep, value))
    }

    /// See [`Timeline::push`]
    pub fn push(&self, event: Event) -> Result<(), TimelineError> {
        self.upgrade()?.push(event);
        Ok(())
    }

    /// See [`Timeline::advance_with_report`]
    pub fn advance(&self) -> Result<TickReport, TimelineError> {
        Ok(self.upgrade()?.advance())
    }

    /// See [`Timeline::current_tick`]
    pub fn current_tick(&self) -> Result<Tick, TimelineError> {
        Ok(self.upgrade()?.current_tick())
    }
}

impl fmt::Debug for TimelineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimelineHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_timeline_is_empty() {
        let timeline = Timeline::new();
        assert_eq!(timeline.current_tick(), 0);
        assert_eq!(timeline.pending_events(), 0);
        assert_eq!(timeline.subscriber_count(), 0);
        assert_eq!(timeline.next_event_tick(), None);
    }

    #[test]
    fn test_start_tick_from_config() {
        let timeline = Timeline::with_config(TimelineConfig { start_tick: 41 });
        timeline.emplace(42, ());

        let report = timeline.advance_with_report();
        assert_eq!(report.tick, 42);
        assert_eq!(report.events_dispatched, 1);
    }

    #[test]
    fn test_event_without_subscribers_is_still_consumed() {
        let timeline = Timeline::new();
        timeline.emplace(1, "nobody listens");

        let report = timeline.advance_with_report();
        assert_eq!(report.events_dispatched, 1);
        assert_eq!(report.deliveries, 0);
        assert_eq!(timeline.pending_events(), 0);
    }

    #[test]
    fn test_past_event_waits_for_next_advance() {
        let timeline = Timeline::new();
        timeline.run_until(5);

        timeline.emplace(2, ());
        assert_eq!(timeline.pending_events(), 1);

        let report = timeline.advance_with_report();
        assert_eq!(report.tick, 6);
        assert_eq!(report.events_dispatched, 1);
    }

    #[test]
    fn test_run_until_is_noop_when_reached() {
        let timeline = Timeline::new();
        assert_eq!(timeline.run_until(3).len(), 3);
        assert!(timeline.run_until(3).is_empty());
        assert!(timeline.run_until(-1).is_empty());
        assert_eq!(timeline.current_tick(), 3);
    }

    #[test]
    fn test_report_counts_pruned_subscribers() {
        let timeline = Timeline::new();
        let a = timeline.subscribe(|_: &Event| {});
        let _b = timeline.subscribe(|_: &Event| {});
        drop(a);

        assert_eq!(timeline.advance_with_report().subscribers_pruned, 1);
        assert_eq!(timeline.advance_with_report().subscribers_pruned, 0);
    }

    #[test]
    fn test_handle_fails_after_drop() {
        let timeline = Timeline::new();
        let handle = timeline.handle();
        assert!(handle.is_alive());
        assert_eq!(handle.current_tick(), Ok(0));

        drop(timeline);
        assert!(!handle.is_alive());
        assert_eq!(handle.emplace(1, ()), Err(TimelineError::Dropped));
        assert_eq!(handle.advance(), Err(TimelineError::Dropped));
        assert!(handle.subscribe(|_: &Event| {}).is_err());
    }

    #[test]
    fn test_debug_output() {
        let timeline = Timeline::new();
        timeline.emplace(3, ());
        let debug = format!("{:?}", timeline);
        assert!(debug.contains("current_tick: 0"));
        assert!(debug.contains("pending_events: 1"));
    }
}
