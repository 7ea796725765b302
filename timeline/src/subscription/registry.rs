//! Subscriber registry
//!
//! Holds `Weak` references to subscriber cells in registration order.
//! Liveness is checked per dispatch attempt by upgrading the reference, so a
//! subscriber whose token is dropped mid-tick misses exactly the deliveries
//! that had not reached it yet.

use super::token::Token;
use super::{Subscriber, SubscriptionId};
use crate::models::Event;
use std::rc::{Rc, Weak};

/// Shared cell owning a subscriber; strongly owned only by its [`Token`]
pub struct SubscriptionCell {
    id: SubscriptionId,
    subscriber: Box<dyn Subscriber>,
}

impl SubscriptionCell {
    pub(crate) fn id(&self) -> SubscriptionId {
        self.id
    }

    fn deliver(&self, event: &Event) {
        self.subscriber.on_event(event);
    }
}

/// Non-owning registry entry
#[derive(Clone)]
struct Entry {
    id: SubscriptionId,
    cell: Weak<SubscriptionCell>,
}

impl Entry {
    fn is_live(&self) -> bool {
        self.cell.strong_count() > 0
    }
}

/// Registration-ordered list of weak subscriber references
#[derive(Default)]
pub struct SubscriberRegistry {
    entries: Vec<Entry>,
    next_id: u64,
}

impl SubscriberRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber
    ///
    /// Returns the token that owns it. The registry only keeps a weak
    /// reference, so the subscriber lives exactly as long as the token.
    ///
    /// # Example
    /// ```
    /// use timeline_core::{Event, SubscriberRegistry};
    ///
    /// let mut registry = SubscriberRegistry::new();
    /// let token = registry.subscribe(|_event: &Event| {});
    /// assert_eq!(registry.live_count(), 1);
    ///
    /// drop(token);
    /// assert_eq!(registry.live_count(), 0);
    /// assert_eq!(registry.prune(), 1);
    /// assert!(registry.is_empty());
    /// ```
    pub fn subscribe<S>(&mut self, subscriber: S) -> Token
    where
        S: Subscriber + 'static,
    {
        let id = SubscriptionId::new(self.next_id);
        self.next_id += 1;

        let cell = Rc::new(SubscriptionCell {
            id,
            subscriber: Box::new(subscriber),
        });
        self.entries.push(Entry {
            id,
            cell: Rc::downgrade(&cell),
        });
        log::trace!("subscription {} registered", id);

        Token::new(cell)
    }

    /// Remove every entry whose token has been dropped
    ///
    /// Returns the number of entries removed.
    pub fn prune(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(Entry::is_live);
        before - self.entries.len()
    }

    /// Frozen copy of the current entries
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            entries: self.entries.clone(),
        }
    }

    /// Id the next registration will receive
    ///
    /// Every existing subscription has a smaller id.
    pub fn next_id(&self) -> SubscriptionId {
        SubscriptionId::new(self.next_id)
    }

    /// Number of entries, including dead ones not yet pruned
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries whose token is still alive
    pub fn live_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_live()).count()
    }
}

/// Point-in-time view of a registry used for one dispatch pass
///
/// Subscribing or unsubscribing while a snapshot is being delivered never
/// changes which entries the snapshot iterates over.
pub struct Snapshot {
    entries: Vec<Entry>,
}

impl Snapshot {
    /// Keep only subscriptions registered before `watermark`
    pub fn registered_before(mut self, watermark: SubscriptionId) -> Self {
        self.entries.retain(|entry| entry.id < watermark);
        self
    }

    /// Number of entries in the snapshot
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the snapshot has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deliver `event` to every entry, in registration order
    ///
    /// Each entry is resolved right before its call; entries whose token has
    /// been dropped by then are skipped silently. The upgraded `Rc` keeps a
    /// subscriber alive for the duration of its own call, even if it drops
    /// its token. Returns the number of subscribers invoked.
    pub fn deliver(&self, event: &Event) -> usize {
        let mut delivered = 0;
        for entry in &self.entries {
            let Some(cell) = entry.cell.upgrade() else {
                continue;
            };
            cell.deliver(event);
            delivered += 1;
        }
        delivered
    }
}
