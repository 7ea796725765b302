//! Subscribers and their lifetimes
//!
//! A subscriber is registered with a [`SubscriberRegistry`] and handed back a
//! [`Token`]. The token is the only strong owner of the subscriber; the
//! registry keeps a `Weak` reference. Dropping (or cancelling) the token
//! unsubscribes: the subscriber becomes uncallable at once and its registry
//! entry is swept out at the next [`SubscriberRegistry::prune`].
//!
//! # Subscriber Interface
//!
//! Anything implementing [`Subscriber`] can be registered. Closures taking
//! `&Event` implement it automatically.
//!
//! Subscribers are invoked through `&self` because a nested advance may call
//! the same subscriber again while it is still running. State that changes
//! per event lives in a `Cell` or `RefCell`:
//!
//! ```rust
//! use std::cell::Cell;
//! use timeline_core::{Event, Subscriber};
//!
//! struct Counter {
//!     seen: Cell<usize>,
//! }
//!
//! impl Subscriber for Counter {
//!     fn on_event(&self, _event: &Event) {
//!         self.seen.set(self.seen.get() + 1);
//!     }
//! }
//! ```

pub mod registry;
pub mod token;

pub use registry::{Snapshot, SubscriberRegistry};
pub use token::Token;

use crate::models::Event;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Receives events dispatched by a timeline
pub trait Subscriber {
    /// Called once per due event while the subscription is live
    fn on_event(&self, event: &Event);
}

impl<F> Subscriber for F
where
    F: Fn(&Event),
{
    fn on_event(&self, event: &Event) {
        self(event)
    }
}

/// Identifier of a subscription, unique within one registry
///
/// Ids are handed out in registration order, so comparing two ids compares
/// when they were registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric id
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}
