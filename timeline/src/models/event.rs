//! Timeline events
//!
//! An event pairs a target tick with an opaque payload. Events are immutable
//! once built; subscribers only ever see them by shared reference.
//!
//! # Example
//!
//! ```rust
//! use timeline_core::Event;
//!
//! #[derive(Clone)]
//! struct Arrival {
//!     ship: String,
//! }
//!
//! let event = Event::new(12, Arrival { ship: "Calypso".to_string() });
//! assert_eq!(event.timestep(), 12);
//!
//! let arrival = event.payload_as::<Arrival>().unwrap();
//! assert_eq!(arrival.ship, "Calypso");
//! ```

use crate::core::time::Tick;
use crate::models::payload::{Payload, PayloadError};
use std::any::Any;

/// A payload scheduled for a specific tick
///
/// Cloning an event deep-clones its payload.
#[derive(Debug, Clone)]
pub struct Event {
    timestep: Tick,
    payload: Payload,
}

impl Event {
    /// Create an event carrying `value` at `timestep`
    pub fn new<T: Any + Clone>(timestep: Tick, value: T) -> Self {
        Self::with_payload(timestep, Payload::new(value))
    }

    /// Create an event from an already-erased payload
    pub fn with_payload(timestep: Tick, payload: Payload) -> Self {
        Self { timestep, payload }
    }

    /// Tick at which the event is due
    pub fn timestep(&self) -> Tick {
        self.timestep
    }

    /// The opaque payload
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Borrow the payload as a `T`
    ///
    /// Shorthand for `event.payload().downcast_ref::<T>()`.
    pub fn payload_as<T: Any>(&self) -> Result<&T, PayloadError> {
        self.payload.downcast_ref::<T>()
    }

    /// Consume the event, returning its payload
    pub fn into_payload(self) -> Payload {
        self.payload
    }
}
