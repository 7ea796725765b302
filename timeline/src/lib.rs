//! Timeline Core - discrete-event tick scheduler
//!
//! A single ordered queue of timestamped events, advanced one tick at a time,
//! with a dynamic set of subscribers notified when each event comes due.
//!
//! # Architecture
//!
//! - **core**: Tick type and clock
//! - **models**: Domain types (Event, Payload)
//! - **queue**: Min-first event queue
//! - **subscription**: Subscriber trait, tokens, and the weak registry
//! - **timeline**: The advance loop and its configuration
//!
//! # Critical Invariants
//!
//! 1. Events are delivered in non-decreasing timestep order, never before
//!    their tick is reached
//! 2. Each event is dispatched exactly once, then leaves the queue
//! 3. A subscriber is callable if and only if its token is alive
//! 4. The current tick moves forward by exactly one per advance

// Module declarations
pub mod core;
pub mod models;
pub mod queue;
pub mod subscription;
pub mod timeline;

// Re-exports for convenience
pub use crate::core::time::{Tick, TickClock};
pub use models::{
    event::Event,
    payload::{Payload, PayloadError},
};
pub use queue::EventQueue;
pub use subscription::{Snapshot, Subscriber, SubscriberRegistry, SubscriptionId, Token};
pub use timeline::{
    ConfigError, TickReport, Timeline, TimelineConfig, TimelineError, TimelineHandle,
};
