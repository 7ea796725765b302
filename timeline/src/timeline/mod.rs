//! Timeline - the tick-advance loop
//!
//! Ties the event queue, the subscriber registry and the tick clock together.
//!
//! See `engine.rs` for the advance algorithm.

pub mod config;
pub mod engine;

// Re-export main types for convenience
pub use config::{ConfigError, TimelineConfig};
pub use engine::{TickReport, Timeline, TimelineError, TimelineHandle};
