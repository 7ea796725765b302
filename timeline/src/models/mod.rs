//! Domain models for the timeline

pub mod event;
pub mod payload;

// Re-exports
pub use event::Event;
pub use payload::{Payload, PayloadError};
