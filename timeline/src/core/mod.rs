//! Core time primitives

pub mod time;

pub use time::{Tick, TickClock};
