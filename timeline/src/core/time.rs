//! Time management for the timeline
//!
//! The timeline operates in discrete ticks. Time only moves forward, one
//! tick per advance.

use serde::{Deserialize, Serialize};

/// A discrete unit of simulated time
///
/// Signed so that events may be scheduled before the start tick.
pub type Tick = i64;

/// Tracks the current tick of a timeline
///
/// # Example
/// ```
/// use timeline_core::TickClock;
///
/// let mut clock = TickClock::new();
/// assert_eq!(clock.current_tick(), 0);
///
/// clock.advance_tick();
/// assert_eq!(clock.current_tick(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickClock {
    /// Tick the clock was created at
    start_tick: Tick,
    /// Current tick
    current_tick: Tick,
}

impl TickClock {
    /// Create a clock starting at tick 0
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Create a clock starting at an arbitrary tick
    ///
    /// # Example
    /// ```
    /// use timeline_core::TickClock;
    ///
    /// let clock = TickClock::starting_at(-5);
    /// assert_eq!(clock.current_tick(), -5);
    /// assert_eq!(clock.ticks_elapsed(), 0);
    /// ```
    pub fn starting_at(start_tick: Tick) -> Self {
        Self {
            start_tick,
            current_tick: start_tick,
        }
    }

    /// Advance time by exactly one tick and return the new tick
    ///
    /// # Panics
    /// Panics if the tick would overflow `i64::MAX`.
    pub fn advance_tick(&mut self) -> Tick {
        self.current_tick = self
            .current_tick
            .checked_add(1)
            .expect("tick counter overflowed");
        self.current_tick
    }

    /// Get the current tick
    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    /// Get the tick the clock started at
    pub fn start_tick(&self) -> Tick {
        self.start_tick
    }

    /// Number of advances since the clock was created
    ///
    /// # Example
    /// ```
    /// use timeline_core::TickClock;
    ///
    /// let mut clock = TickClock::starting_at(10);
    /// for _ in 0..3 {
    ///     clock.advance_tick();
    /// }
    /// assert_eq!(clock.current_tick(), 13);
    /// assert_eq!(clock.ticks_elapsed(), 3);
    /// ```
    pub fn ticks_elapsed(&self) -> u64 {
        self.current_tick.abs_diff(self.start_tick)
    }

    /// Check whether an event scheduled at `timestep` is due
    pub fn is_due(&self, timestep: Tick) -> bool {
        timestep <= self.current_tick
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "tick counter overflowed")]
    fn test_advance_past_max_panics() {
        let mut clock = TickClock::starting_at(Tick::MAX);
        clock.advance_tick();
    }

    #[test]
    fn test_is_due_includes_current_and_past() {
        let mut clock = TickClock::new();
        clock.advance_tick();
        clock.advance_tick();

        assert!(clock.is_due(-3));
        assert!(clock.is_due(1));
        assert!(clock.is_due(2));
        assert!(!clock.is_due(3));
    }
}
