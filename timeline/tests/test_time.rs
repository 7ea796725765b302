//! Tests for TickClock

use timeline_core::TickClock;

#[test]
fn test_clock_new() {
    let clock = TickClock::new();
    assert_eq!(clock.current_tick(), 0);
    assert_eq!(clock.start_tick(), 0);
    assert_eq!(clock.ticks_elapsed(), 0);
}

#[test]
fn test_advance_tick_increments_by_one() {
    let mut clock = TickClock::new();

    assert_eq!(clock.advance_tick(), 1);
    assert_eq!(clock.advance_tick(), 2);
    assert_eq!(clock.current_tick(), 2);
}

#[test]
fn test_negative_start_tick() {
    let mut clock = TickClock::starting_at(-2);

    for _ in 0..5 {
        clock.advance_tick();
    }

    assert_eq!(clock.current_tick(), 3);
    assert_eq!(clock.ticks_elapsed(), 5);
}

#[test]
fn test_clock_is_monotonic() {
    let mut clock = TickClock::starting_at(7);
    let mut previous = clock.current_tick();

    for _ in 0..100 {
        let next = clock.advance_tick();
        assert_eq!(next, previous + 1);
        previous = next;
    }
}

#[test]
fn test_clock_default_matches_new() {
    assert_eq!(TickClock::default(), TickClock::new());
}
