//! Tests for clocks and generation tags.

use recital_core::Voice;
use recital_interface::{
    Clock, Generation, ManualClock, SpeechEvent, SpeechEventKind, SystemClock, UtteranceRequest,
};
use std::time::Duration;

#[test]
fn test_manual_clock_is_shared_between_clones() {
    let clock = ManualClock::new();
    let observer = clock.clone();
    assert_eq!(observer.now(), Duration::ZERO);

    clock.advance(Duration::from_millis(1_500));
    clock.advance(Duration::from_micros(250));
    assert_eq!(observer.now(), Duration::from_micros(1_500_250));
}

#[test]
fn test_system_clock_is_monotonic() {
    let clock = SystemClock::new();
    let first = clock.now();
    let second = clock.now();
    assert!(second >= first);
}

#[test]
fn test_generation_ordering() {
    let first = Generation::default();
    let second = first.next();
    assert!(second > first);
    assert_eq!(second.value(), 1);
    assert_eq!(second.to_string(), "#1");
}

#[test]
fn test_events_carry_their_generation() {
    let generation = Generation::new(4);
    let request = UtteranceRequest::new(generation, "hello", Voice::new("yunxi"), 1.25);
    assert_eq!(*request.generation(), generation);
    assert_eq!(request.text(), "hello");
    assert_eq!(*request.rate(), 1.25);

    assert_eq!(*SpeechEvent::started(generation).kind(), SpeechEventKind::Started);
    assert_eq!(*SpeechEvent::ended(generation).generation(), generation);
}
