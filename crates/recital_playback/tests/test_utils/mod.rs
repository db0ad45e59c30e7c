//! Test utilities for playback tests.
//!
//! This module provides a recording speech backend and script fixtures.

#![allow(dead_code)]

pub mod fixtures;
pub mod recording_speech;

#[allow(unused_imports)]
pub use fixtures::{machine, machine_with, two_by_two, two_by_two_table};
#[allow(unused_imports)]
pub use recording_speech::{RecordingBackend, SpeechCall, SpeechLog};
