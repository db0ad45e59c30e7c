//! Trait definitions for the collaborators of the Recital playback engine.
//!
//! The engine never talks to an audio device or a clock directly:
//!
//! - [`SpeechBackend`] is the opaque text-to-speech capability. Every request
//!   carries a [`Generation`] and every [`SpeechEvent`] reports it back, which
//!   is what lets the engine discard events from cancelled utterances.
//! - [`Clock`] supplies monotonic time for progress interpolation and
//!   fallback timers. [`ManualClock`] makes both deterministic in tests.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod clock;
mod traits;
mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use traits::SpeechBackend;
pub use types::{Generation, SpeechEvent, SpeechEventKind, UtteranceRequest};
