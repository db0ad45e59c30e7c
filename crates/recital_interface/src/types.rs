//! Messages exchanged with speech backends.

use derive_getters::Getters;
use recital_core::Voice;
use recital_error::SpeechError;
use serde::{Deserialize, Serialize};

/// Monotonically increasing tag of a playback decision.
///
/// The playback machine bumps the generation before every change of position
/// or play state; an event whose generation is not the current one is stale.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("#{}", _0)]
pub struct Generation(u64);

impl Generation {
    /// Wraps a raw counter value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The raw counter value.
    pub const fn value(self) -> u64 {
        self.0
    }

    /// The following generation.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// A single utterance handed to a backend.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct UtteranceRequest {
    /// Tag every event for this utterance must carry
    generation: Generation,
    /// Text to speak
    text: String,
    /// Voice to speak with
    voice: Voice,
    /// Speech rate multiplier (1.0 is normal speed)
    rate: f32,
}

impl UtteranceRequest {
    /// Creates a request.
    pub fn new(generation: Generation, text: impl Into<String>, voice: Voice, rate: f32) -> Self {
        Self {
            generation,
            text: text.into(),
            voice,
            rate,
        }
    }
}

/// What happened to an utterance.
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
pub enum SpeechEventKind {
    /// Audio started
    #[display("started")]
    Started,
    /// Word or sentence boundary reached (not all backends report these)
    #[display("boundary at {}", char_index)]
    Boundary {
        /// Character offset into the utterance text
        char_index: usize,
    },
    /// Audio finished
    #[display("ended")]
    Ended,
    /// Synthesis or playback failed
    #[display("failed: {}", _0)]
    Failed(SpeechError),
}

/// Generation-tagged event reported by a backend.
#[derive(Debug, Clone, PartialEq, Getters, derive_more::Display)]
#[display("{} {}", generation, kind)]
pub struct SpeechEvent {
    /// Generation of the utterance this event belongs to
    generation: Generation,
    /// The event
    kind: SpeechEventKind,
}

impl SpeechEvent {
    /// Creates an event.
    pub fn new(generation: Generation, kind: SpeechEventKind) -> Self {
        Self { generation, kind }
    }

    /// Audio started.
    pub fn started(generation: Generation) -> Self {
        Self::new(generation, SpeechEventKind::Started)
    }

    /// Audio finished.
    pub fn ended(generation: Generation) -> Self {
        Self::new(generation, SpeechEventKind::Ended)
    }

    /// Utterance failed.
    pub fn failed(generation: Generation, error: SpeechError) -> Self {
        Self::new(generation, SpeechEventKind::Failed(error))
    }
}
