//! Speech synthesis error types.

/// Speech backend failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum SpeechErrorKind {
    /// Requested voice is not installed or not offered by the backend
    #[display("Voice unavailable: {}", _0)]
    VoiceUnavailable(String),
    /// Backend failed to synthesize or play the utterance
    #[display("Speech backend failure: {}", _0)]
    Backend(String),
    /// Utterance was interrupted by the backend
    #[display("Utterance cancelled")]
    Cancelled,
}

/// Speech error with location tracking.
///
/// Speech errors are soft failures: the speech controller replaces them with a
/// synthesized end-of-utterance after a fallback delay.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("Speech Error: {} at line {} in {}", kind, line, file)]
pub struct SpeechError {
    /// The kind of error that occurred
    pub kind: SpeechErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl SpeechError {
    /// Create a new speech error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: SpeechErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
