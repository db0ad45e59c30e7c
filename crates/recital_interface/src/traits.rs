//! The speech backend seam.

use crate::{Generation, UtteranceRequest};
use recital_error::SpeechError;

/// Opaque text-to-speech capability.
///
/// Implementations deliver [`SpeechEvent`](crate::SpeechEvent)s for each
/// request asynchronously, through whatever channel they were constructed
/// with. Every event must carry the request's generation.
///
/// Cancellation is best-effort: a backend may still emit an `Ended` event for
/// a cancelled utterance. The engine filters such events by generation, so
/// implementations do not need to guarantee silence after `cancel`.
pub trait SpeechBackend: Send {
    /// Starts speaking an utterance.
    ///
    /// # Errors
    ///
    /// Returns an error if the utterance cannot even be started (e.g. unknown
    /// voice). The engine treats this like a `Failed` event.
    fn speak(&mut self, request: &UtteranceRequest) -> Result<(), SpeechError>;

    /// Stops the utterance with the given generation, if it is still playing.
    fn cancel(&mut self, generation: Generation);

    /// Backend name for logs (e.g. "simulated", "edge-tts").
    fn name(&self) -> &str;
}

impl<B: SpeechBackend + ?Sized> SpeechBackend for Box<B> {
    fn speak(&mut self, request: &UtteranceRequest) -> Result<(), SpeechError> {
        (**self).speak(request)
    }

    fn cancel(&mut self, generation: Generation) {
        (**self).cancel(generation)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
