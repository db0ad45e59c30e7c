//! Speech controller: one utterance at a time over an opaque backend.

use crate::PlaybackConfig;
use recital_interface::{Generation, SpeechBackend, SpeechEvent, SpeechEventKind, UtteranceRequest};
use std::time::Duration;
use tracing::{debug, warn};

/// What an accepted speech event means for playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum SpeechOutcome {
    /// The active utterance started producing audio
    #[display("started")]
    Started,
    /// The active utterance is over; playback may advance
    #[display("finished")]
    Finished,
    /// Nothing to do yet (boundary, or a failure waiting out its fallback)
    #[display("pending")]
    Pending,
    /// The event belongs to an utterance that is no longer active
    #[display("stale")]
    Stale,
}

#[derive(Debug, Clone, Copy)]
struct ActiveUtterance {
    generation: Generation,
    chars: usize,
    fallback_at: Option<Duration>,
}

/// Wraps a [`SpeechBackend`] so that at most one utterance is active.
///
/// Starting a new utterance cancels the previous one. Once [`cancel`] returns,
/// every later event of the cancelled utterance is reported as
/// [`SpeechOutcome::Stale`], however late the backend delivers it.
///
/// Failures are soft: a failed utterance is reported as finished after a
/// fallback delay proportional to its length, so one bad line never stalls
/// playback.
///
/// [`cancel`]: SpeechController::cancel
#[derive(Debug)]
pub struct SpeechController<B> {
    backend: B,
    active: Option<ActiveUtterance>,
    config: PlaybackConfig,
}

impl<B: SpeechBackend> SpeechController<B> {
    /// Wraps a backend.
    pub fn new(backend: B, config: &PlaybackConfig) -> Self {
        Self {
            backend,
            active: None,
            config: config.clone(),
        }
    }

    /// Starts an utterance, cancelling any active one first.
    #[tracing::instrument(skip_all, fields(generation = %request.generation(), backend = self.backend.name()))]
    pub fn speak(&mut self, request: UtteranceRequest, now: Duration) {
        self.cancel();

        let chars = request.text().chars().filter(|c| !c.is_whitespace()).count();
        let fallback_at = match self.backend.speak(&request) {
            Ok(()) => None,
            Err(e) => {
                let delay = self.config.fallback_delay(chars);
                warn!(error = %e, delay_ms = delay.as_millis() as u64, "Speech failed to start, using fallback delay");
                Some(now + delay)
            }
        };

        self.active = Some(ActiveUtterance {
            generation: *request.generation(),
            chars,
            fallback_at,
        });
    }

    /// Stops the active utterance, if any.
    pub fn cancel(&mut self) {
        if let Some(active) = self.active.take() {
            debug!(generation = %active.generation, "Cancelling utterance");
            self.backend.cancel(active.generation);
        }
    }

    /// Interprets an event from the backend.
    pub fn accept(&mut self, event: &SpeechEvent, now: Duration) -> SpeechOutcome {
        let Some(active) = self.active.as_mut() else {
            debug!(event = %event, "Dropped speech event with no active utterance");
            return SpeechOutcome::Stale;
        };
        if active.generation != *event.generation() {
            debug!(event = %event, active = %active.generation, "Dropped stale speech event");
            return SpeechOutcome::Stale;
        }

        match event.kind() {
            SpeechEventKind::Started => SpeechOutcome::Started,
            SpeechEventKind::Boundary { .. } => SpeechOutcome::Pending,
            SpeechEventKind::Ended => {
                self.active = None;
                SpeechOutcome::Finished
            }
            SpeechEventKind::Failed(e) => {
                if active.fallback_at.is_none() {
                    let delay = self.config.fallback_delay(active.chars);
                    warn!(error = %e, delay_ms = delay.as_millis() as u64, "Speech failed, using fallback delay");
                    active.fallback_at = Some(now + delay);
                }
                SpeechOutcome::Pending
            }
        }
    }

    /// Finishes a failed utterance whose fallback delay has passed.
    ///
    /// Returns the generation of the finished utterance.
    pub fn poll(&mut self, now: Duration) -> Option<Generation> {
        let active = self.active?;
        match active.fallback_at {
            Some(deadline) if deadline <= now => {
                debug!(generation = %active.generation, "Fallback delay elapsed");
                self.active = None;
                Some(active.generation)
            }
            _ => None,
        }
    }

    /// Generation of the active utterance.
    pub fn active_generation(&self) -> Option<Generation> {
        self.active.map(|active| active.generation)
    }

    /// When the active utterance's fallback fires, if it failed.
    pub fn fallback_deadline(&self) -> Option<Duration> {
        self.active.and_then(|active| active.fallback_at)
    }

    /// The wrapped backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }
}
