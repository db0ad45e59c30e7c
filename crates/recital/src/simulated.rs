//! Timer-based stand-in for a text-to-speech engine.

use recital_error::{SpeechError, SpeechErrorKind};
use recital_interface::{Generation, SpeechBackend, SpeechEvent, UtteranceRequest};
use recital_playback::PlaybackConfig;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Speech backend that "speaks" by sleeping.
///
/// Each utterance reports `Started` at once and `Ended` after its estimated
/// duration (text length over `chars_per_second`, floored at
/// `min_line_secs`, divided by the rate). Voices marked as failing are
/// rejected, which exercises the engine's fallback path.
///
/// Must be used from inside a tokio runtime.
#[derive(Debug)]
pub struct SimulatedSpeech {
    events: mpsc::UnboundedSender<SpeechEvent>,
    chars_per_second: f32,
    min_line_secs: f32,
    failing_voices: HashSet<String>,
    tasks: HashMap<Generation, JoinHandle<()>>,
}

impl SimulatedSpeech {
    /// Creates a backend reporting to `events`.
    pub fn new(events: mpsc::UnboundedSender<SpeechEvent>, config: &PlaybackConfig) -> Self {
        Self {
            events,
            chars_per_second: config.chars_per_second,
            min_line_secs: config.min_line_secs,
            failing_voices: HashSet::new(),
            tasks: HashMap::new(),
        }
    }

    /// Makes `speak` fail for the given voices.
    #[must_use]
    pub fn with_failing_voices<I, S>(mut self, voices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.failing_voices
            .extend(voices.into_iter().map(Into::into));
        self
    }

    /// How long an utterance takes to "speak".
    pub fn utterance_duration(&self, request: &UtteranceRequest) -> Duration {
        let chars = request.text().chars().filter(|c| !c.is_whitespace()).count();
        let secs = (chars as f32 / self.chars_per_second).max(self.min_line_secs);
        let rate = if *request.rate() > 0.0 { *request.rate() } else { 1.0 };
        Duration::try_from_secs_f32(secs / rate).unwrap_or(Duration::MAX)
    }
}

impl SpeechBackend for SimulatedSpeech {
    fn speak(&mut self, request: &UtteranceRequest) -> Result<(), SpeechError> {
        self.tasks.retain(|_, task| !task.is_finished());

        if self.failing_voices.contains(request.voice().as_str()) {
            return Err(SpeechError::new(SpeechErrorKind::VoiceUnavailable(
                request.voice().to_string(),
            )));
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            SpeechError::new(SpeechErrorKind::Backend(format!("no async runtime: {}", e)))
        })?;

        let generation = *request.generation();
        let duration = self.utterance_duration(request);
        let events = self.events.clone();
        trace!(%generation, duration_ms = duration.as_millis() as u64, "Simulating utterance");

        let task = runtime.spawn(async move {
            if events.send(SpeechEvent::started(generation)).is_err() {
                return;
            }
            tokio::time::sleep(duration).await;
            // The session may already be gone.
            let _ = events.send(SpeechEvent::ended(generation));
        });
        self.tasks.insert(generation, task);
        Ok(())
    }

    fn cancel(&mut self, generation: Generation) {
        if let Some(task) = self.tasks.remove(&generation) {
            debug!(%generation, "Aborting simulated utterance");
            task.abort();
        }
    }

    fn name(&self) -> &str {
        "simulated"
    }
}

impl Drop for SimulatedSpeech {
    fn drop(&mut self) {
        for task in self.tasks.values() {
            task.abort();
        }
    }
}
