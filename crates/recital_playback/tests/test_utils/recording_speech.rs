//! Speech backend that records calls instead of speaking.

use recital_error::{SpeechError, SpeechErrorKind};
use recital_interface::{Generation, SpeechBackend, UtteranceRequest};
use std::sync::{Arc, Mutex};

/// One call made to the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum SpeechCall {
    Speak(UtteranceRequest),
    Cancel(Generation),
}

/// Shared view of the calls a [`RecordingBackend`] received.
#[derive(Debug, Clone, Default)]
pub struct SpeechLog {
    calls: Arc<Mutex<Vec<SpeechCall>>>,
}

#[allow(dead_code)]
impl SpeechLog {
    pub fn calls(&self) -> Vec<SpeechCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn speaks(&self) -> Vec<UtteranceRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SpeechCall::Speak(request) => Some(request),
                SpeechCall::Cancel(_) => None,
            })
            .collect()
    }

    pub fn cancels(&self) -> Vec<Generation> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SpeechCall::Cancel(generation) => Some(generation),
                SpeechCall::Speak(_) => None,
            })
            .collect()
    }

    pub fn last_speak(&self) -> Option<UtteranceRequest> {
        self.speaks().pop()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn push(&self, call: SpeechCall) {
        self.calls.lock().unwrap().push(call);
    }
}

/// Records every call; voices listed as failing reject `speak`.
#[derive(Debug)]
pub struct RecordingBackend {
    log: SpeechLog,
    failing_voices: Vec<String>,
}

#[allow(dead_code)]
impl RecordingBackend {
    pub fn new() -> (Self, SpeechLog) {
        Self::failing(&[])
    }

    pub fn failing(voices: &[&str]) -> (Self, SpeechLog) {
        let log = SpeechLog::default();
        let backend = Self {
            log: log.clone(),
            failing_voices: voices.iter().map(|v| v.to_string()).collect(),
        };
        (backend, log)
    }
}

impl SpeechBackend for RecordingBackend {
    fn speak(&mut self, request: &UtteranceRequest) -> Result<(), SpeechError> {
        self.log.push(SpeechCall::Speak(request.clone()));
        if self
            .failing_voices
            .iter()
            .any(|voice| voice == request.voice().as_str())
        {
            return Err(SpeechError::new(SpeechErrorKind::VoiceUnavailable(
                request.voice().to_string(),
            )));
        }
        Ok(())
    }

    fn cancel(&mut self, generation: Generation) {
        self.log.push(SpeechCall::Cancel(generation));
    }

    fn name(&self) -> &str {
        "recording"
    }
}
