//! Measured audio durations for pre-generated narration.

use crate::document::read_document;
use derive_getters::Getters;
use recital_error::ScriptError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Measured duration of one line's audio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct ManifestEntry {
    /// Section id of the line
    section_id: String,
    /// Line id
    line_id: String,
    /// Audio length in seconds at rate 1.0
    duration: f64,
}

/// Per-line durations produced when narration audio was generated.
///
/// The progress model prefers these over text-length estimates.
///
/// ```json
/// {
///   "script_id": "fourier",
///   "voice": "yunxi",
///   "files": [{"section_id": "intro", "line_id": "intro-1", "duration": 3.2}],
///   "total_duration": 3.2
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct DurationManifest {
    /// Script the audio belongs to
    script_id: String,
    /// Voice the audio was generated with
    #[serde(default)]
    voice: Option<String>,
    /// One entry per generated line
    #[serde(default)]
    files: Vec<ManifestEntry>,
    /// Sum of all durations in seconds
    #[serde(default)]
    total_duration: f64,
}

impl DurationManifest {
    /// Loads a manifest from a `.json` or `.toml` file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScriptError> {
        read_document(path.as_ref())
    }

    /// Measured duration of a line, if present, positive and representable.
    pub fn duration_of(&self, section_id: &str, line_id: &str) -> Option<Duration> {
        self.files
            .iter()
            .find(|entry| entry.section_id == section_id && entry.line_id == line_id)
            .filter(|entry| entry.duration > 0.0)
            .and_then(|entry| Duration::try_from_secs_f64(entry.duration).ok())
    }
}
