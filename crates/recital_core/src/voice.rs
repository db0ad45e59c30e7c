//! Voice identifiers.

use serde::{Deserialize, Serialize};

/// Identifier of a speech voice (e.g. `yunxi`).
///
/// Voices are opaque to the engine; the speech backend decides whether it can
/// speak with one.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::Display,
)]
#[serde(transparent)]
pub struct Voice(String);

impl Voice {
    /// Creates a voice id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The voice id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Voice {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Voice {
    fn from(id: String) -> Self {
        Self(id)
    }
}
