//! Top-level error wrapper types.

use crate::{BuilderError, ConfigError, SceneError, ScriptError, SessionError, SpeechError};

/// Every error condition a Recital crate can report.
///
/// # Examples
///
/// ```
/// use recital_error::{RecitalError, ScriptError, ScriptErrorKind};
///
/// let err: RecitalError = ScriptError::new(ScriptErrorKind::UnsupportedFormat("yaml".into())).into();
/// assert!(format!("{}", err).contains("yaml"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum RecitalErrorKind {
    /// Malformed script or invalid settings
    #[from(ConfigError)]
    Config(ConfigError),
    /// Script, scene table or manifest could not be read
    #[from(ScriptError)]
    Script(ScriptError),
    /// Scene lookup or scene table integrity problem
    #[from(SceneError)]
    Scene(SceneError),
    /// Speech synthesis failure
    #[from(SpeechError)]
    Speech(SpeechError),
    /// Session handle failure
    #[from(SessionError)]
    Session(SessionError),
    /// Builder error
    #[from(BuilderError)]
    Builder(BuilderError),
}

/// Recital error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Recital Error: {}", _0)]
pub struct RecitalError(Box<RecitalErrorKind>);

impl RecitalError {
    /// Create a new error from a kind.
    pub fn new(kind: RecitalErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &RecitalErrorKind {
        &self.0
    }
}

impl<T> From<T> for RecitalError
where
    T: Into<RecitalErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Recital operations.
pub type RecitalResult<T> = std::result::Result<T, RecitalError>;
