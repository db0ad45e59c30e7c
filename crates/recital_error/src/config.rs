//! Configuration error types.
//!
//! A malformed script is a configuration error: it is rejected when loaded,
//! before playback can start.

/// Specific configuration error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ConfigErrorKind {
    /// Script has no sections
    #[display("Script '{}' has no sections", _0)]
    EmptyScript(String),
    /// A section has no lines
    #[display("Section '{}' has no lines", _0)]
    EmptySection(String),
    /// Two sections share an id
    #[display("Duplicate section id '{}'", _0)]
    DuplicateSectionId(String),
    /// Two lines in one section share an id
    #[display("Duplicate line id '{}' in section '{}'", line_id, section_id)]
    DuplicateLineId {
        /// Section containing the duplicate
        section_id: String,
        /// Duplicated line id
        line_id: String,
    },
    /// A setting is outside its valid range
    #[display("Invalid setting '{}': {}", key, reason)]
    InvalidSetting {
        /// Setting name
        key: String,
        /// Why the value was rejected
        reason: String,
    },
    /// Configuration sources could not be built or deserialized
    #[display("Failed to load configuration: {}", _0)]
    Load(String),
}

/// Configuration error with source location.
///
/// # Examples
///
/// ```
/// use recital_error::{ConfigError, ConfigErrorKind};
///
/// let err = ConfigError::new(ConfigErrorKind::EmptySection("intro".into()));
/// assert!(format!("{}", err).contains("intro"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", kind, line, file)]
pub struct ConfigError {
    /// The specific error condition
    pub kind: ConfigErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ConfigErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for [`ConfigErrorKind::InvalidSetting`].
    #[track_caller]
    pub fn invalid_setting(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::InvalidSetting {
            key: key.into(),
            reason: reason.into(),
        })
    }
}
