//! Errors raised while reading scripts, scene tables and manifests from disk.

/// Specific file loading error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ScriptErrorKind {
    /// Failed to read a file
    #[display("Failed to read {}: {}", path, message)]
    FileRead {
        /// Path that failed
        path: String,
        /// Underlying I/O message
        message: String,
    },
    /// Failed to parse TOML content
    #[display("Failed to parse TOML: {}", _0)]
    TomlParse(String),
    /// Failed to parse JSON content
    #[display("Failed to parse JSON: {}", _0)]
    JsonParse(String),
    /// File extension is neither `.toml` nor `.json`
    #[display("Unsupported file format: {}", _0)]
    UnsupportedFormat(String),
}

/// File loading error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Script Error: {} at line {} in {}", kind, line, file)]
pub struct ScriptError {
    /// The kind of error that occurred
    pub kind: ScriptErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ScriptError {
    /// Create a new script error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ScriptErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
