//! Scene table error types.

/// Scene lookup and integrity problems.
///
/// None of these stop playback: a missing delta falls back to the visual
/// state already in effect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum SceneErrorKind {
    /// A line references a scene but the table has no `(section, line)` entry
    #[display("No scene delta for line '{}' in section '{}'", line_id, section_id)]
    MissingDelta {
        /// Section id of the line
        section_id: String,
        /// Line id
        line_id: String,
    },
    /// A table entry matches no line of the script
    #[display("Scene entry '{}/{}' matches no script line", section_id, line_id)]
    OrphanEntry {
        /// Section id of the entry
        section_id: String,
        /// Line id of the entry
        line_id: String,
    },
    /// Two table entries share a `(section, line)` key
    #[display("Scene entry '{}/{}' is defined more than once", section_id, line_id)]
    DuplicateEntry {
        /// Section id of the entry
        section_id: String,
        /// Line id of the entry
        line_id: String,
    },
}

/// Scene error with location tracking.
///
/// # Examples
///
/// ```
/// use recital_error::{SceneError, SceneErrorKind};
///
/// let err = SceneError::new(SceneErrorKind::MissingDelta {
///     section_id: "intro".into(),
///     line_id: "intro-2".into(),
/// });
/// assert!(err.is_missing_delta());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Scene Error: {} at line {} in {}", kind, line, file)]
pub struct SceneError {
    /// The kind of error that occurred
    pub kind: SceneErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl SceneError {
    /// Create a new scene error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: SceneErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Whether this is a missing delta (the only kind that affects playback).
    pub fn is_missing_delta(&self) -> bool {
        matches!(self.kind, SceneErrorKind::MissingDelta { .. })
    }
}
