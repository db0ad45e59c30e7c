//! Playback positions.

use serde::{Deserialize, Serialize};

/// Indices of one line inside a script.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("({}, {})", section, line)]
pub struct LineCursor {
    /// Section index
    pub section: usize,
    /// Line index within the section
    pub line: usize,
}

impl LineCursor {
    /// Creates a cursor.
    pub const fn new(section: usize, line: usize) -> Self {
        Self { section, line }
    }
}

/// Where playback stands: on a line, or past the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum PlaybackPosition {
    /// On a valid line
    #[display("{}", _0)]
    Line(LineCursor),
    /// Past the last line of the last section
    #[display("ended")]
    Ended,
}

impl PlaybackPosition {
    /// The cursor, unless playback has ended.
    pub fn cursor(&self) -> Option<LineCursor> {
        match self {
            Self::Line(cursor) => Some(*cursor),
            Self::Ended => None,
        }
    }
}
