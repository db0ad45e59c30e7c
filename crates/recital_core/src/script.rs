//! Script model: the narration document for one topic.

use crate::LineCursor;
use crate::document::{parse_toml, read_document};
use derive_builder::Builder;
use derive_getters::Getters;
use recital_error::{ConfigError, ConfigErrorKind, ScriptError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

/// A renderer-side animation trigger attached to a line.
///
/// The engine does not interpret the action; it only delivers the cue
/// `delay_ms` after the line starts speaking, provided playback has not moved
/// on in the meantime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, Builder)]
#[builder(setter(into), build_fn(error = "recital_error::BuilderError"))]
pub struct AnimationCue {
    /// Action name understood by the renderer (e.g. `startAnimation`)
    action: String,
    /// Free-form action parameters
    #[serde(default)]
    #[builder(default)]
    params: Map<String, Value>,
    /// Delay after the line starts, in milliseconds
    #[serde(default)]
    #[builder(default)]
    delay_ms: u64,
}

/// One narration line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, Builder)]
#[builder(setter(into), build_fn(error = "recital_error::BuilderError"))]
pub struct Line {
    /// Line id, unique within its section
    id: String,
    /// Narration text handed to speech synthesis
    text: String,
    /// Scene reference; lines without one keep the visual state in effect
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    scene: Option<String>,
    /// Optional animation cue fired while the line is spoken
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    cue: Option<AnimationCue>,
}

impl Line {
    /// Number of spoken characters (whitespace excluded).
    pub fn spoken_len(&self) -> usize {
        self.text.chars().filter(|c| !c.is_whitespace()).count()
    }
}

/// An ordered group of lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, Builder)]
#[builder(setter(into), build_fn(error = "recital_error::BuilderError"))]
pub struct Section {
    /// Section id, unique within its script
    id: String,
    /// Title displayed in outlines
    #[serde(default)]
    #[builder(default)]
    title: String,
    /// Lines in playback order
    lines: Vec<Line>,
}

/// Complete narration script for one topic.
///
/// # Example TOML Structure
///
/// ```toml
/// id = "pythagorean"
/// title = "The Pythagorean Theorem"
///
/// [[sections]]
/// id = "intro"
/// title = "Introduction"
///
/// [[sections.lines]]
/// id = "intro-1"
/// text = "Welcome."
/// scene = "intro-welcome"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, Builder)]
#[builder(setter(into), build_fn(error = "recital_error::BuilderError"))]
pub struct Script {
    /// Script id, used to find the topic's scene table
    id: String,
    /// Human-readable title
    title: String,
    /// Optional subtitle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    subtitle: Option<String>,
    /// Sections in playback order
    sections: Vec<Section>,
}

impl Script {
    /// Loads a script from a `.toml` or `.json` file.
    ///
    /// The script is parsed but not validated; validation happens when it is
    /// loaded into a player.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScriptError> {
        read_document(path.as_ref())
    }

    /// Checks the structural rules every playable script obeys.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if:
    /// - the script has no sections
    /// - any section has no lines
    /// - two sections share an id
    /// - two lines of one section share an id
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sections.is_empty() {
            return Err(ConfigError::new(ConfigErrorKind::EmptyScript(
                self.id.clone(),
            )));
        }

        let mut section_ids = HashSet::new();
        for section in &self.sections {
            if section.lines.is_empty() {
                return Err(ConfigError::new(ConfigErrorKind::EmptySection(
                    section.id.clone(),
                )));
            }
            if !section_ids.insert(section.id.as_str()) {
                return Err(ConfigError::new(ConfigErrorKind::DuplicateSectionId(
                    section.id.clone(),
                )));
            }

            let mut line_ids = HashSet::new();
            for line in &section.lines {
                if !line_ids.insert(line.id.as_str()) {
                    return Err(ConfigError::new(ConfigErrorKind::DuplicateLineId {
                        section_id: section.id.clone(),
                        line_id: line.id.clone(),
                    }));
                }
            }
        }

        Ok(())
    }

    /// Gets a section by index.
    pub fn section(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    /// Gets the line under a cursor.
    pub fn line(&self, cursor: LineCursor) -> Option<&Line> {
        self.sections
            .get(cursor.section)
            .and_then(|section| section.lines.get(cursor.line))
    }

    /// Total number of lines across all sections.
    pub fn line_count(&self) -> usize {
        self.sections.iter().map(|s| s.lines.len()).sum()
    }

    /// Every line cursor in playback order.
    pub fn cursors(&self) -> impl Iterator<Item = LineCursor> + '_ {
        self.sections
            .iter()
            .enumerate()
            .flat_map(|(section, s)| (0..s.lines.len()).map(move |line| LineCursor::new(section, line)))
    }
}

impl FromStr for Script {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_toml(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: &str) -> Line {
        LineBuilder::default().id(id).text("text").build().unwrap()
    }

    fn section(id: &str, lines: Vec<Line>) -> Section {
        SectionBuilder::default().id(id).lines(lines).build().unwrap()
    }

    #[test]
    fn test_spoken_len_ignores_whitespace() {
        let line = LineBuilder::default()
            .id("a")
            .text(" a b\tc\n")
            .build()
            .unwrap();
        assert_eq!(line.spoken_len(), 3);
    }

    #[test]
    fn test_duplicate_line_ids_in_different_sections_are_allowed() {
        let script = ScriptBuilder::default()
            .id("s")
            .title("S")
            .sections(vec![
                section("a", vec![line("1")]),
                section("b", vec![line("1")]),
            ])
            .build()
            .unwrap();
        assert!(script.validate().is_ok());
    }

    #[test]
    fn test_duplicate_line_ids_in_one_section_are_rejected() {
        let script = ScriptBuilder::default()
            .id("s")
            .title("S")
            .sections(vec![section("a", vec![line("1"), line("1")])])
            .build()
            .unwrap();
        let err = script.validate().unwrap_err();
        assert!(matches!(err.kind, ConfigErrorKind::DuplicateLineId { .. }));
    }

    #[test]
    fn test_cursors_walk_sections_in_order() {
        let script = ScriptBuilder::default()
            .id("s")
            .title("S")
            .sections(vec![
                section("a", vec![line("1"), line("2")]),
                section("b", vec![line("1")]),
            ])
            .build()
            .unwrap();
        let cursors: Vec<_> = script.cursors().collect();
        assert_eq!(
            cursors,
            vec![
                LineCursor::new(0, 0),
                LineCursor::new(0, 1),
                LineCursor::new(1, 0)
            ]
        );
        assert_eq!(script.line_count(), 3);
    }

    #[test]
    fn test_missing_required_field_reports_builder_error() {
        let err = LineBuilder::default().id("a").build().unwrap_err();
        assert!(err.to_string().contains("text"));
    }
}
