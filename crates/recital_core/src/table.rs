//! Per-topic scene tables.

use crate::document::read_document;
use crate::{Script, SceneDelta, VisualState};
use derive_builder::Builder;
use derive_getters::Getters;
use recital_error::{SceneError, SceneErrorKind, ScriptError};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::debug;

/// One scene table row: the delta shown for a `(section_id, line_id)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, Builder)]
#[builder(setter(into), build_fn(error = "recital_error::BuilderError"))]
pub struct SceneEntry {
    /// Section id of the line
    section_id: String,
    /// Line id
    line_id: String,
    /// Optional scene id, for renderers and logs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    scene_id: Option<String>,
    /// The visual delta
    #[serde(flatten)]
    #[builder(default)]
    delta: SceneDelta,
}

#[derive(Deserialize)]
struct SceneTableFile {
    script_id: String,
    #[serde(default)]
    default_state: VisualState,
    #[serde(default)]
    scenes: Vec<SceneEntry>,
}

impl From<SceneTableFile> for SceneTable {
    fn from(file: SceneTableFile) -> Self {
        SceneTable::new(file.script_id, file.default_state, file.scenes)
    }
}

/// Lookup table of scene deltas for one script, plus its default state.
///
/// Entries are joined to lines by `(section_id, line_id)`, never by position,
/// so reordering a script does not silently shift its scenes.
///
/// # Example TOML Structure
///
/// ```toml
/// script_id = "pythagorean"
///
/// [default_state]
/// isAnimating = false
/// show = { triangle = false, squares = false }
///
/// [[scenes]]
/// section_id = "intro"
/// line_id = "intro-2"
/// scene_id = "intro-history"
/// kind = "animation"
/// state = { show = { triangle = true }, params = { a = 3, b = 4 } }
/// ```
#[derive(Debug, Clone, Default, Deserialize, Getters)]
#[serde(from = "SceneTableFile")]
pub struct SceneTable {
    /// Script this table belongs to
    script_id: String,
    /// State shown before any delta applies
    default_state: VisualState,
    /// Rows in file order
    scenes: Vec<SceneEntry>,
    #[getter(skip)]
    index: HashMap<(String, String), usize>,
}

impl SceneTable {
    /// Builds a table and its `(section_id, line_id)` index.
    ///
    /// When two rows share a key, the later row wins; [`SceneTable::audit`]
    /// reports the duplicate.
    pub fn new(
        script_id: impl Into<String>,
        default_state: VisualState,
        scenes: Vec<SceneEntry>,
    ) -> Self {
        let index = scenes
            .iter()
            .enumerate()
            .map(|(i, entry)| ((entry.section_id.clone(), entry.line_id.clone()), i))
            .collect();

        Self {
            script_id: script_id.into(),
            default_state,
            scenes,
            index,
        }
    }

    /// A table with no rows, for scripts without scene data.
    pub fn empty(script_id: impl Into<String>) -> Self {
        Self::new(script_id, VisualState::new(), Vec::new())
    }

    /// Loads a table from a `.toml` or `.json` file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScriptError> {
        let table: Self = read_document(path.as_ref())?;
        debug!(script_id = %table.script_id, entries = table.scenes.len(), "Loaded scene table");
        Ok(table)
    }

    /// Looks up the row for a line.
    pub fn lookup(&self, section_id: &str, line_id: &str) -> Option<&SceneEntry> {
        self.index
            .get(&(section_id.to_string(), line_id.to_string()))
            .map(|&i| &self.scenes[i])
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Cross-checks the table against a script.
    #[tracing::instrument(skip_all, fields(script_id = %script.id(), entries = self.scenes.len()))]
    pub fn audit(&self, script: &Script) -> SceneAudit {
        let mut audit = SceneAudit::default();
        let mut line_keys = HashSet::new();

        for section in script.sections() {
            for line in section.lines() {
                line_keys.insert((section.id().as_str(), line.id().as_str()));
                if line.scene().is_some() && self.lookup(section.id(), line.id()).is_none() {
                    audit.missing.push(SceneError::new(SceneErrorKind::MissingDelta {
                        section_id: section.id().clone(),
                        line_id: line.id().clone(),
                    }));
                }
            }
        }

        let mut seen = HashSet::new();
        for entry in &self.scenes {
            let key = (entry.section_id.as_str(), entry.line_id.as_str());
            if !seen.insert(key) {
                audit.duplicates.push(SceneError::new(SceneErrorKind::DuplicateEntry {
                    section_id: entry.section_id.clone(),
                    line_id: entry.line_id.clone(),
                }));
            }
            if !line_keys.contains(&key) {
                audit.orphans.push(SceneError::new(SceneErrorKind::OrphanEntry {
                    section_id: entry.section_id.clone(),
                    line_id: entry.line_id.clone(),
                }));
            }
        }

        debug!(
            missing = audit.missing.len(),
            orphans = audit.orphans.len(),
            duplicates = audit.duplicates.len(),
            "Audited scene table"
        );
        audit
    }
}

/// Integrity report produced by [`SceneTable::audit`].
#[derive(Debug, Clone, Default, Getters)]
pub struct SceneAudit {
    /// Lines whose scene reference has no table row
    missing: Vec<SceneError>,
    /// Rows that match no line
    orphans: Vec<SceneError>,
    /// Rows sharing a key with an earlier row
    duplicates: Vec<SceneError>,
}

impl SceneAudit {
    /// Whether no problem was found.
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.orphans.is_empty() && self.duplicates.is_empty()
    }

    /// All problems, missing deltas first.
    pub fn problems(&self) -> impl Iterator<Item = &SceneError> {
        self.missing
            .iter()
            .chain(self.orphans.iter())
            .chain(self.duplicates.iter())
    }
}
