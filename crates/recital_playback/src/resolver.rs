//! Scene resolution: which visual state a line shows.

use recital_core::{Line, LineCursor, SceneTable, Script, Section, VisualState};
use recital_error::{SceneError, SceneErrorKind};
use std::sync::Arc;
use tracing::{trace, warn};

/// Resolves visual states for one script against its scene table.
///
/// Rows are matched to lines by `(section_id, line_id)`. A line whose scene
/// reference has no row keeps the state in effect and logs a missing delta;
/// a line with neither a reference nor a row keeps it silently.
#[derive(Debug, Clone)]
pub struct SceneResolver {
    table: Arc<SceneTable>,
}

impl SceneResolver {
    /// Creates a resolver over a table.
    pub fn new(table: Arc<SceneTable>) -> Self {
        Self { table }
    }

    /// The scene table.
    pub fn table(&self) -> &SceneTable {
        &self.table
    }

    /// State shown before the first line's delta applies.
    pub fn default_state(&self) -> VisualState {
        self.table.default_state().clone()
    }

    /// Incremental step: the state after `line` given the state before it.
    pub fn step(&self, previous: &VisualState, section: &Section, line: &Line) -> VisualState {
        match self.table.lookup(section.id(), line.id()) {
            Some(entry) => {
                trace!(section = %section.id(), line = %line.id(), "Applying scene delta");
                previous.merged(entry.delta())
            }
            None => {
                if let Some(scene) = line.scene() {
                    let error = SceneError::new(SceneErrorKind::MissingDelta {
                        section_id: section.id().clone(),
                        line_id: line.id().clone(),
                    });
                    warn!(scene = %scene, error = %error, "Keeping previous visual state");
                }
                previous.clone()
            }
        }
    }

    /// Replays every delta from the start of the script up to and including
    /// `target`, starting from the default state.
    ///
    /// Returns the default state if `target` is not a line of `script`.
    pub fn resolve_at(&self, script: &Script, target: LineCursor) -> VisualState {
        let mut state = self.default_state();
        if script.line(target).is_none() {
            return state;
        }
        for cursor in script.cursors().take_while(|cursor| *cursor <= target) {
            let Some(section) = script.section(cursor.section) else {
                break;
            };
            let Some(line) = section.lines().get(cursor.line) else {
                break;
            };
            state = self.step(&state, section, line);
        }
        state
    }
}
