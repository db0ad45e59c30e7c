//! Registry of scene tables by script id.

use crate::SceneTable;
use recital_error::{ScriptError, ScriptErrorKind};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Scene tables for every known topic, keyed by script id.
#[derive(Debug, Clone, Default)]
pub struct SceneCatalog {
    tables: HashMap<String, Arc<SceneTable>>,
}

impl SceneCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a table under its script id, replacing any previous one.
    pub fn register(&mut self, table: SceneTable) {
        let script_id = table.script_id().clone();
        if self.tables.insert(script_id.clone(), Arc::new(table)).is_some() {
            warn!(script_id = %script_id, "Replaced existing scene table");
        }
    }

    /// Gets the table for a script.
    pub fn get(&self, script_id: &str) -> Option<Arc<SceneTable>> {
        self.tables.get(script_id).cloned()
    }

    /// Number of registered tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Registered script ids, sorted.
    pub fn script_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Loads every `.toml` and `.json` scene table in a directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be listed or any table fails
    /// to parse.
    #[tracing::instrument(skip_all, fields(dir = %dir.as_ref().display()))]
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self, ScriptError> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|e| {
            ScriptError::new(ScriptErrorKind::FileRead {
                path: dir.display().to_string(),
                message: e.to_string(),
            })
        })?;

        let mut paths: Vec<_> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                matches!(
                    path.extension().and_then(|ext| ext.to_str()),
                    Some("toml") | Some("json")
                )
            })
            .collect();
        paths.sort();

        let mut catalog = Self::new();
        for path in paths {
            catalog.register(SceneTable::from_file(&path)?);
        }

        debug!(tables = catalog.len(), "Loaded scene catalog");
        Ok(catalog)
    }
}
