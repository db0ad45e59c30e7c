//! Reading TOML or JSON documents from disk.

use recital_error::{ScriptError, ScriptErrorKind};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::debug;

/// Deserializes a document, choosing the format from the file extension.
pub(crate) fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, ScriptError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ScriptError::new(ScriptErrorKind::FileRead {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    })?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    debug!(path = %path.display(), format = ?extension, bytes = content.len(), "Read document");

    match extension.as_deref() {
        Some("toml") => parse_toml(&content),
        Some("json") => parse_json(&content),
        other => Err(ScriptError::new(ScriptErrorKind::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        ))),
    }
}

pub(crate) fn parse_toml<T: DeserializeOwned>(content: &str) -> Result<T, ScriptError> {
    toml::from_str(content)
        .map_err(|e| ScriptError::new(ScriptErrorKind::TomlParse(e.to_string())))
}

pub(crate) fn parse_json<T: DeserializeOwned>(content: &str) -> Result<T, ScriptError> {
    serde_json::from_str(content)
        .map_err(|e| ScriptError::new(ScriptErrorKind::JsonParse(e.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[derive(Debug, serde::Deserialize)]
    struct Named {
        name: String,
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "name: x").unwrap();

        let err = read_document::<Named>(file.path()).unwrap_err();
        assert!(matches!(err.kind, ScriptErrorKind::UnsupportedFormat(ref ext) if ext == "yaml"));
    }

    #[test]
    fn test_extension_selects_parser() {
        let mut file = tempfile::Builder::new().suffix(".JSON").tempfile().unwrap();
        write!(file, r#"{{"name": "intro"}}"#).unwrap();

        let named: Named = read_document(file.path()).unwrap();
        assert_eq!(named.name, "intro");
    }

    #[test]
    fn test_missing_file() {
        let err = read_document::<Named>(Path::new("/nonexistent/script.toml")).unwrap_err();
        assert!(matches!(err.kind, ScriptErrorKind::FileRead { .. }));
    }
}
