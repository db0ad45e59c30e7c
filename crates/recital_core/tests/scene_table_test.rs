//! Tests for scene tables, audits and the catalog.

use recital_core::{SceneCatalog, SceneKind, SceneTable, Script};
use recital_error::SceneErrorKind;
use serde_json::json;
use std::io::Write;
use tempfile::Builder;

const TABLE_TOML: &str = r#"
script_id = "pythagorean"

[default_state]
isAnimating = false
show = { triangle = false, squares = false }

[[scenes]]
section_id = "intro"
line_id = "intro-1"
scene_id = "intro-welcome"
kind = "title"
state = { show = { triangle = false } }

[[scenes]]
section_id = "intro"
line_id = "intro-2"
kind = "animation"
state = { show = { triangle = true }, params = { a = 3, b = 4 } }

[[scenes]]
section_id = "proof"
line_id = "proof-1"
state = { show = { proof = true } }
"#;

const SCRIPT_TOML: &str = r#"
id = "pythagorean"
title = "Pythagorean"

[[sections]]
id = "intro"
lines = [
    { id = "intro-1", text = "Welcome.", scene = "intro-welcome" },
    { id = "intro-2", text = "History.", scene = "intro-history" },
    { id = "intro-3", text = "Names.", scene = "intro-names" },
]
"#;

fn table() -> SceneTable {
    let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
    write!(file, "{}", TABLE_TOML).unwrap();
    SceneTable::from_file(file.path()).unwrap()
}

#[test]
fn test_table_lookup_by_section_and_line() {
    let table = table();

    assert_eq!(table.script_id(), "pythagorean");
    assert_eq!(table.len(), 3);
    assert_eq!(
        table.default_state().get("show"),
        Some(&json!({"triangle": false, "squares": false}))
    );

    let entry = table.lookup("intro", "intro-2").unwrap();
    assert_eq!(*entry.delta().kind(), Some(SceneKind::Animation));
    assert_eq!(entry.delta().state().get("params"), Some(&json!({"a": 3, "b": 4})));

    assert!(table.lookup("intro", "intro-9").is_none());
    assert!(table.lookup("theorem", "intro-2").is_none());
}

#[test]
fn test_audit_reports_missing_and_orphan_entries() {
    let script: Script = SCRIPT_TOML.parse().unwrap();
    let audit = table().audit(&script);

    assert!(!audit.is_clean());
    assert_eq!(audit.missing().len(), 1);
    assert!(matches!(
        &audit.missing()[0].kind,
        SceneErrorKind::MissingDelta { section_id, line_id } if section_id == "intro" && line_id == "intro-3"
    ));
    assert_eq!(audit.orphans().len(), 1);
    assert!(audit.duplicates().is_empty());
    assert_eq!(audit.problems().count(), 2);
}

#[test]
fn test_duplicate_rows_keep_the_last_and_are_reported() {
    let table: SceneTable = serde_json::from_value(json!({
        "script_id": "dup",
        "scenes": [
            {"section_id": "s", "line_id": "l", "state": {"frequency": 1}},
            {"section_id": "s", "line_id": "l", "state": {"frequency": 2}}
        ]
    }))
    .unwrap();

    let entry = table.lookup("s", "l").unwrap();
    assert_eq!(entry.delta().state().get("frequency"), Some(&json!(2)));

    let script: Script = r#"
id = "dup"
title = "Dup"
[[sections]]
id = "s"
lines = [{ id = "l", text = "x", scene = "x" }]
"#
    .parse()
    .unwrap();
    let audit = table.audit(&script);
    assert_eq!(audit.duplicates().len(), 1);
    assert!(audit.missing().is_empty());
}

#[test]
fn test_catalog_loads_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("pythagorean.toml"), TABLE_TOML).unwrap();
    std::fs::write(
        dir.path().join("fractions.json"),
        r#"{"script_id": "fractions", "default_state": {"num1": 1}}"#,
    )
    .unwrap();
    std::fs::write(dir.path().join("README.md"), "not a table").unwrap();

    let catalog = SceneCatalog::load_dir(dir.path()).unwrap();
    assert_eq!(catalog.script_ids(), vec!["fractions", "pythagorean"]);
    assert!(catalog.get("fractions").unwrap().is_empty());
    assert!(catalog.get("fourier").is_none());
}
