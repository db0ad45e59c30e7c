//! Tests for reading and validating narration scripts.

use recital_core::{LineCursor, Script};
use recital_error::{ConfigErrorKind, ScriptErrorKind};
use std::io::Write;
use tempfile::Builder;

const PYTHAGOREAN_TOML: &str = r#"
id = "pythagorean"
title = "The Pythagorean Theorem"
subtitle = "a² + b² = c²"

[[sections]]
id = "intro"
title = "Introduction"

[[sections.lines]]
id = "intro-1"
text = "Welcome to the Pythagorean theorem."
scene = "intro-welcome"

[[sections.lines]]
id = "intro-2"
text = "It has been known for thousands of years."
scene = "intro-history"
cue = { action = "startAnimation", delay_ms = 500 }

[[sections]]
id = "theorem"
title = "The theorem"

[[sections.lines]]
id = "theorem-1"
text = "The squares on the legs add up to the square on the hypotenuse."
"#;

#[test]
fn test_parse_toml_script() {
    let script: Script = PYTHAGOREAN_TOML.parse().unwrap();

    assert_eq!(script.id(), "pythagorean");
    assert_eq!(script.subtitle().as_deref(), Some("a² + b² = c²"));
    assert_eq!(script.sections().len(), 2);
    assert_eq!(script.line_count(), 3);
    assert!(script.validate().is_ok());

    let second = script.line(LineCursor::new(0, 1)).unwrap();
    assert_eq!(second.scene().as_deref(), Some("intro-history"));
    let cue = second.cue().as_ref().unwrap();
    assert_eq!(cue.action(), "startAnimation");
    assert_eq!(*cue.delay_ms(), 500);

    let last = script.line(LineCursor::new(1, 0)).unwrap();
    assert!(last.scene().is_none());
    assert!(script.line(LineCursor::new(1, 1)).is_none());
}

#[test]
fn test_load_script_from_toml_file() {
    let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
    write!(file, "{}", PYTHAGOREAN_TOML).unwrap();

    let script = Script::from_file(file.path()).unwrap();
    assert_eq!(script.title(), "The Pythagorean Theorem");
}

#[test]
fn test_load_script_from_json_file() {
    let mut file = Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"{{
            "id": "fractions",
            "title": "Fractions",
            "sections": [
                {{"id": "intro", "title": "Intro", "lines": [{{"id": "intro-1", "text": "Half of a pie."}}]}}
            ]
        }}"#
    )
    .unwrap();

    let script = Script::from_file(file.path()).unwrap();
    assert_eq!(script.id(), "fractions");
    assert_eq!(script.line_count(), 1);
}

#[test]
fn test_malformed_toml_is_a_parse_error() {
    let err = "id = ".parse::<Script>().unwrap_err();
    assert!(matches!(err.kind, ScriptErrorKind::TomlParse(_)));
}

#[test]
fn test_script_without_sections_is_rejected() {
    let script: Script = r#"
id = "empty"
title = "Empty"
sections = []
"#
    .parse()
    .unwrap();

    let err = script.validate().unwrap_err();
    assert_eq!(err.kind, ConfigErrorKind::EmptyScript("empty".to_string()));
}

#[test]
fn test_section_without_lines_is_rejected() {
    let script: Script = r#"
id = "hollow"
title = "Hollow"

[[sections]]
id = "intro"
lines = []
"#
    .parse()
    .unwrap();

    let err = script.validate().unwrap_err();
    assert_eq!(err.kind, ConfigErrorKind::EmptySection("intro".to_string()));
}

#[test]
fn test_duplicate_section_ids_are_rejected() {
    let script: Script = r#"
id = "twice"
title = "Twice"

[[sections]]
id = "intro"
lines = [{ id = "a", text = "one" }]

[[sections]]
id = "intro"
lines = [{ id = "b", text = "two" }]
"#
    .parse()
    .unwrap();

    let err = script.validate().unwrap_err();
    assert_eq!(err.kind, ConfigErrorKind::DuplicateSectionId("intro".to_string()));
}
