//! Scripts, scene tables and ready-made machines.

use super::{RecordingBackend, SpeechLog};
use recital_core::{
    LineBuilder, SceneDelta, SceneEntryBuilder, SceneTable, Script, ScriptBuilder,
    SectionBuilder, VisualState,
};
use recital_interface::ManualClock;
use recital_playback::{PlaybackConfig, PlaybackMachine};
use serde_json::json;
use std::sync::Arc;

/// Two sections of two lines each.
///
/// Line texts have 8, 12, 16 and 20 non-space characters so that, at the
/// default 4 chars/s, their estimates are 2, 3, 4 and 5 seconds.
pub fn two_by_two() -> Script {
    let line = |id: &str, text: &str, scene: Option<&str>| {
        let mut builder = LineBuilder::default();
        builder.id(id).text(text);
        if let Some(scene) = scene {
            builder.scene(scene);
        }
        builder.build().unwrap()
    };

    ScriptBuilder::default()
        .id("demo")
        .title("Demo")
        .sections(vec![
            SectionBuilder::default()
                .id("intro")
                .title("Introduction")
                .lines(vec![
                    line("intro-1", "aaaa aaaa", Some("title")),
                    line("intro-2", "bbbb bbbb bbbb", None),
                ])
                .build()
                .unwrap(),
            SectionBuilder::default()
                .id("proof")
                .title("Proof")
                .lines(vec![
                    line("proof-1", "cccc cccc cccc cccc", Some("triangle")),
                    line("proof-2", "dddd dddd dddd dddd dddd", Some("squares")),
                ])
                .build()
                .unwrap(),
        ])
        .build()
        .unwrap()
}

fn delta(value: serde_json::Value) -> SceneDelta {
    SceneDelta::new(value.as_object().cloned().unwrap())
}

/// Scene table for [`two_by_two`].
///
/// `proof-1` shows the triangle and `proof-2` adds the squares, so the state
/// of `proof-2` depends on the line before it.
pub fn two_by_two_table() -> SceneTable {
    let default_state =
        VisualState::try_from(json!({"show": {"triangle": false, "squares": false}, "step": 0}))
            .unwrap();
    let entry = |section: &str, line: &str, value| {
        SceneEntryBuilder::default()
            .section_id(section)
            .line_id(line)
            .delta(delta(value))
            .build()
            .unwrap()
    };

    SceneTable::new(
        "demo",
        default_state,
        vec![
            entry("intro", "intro-1", json!({"step": 1})),
            entry("proof", "proof-1", json!({"show": {"triangle": true}, "step": 2})),
            entry("proof", "proof-2", json!({"show": {"squares": true}, "step": 3})),
        ],
    )
}

/// A machine over `script` with the fixture table, the default config and a
/// manual clock.
#[allow(dead_code)]
pub fn machine(script: Script) -> (PlaybackMachine<RecordingBackend>, SpeechLog, ManualClock) {
    let (backend, log) = RecordingBackend::new();
    let (machine, clock) = machine_with(backend, PlaybackConfig::default(), script);
    (machine, log, clock)
}

/// A machine over `script` with a custom backend and config.
pub fn machine_with(
    backend: RecordingBackend,
    config: PlaybackConfig,
    script: Script,
) -> (PlaybackMachine<RecordingBackend>, ManualClock) {
    let clock = ManualClock::new();
    let mut machine = PlaybackMachine::new(backend, config, Arc::new(clock.clone())).unwrap();
    machine
        .load_script_with(script, Arc::new(two_by_two_table()), None)
        .unwrap();
    (machine, clock)
}
