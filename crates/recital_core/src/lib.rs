//! Core data types for the Recital narration engine.
//!
//! This crate provides the immutable inputs of a narrated presentation:
//!
//! - **Scripts**: ordered sections of narration lines ([`Script`])
//! - **Visual state**: the flat field map a renderer draws ([`VisualState`])
//! - **Scene tables**: per-line visual deltas keyed by `(section_id, line_id)`
//!   ([`SceneTable`], [`SceneCatalog`])
//! - **Duration manifests**: measured audio lengths per line
//!   ([`DurationManifest`])
//!
//! Nothing in this crate has behavior over time; the playback engine lives in
//! `recital_playback`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod catalog;
mod document;
mod manifest;
mod position;
mod scene;
mod script;
mod table;
mod telemetry;
mod voice;

pub use catalog::SceneCatalog;
pub use manifest::{DurationManifest, ManifestEntry};
pub use position::{LineCursor, PlaybackPosition};
pub use scene::{NESTED_MERGE_KEYS, SceneDelta, SceneDeltaBuilder, SceneKind, VisualState};
pub use script::{
    AnimationCue, AnimationCueBuilder, Line, LineBuilder, Script, ScriptBuilder, Section,
    SectionBuilder,
};
pub use table::{SceneAudit, SceneEntry, SceneEntryBuilder, SceneTable};
pub use telemetry::init_telemetry;
pub use voice::Voice;
