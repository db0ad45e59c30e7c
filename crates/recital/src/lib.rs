//! Recital - narration playback and scene synchronization
//!
//! Recital turns a narration script (sections of lines, each with text and an
//! optional scene reference) into a live presentation: it drives a
//! text-to-speech backend line by line, auto-advances, keeps a scrubber-style
//! progress estimate, and resolves the visual state the renderer should show
//! at every point, including after seeks, rate changes and voice switches.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use recital::{NarrationSession, PlaybackCommand, PlaybackConfig, PlaybackMachine, Script, SimulatedSpeech, SystemClock};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PlaybackConfig::load()?;
//!     let (events, events_rx) = tokio::sync::mpsc::unbounded_channel();
//!     let speech = SimulatedSpeech::new(events, &config);
//!     let machine = PlaybackMachine::new(speech, config, Arc::new(SystemClock::new()))?;
//!
//!     let (handle, _task) = NarrationSession::spawn(machine, events_rx);
//!     handle.load(Script::from_file("script.toml")?, None, None).await?;
//!     handle.send(PlaybackCommand::StartNarration).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! Recital is organized as a workspace with focused crates:
//!
//! - `recital_error` - Error types
//! - `recital_core` - Scripts, scene tables, visual state, duration manifests
//! - `recital_interface` - Speech backend and clock traits
//! - `recital_playback` - Speech controller, resolver, progress model, state machine, session
//!
//! This crate (`recital`) re-exports everything for convenience and ships the
//! `recital` command-line player.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod simulated;

pub use simulated::SimulatedSpeech;

// Re-export error types
pub use recital_error::{
    BuilderError, BuilderErrorKind, ConfigError, ConfigErrorKind, RecitalError, RecitalErrorKind,
    RecitalResult, SceneError, SceneErrorKind, ScriptError, ScriptErrorKind, SessionError,
    SessionErrorKind, SpeechError, SpeechErrorKind,
};

// Re-export core types
pub use recital_core::{
    AnimationCue, AnimationCueBuilder, DurationManifest, Line, LineBuilder, LineCursor,
    ManifestEntry, NESTED_MERGE_KEYS, PlaybackPosition, SceneAudit, SceneCatalog, SceneDelta,
    SceneDeltaBuilder, SceneEntry, SceneEntryBuilder, SceneKind, SceneTable, Script,
    ScriptBuilder, Section, SectionBuilder, VisualState, Voice, init_telemetry,
};

// Re-export collaborator traits
pub use recital_interface::{
    Clock, Generation, ManualClock, SpeechBackend, SpeechEvent, SpeechEventKind, SystemClock,
    UtteranceRequest,
};

// Re-export the playback engine
pub use recital_playback::{
    NarrationHandle, NarrationSession, PlaybackCommand, PlaybackConfig, PlaybackMachine,
    PlaybackMessage, PlaybackNotification, PlaybackPhase, PlaybackSnapshot, ProgressModel,
    SceneResolver, SpeechController, SpeechOutcome,
};
