//! Playback engine for the Recital narration engine.
//!
//! This crate turns a [`Script`](recital_core::Script) into a timed, narrated
//! presentation:
//!
//! - [`SpeechController`] keeps one utterance in flight and turns speech
//!   failures into delayed completions
//! - [`SceneResolver`] resolves the visual state of each line
//! - [`ProgressModel`] estimates `current_time` / `total_duration`
//! - [`PlaybackMachine`] sequences all of the above
//! - [`NarrationSession`] runs a machine on a tokio task behind a
//!   [`NarrationHandle`]
//!
//! The machine itself is synchronous and clock-injected, so every behavior can
//! be tested by feeding synthetic speech events.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod machine;
mod progress;
mod resolver;
mod session;
mod speech;

pub use config::PlaybackConfig;
pub use machine::{
    PlaybackCommand, PlaybackMachine, PlaybackMessage, PlaybackNotification, PlaybackPhase,
    PlaybackSnapshot,
};
pub use progress::ProgressModel;
pub use resolver::SceneResolver;
pub use session::{NarrationHandle, NarrationSession};
pub use speech::{SpeechController, SpeechOutcome};
