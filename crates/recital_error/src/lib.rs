//! Error types for the Recital narration engine.
//!
//! This crate provides the error taxonomy shared by every Recital crate.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! Only [`ConfigError`] is ever surfaced by the playback engine itself. Scene,
//! speech and navigation problems are absorbed and logged so that playback
//! keeps moving forward.
//!
//! # Examples
//!
//! ```
//! use recital_error::{ConfigError, ConfigErrorKind, RecitalResult};
//!
//! fn load() -> RecitalResult<()> {
//!     Err(ConfigError::new(ConfigErrorKind::EmptyScript("demo".into())))?
//! }
//!
//! assert!(load().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod config;
mod error;
mod scene;
mod script;
mod session;
mod speech;

pub use builder::{BuilderError, BuilderErrorKind};
pub use config::{ConfigError, ConfigErrorKind};
pub use error::{RecitalError, RecitalErrorKind, RecitalResult};
pub use scene::{SceneError, SceneErrorKind};
pub use script::{ScriptError, ScriptErrorKind};
pub use session::{SessionError, SessionErrorKind};
pub use speech::{SpeechError, SpeechErrorKind};
