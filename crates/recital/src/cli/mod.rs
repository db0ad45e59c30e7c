//! CLI command handlers.

mod check;
mod commands;
mod outline;
mod play;

pub use check::check;
pub use commands::{Cli, Commands};
pub use outline::outline;
pub use play::{PlayOptions, play};

use recital::{ConfigError, PlaybackConfig};
use std::path::Path;

/// Loads playback settings from an explicit file or the standard locations.
pub fn load_config(path: Option<&Path>) -> Result<PlaybackConfig, ConfigError> {
    match path {
        Some(path) => PlaybackConfig::from_file(path),
        None => PlaybackConfig::load(),
    }
}
