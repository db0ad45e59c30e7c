//! Playback configuration.
//!
//! Settings come from three layers, later layers overriding earlier ones:
//! - Bundled defaults (include_str! from recital.toml)
//! - User config in the home directory (~/.config/recital/recital.toml)
//! - User config in the current directory (./recital.toml)

use config::{Config, File, FileFormat};
use recital_core::Voice;
use recital_error::{ConfigError, ConfigErrorKind};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};

/// Tunables of the playback engine.
///
/// # Example
///
/// ```toml
/// default_voice = "yunxi"
/// voices = ["xiaoxiao", "yunxi", "yunyang"]
/// default_rate = 1.0
/// min_rate = 0.5
/// max_rate = 2.0
/// chars_per_second = 4.0
/// min_line_secs = 1.5
/// fallback_ms_per_char = 80
/// fallback_min_ms = 800
/// tick_ms = 100
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Voice selected when the engine is created
    pub default_voice: String,
    /// Voices offered by the presenter
    pub voices: Vec<String>,
    /// Initial playback rate
    pub default_rate: f32,
    /// Lowest accepted playback rate
    pub min_rate: f32,
    /// Highest accepted playback rate
    pub max_rate: f32,
    /// Characters spoken per second at rate 1.0, for duration estimates
    pub chars_per_second: f32,
    /// Floor of a per-line duration estimate, in seconds
    pub min_line_secs: f32,
    /// Fallback delay per character after a speech failure
    pub fallback_ms_per_char: u64,
    /// Minimum fallback delay after a speech failure
    pub fallback_min_ms: u64,
    /// Session timer period
    pub tick_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            default_voice: "yunxi".to_string(),
            voices: vec![
                "xiaoxiao".to_string(),
                "yunxi".to_string(),
                "yunyang".to_string(),
            ],
            default_rate: 1.0,
            min_rate: 0.5,
            max_rate: 2.0,
            chars_per_second: 4.0,
            min_line_secs: 1.5,
            fallback_ms_per_char: 80,
            fallback_min_ms: 800,
            tick_ms: 100,
        }
    }
}

impl PlaybackConfig {
    /// Load configuration from a single file.
    ///
    /// Keys missing from the file keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a value is
    /// out of range.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config: Self = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                ConfigError::new(ConfigErrorKind::Load(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                ConfigError::new(ConfigErrorKind::Load(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with precedence: current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and silently skipped if not found.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use recital_playback::PlaybackConfig;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = PlaybackConfig::load()?;
    /// println!("Default voice: {}", config.default_voice);
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if a present file cannot be parsed, or if the merged
    /// values are out of range.
    #[instrument]
    pub fn load() -> Result<Self, ConfigError> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        const DEFAULT_CONFIG: &str = include_str!("../../../recital.toml");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/recital/recital.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("recital").required(false));

        let config: Self = builder
            .build()
            .map_err(|e| {
                ConfigError::new(ConfigErrorKind::Load(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                ConfigError::new(ConfigErrorKind::Load(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigErrorKind::InvalidSetting`] naming the first bad key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_voice.trim().is_empty() {
            return Err(ConfigError::invalid_setting("default_voice", "must not be empty"));
        }
        if !(self.chars_per_second.is_finite() && self.chars_per_second > 0.0) {
            return Err(ConfigError::invalid_setting(
                "chars_per_second",
                format!("must be positive, got {}", self.chars_per_second),
            ));
        }
        if !(self.min_line_secs.is_finite() && self.min_line_secs >= 0.0) {
            return Err(ConfigError::invalid_setting(
                "min_line_secs",
                format!("must not be negative, got {}", self.min_line_secs),
            ));
        }
        if !(self.min_rate.is_finite() && self.min_rate > 0.0) {
            return Err(ConfigError::invalid_setting(
                "min_rate",
                format!("must be positive, got {}", self.min_rate),
            ));
        }
        if !(self.max_rate.is_finite() && self.max_rate >= self.min_rate) {
            return Err(ConfigError::invalid_setting(
                "max_rate",
                format!("must be at least min_rate ({}), got {}", self.min_rate, self.max_rate),
            ));
        }
        if !(self.min_rate..=self.max_rate).contains(&self.default_rate) {
            return Err(ConfigError::invalid_setting(
                "default_rate",
                format!(
                    "must lie in [{}, {}], got {}",
                    self.min_rate, self.max_rate, self.default_rate
                ),
            ));
        }
        if self.tick_ms == 0 {
            return Err(ConfigError::invalid_setting("tick_ms", "must be positive"));
        }
        Ok(())
    }

    /// The configured default voice.
    pub fn voice(&self) -> Voice {
        Voice::new(self.default_voice.as_str())
    }

    /// Clamps a requested rate into the accepted range.
    ///
    /// Returns `None` for NaN or infinite rates.
    pub fn clamp_rate(&self, rate: f32) -> Option<f32> {
        rate.is_finite().then(|| rate.clamp(self.min_rate, self.max_rate))
    }

    /// How long to wait before treating a failed utterance of `chars`
    /// characters as spoken.
    pub fn fallback_delay(&self, chars: usize) -> Duration {
        let proportional = self.fallback_ms_per_char.saturating_mul(chars as u64);
        Duration::from_millis(proportional.max(self.fallback_min_ms))
    }

    /// Session timer period.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}
