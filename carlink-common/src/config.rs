//! Configuration loading and config file resolution
//!
//! Bootstrap configuration is a small TOML file. Every field has a built-in
//! default, so a missing file is a warning rather than a startup failure.
//!
//! Config file resolution order:
//! 1. Command-line argument (highest priority)
//! 2. `CARLINK_CONFIG` environment variable
//! 3. User config directory (`~/.config/carlink/config.toml` on Linux)
//! 4. System config (`/etc/carlink/config.toml`, Linux only)
//! 5. Compiled defaults (fallback)

use crate::protocol::LogicalChannel;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "CARLINK_CONFIG";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Persisted audio settings
    #[serde(default)]
    pub audio: AudioSettings,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Persisted audio settings consumed by the mixing engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Default Music volume (normalized 0.0-1.0)
    pub music_volume: f32,

    /// Default Navigation volume (normalized 0.0-1.0)
    pub navigation_volume: f32,

    /// Default voice assistant volume (normalized 0.0-1.0)
    pub voice_assistant_volume: f32,

    /// Default call volume (normalized 0.0-1.0)
    pub call_volume: f32,

    /// Delay between MediaStart and the beginning of its fade-in ramp
    pub media_delay_ms: u64,

    /// Length of the Music fade-in ramp
    pub ramp_duration_ms: u64,

    /// Ring buffer length of each hardware sink
    pub sink_buffer_ms: u64,

    /// Requested microphone capture rate
    pub microphone_sample_rate: u32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            music_volume: 0.8,
            navigation_volume: 1.0,
            voice_assistant_volume: 1.0,
            call_volume: 1.0,
            media_delay_ms: 0,
            ramp_duration_ms: 500,
            sink_buffer_ms: 200,
            microphone_sample_rate: 16_000,
        }
    }
}

impl AudioSettings {
    /// Default volume for a logical channel
    pub fn volume_for(&self, channel: LogicalChannel) -> f32 {
        match channel {
            LogicalChannel::Music => self.music_volume,
            LogicalChannel::Navigation => self.navigation_volume,
            LogicalChannel::VoiceAssistant => self.voice_assistant_volume,
            LogicalChannel::Call => self.call_volume,
        }
    }

    /// Validate settings, clamping volumes into [0, 1]
    ///
    /// # Errors
    /// - Zero ramp duration or sink buffer length
    /// - Zero microphone sample rate
    pub fn validate(mut self) -> Result<Self> {
        for volume in [
            &mut self.music_volume,
            &mut self.navigation_volume,
            &mut self.voice_assistant_volume,
            &mut self.call_volume,
        ] {
            if volume.is_nan() {
                return Err(Error::Config("Volume must be a number".to_string()));
            }
            if !(0.0..=1.0).contains(&*volume) {
                warn!("Volume {} out of range, clamping to [0, 1]", volume);
                *volume = volume.clamp(0.0, 1.0);
            }
        }

        if self.ramp_duration_ms == 0 {
            return Err(Error::Config("ramp_duration_ms must be greater than zero".to_string()));
        }
        if self.sink_buffer_ms == 0 {
            return Err(Error::Config("sink_buffer_ms must be greater than zero".to_string()));
        }
        if self.microphone_sample_rate == 0 {
            return Err(Error::Config("microphone_sample_rate must be greater than zero".to_string()));
        }

        Ok(self)
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;
        config.audio = config.audio.validate()?;
        Ok(config)
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file {:?}: {}", path, e)))?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Resolve and load configuration following the documented priority order
    ///
    /// An explicit path (CLI or environment) must exist and parse. Implicit
    /// locations fall back to compiled defaults with a warning.
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = cli_path {
            return Self::load_from(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::load_from(Path::new(&path));
        }

        match find_config_file() {
            Some(path) => Self::load_from(&path),
            None => {
                warn!("No config file found, using compiled defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Locate the platform config file, if one exists
pub fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("carlink").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/carlink/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}
