//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Processing limits and timeouts.
    pub limits: LimitsConfig,

    /// Media codec and sampling settings.
    pub media: MediaConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Processing limits and timeouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum input file size in bytes. Checked before any decode work.
    pub max_file_size_bytes: u64,

    /// Source duration above which a long-input warning is surfaced.
    pub long_input_warning_secs: f64,

    /// Timeout bounding model initialization.
    pub model_init_timeout_secs: u64,

    /// Timeout bounding the enhancement call.
    pub enhancement_timeout_secs: u64,
}

/// Media codec and sampling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Sample rate for extracted and enhanced audio (Hz).
    pub audio_sample_rate: u32,

    /// Codec for the output audio stream.
    pub output_audio_codec: String,

    /// Codec for the output video stream ("copy" remuxes without re-encoding).
    pub output_video_codec: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "clearcast=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            limits: LimitsConfig::default(),
            media: MediaConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: 50 * 1024 * 1024,
            long_input_warning_secs: 300.0,
            model_init_timeout_secs: 60,
            enhancement_timeout_secs: 300,
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            audio_sample_rate: 48_000,
            output_audio_codec: "aac".to_string(),
            output_video_codec: "copy".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }
}

/// Read a required secret from the environment.
///
/// Tokens never live in the config file.
pub fn require_env(name: &str) -> crate::error::ClearcastResult<String> {
    std::env::var(name).map_err(|_| {
        crate::error::ClearcastError::config(format!("{name} environment variable is not set"))
    })
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("clearcast").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_processing_contract() {
        let config = AppConfig::default();
        assert_eq!(config.limits.max_file_size_bytes, 50 * 1024 * 1024);
        assert_eq!(config.limits.model_init_timeout_secs, 60);
        assert_eq!(config.limits.enhancement_timeout_secs, 300);
        assert_eq!(config.media.audio_sample_rate, 48_000);
        assert_eq!(config.media.output_video_codec, "copy");
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(
            parsed.limits.long_input_warning_secs,
            config.limits.long_input_warning_secs
        );
    }
}
