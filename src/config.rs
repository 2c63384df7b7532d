//! Configuration loading and validation.
//!
//! Settings come from a TOML file (default `~/.config/micstream/config.toml`),
//! with `MICSTREAM_*` environment variables overriding individual values and
//! CLI flags overriding both.

use crate::defaults;
use crate::error::{MicstreamError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub transport: TransportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioConfig {
    /// Input device name; `None` selects the system default.
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "default_channels")]
    pub channels: u16,
    /// Frames accumulated before a streaming flush.
    #[serde(default = "default_flush_threshold")]
    pub flush_threshold: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransportConfig {
    #[serde(default = "default_websocket_url")]
    pub websocket_url: String,
    #[serde(default = "default_upload_url")]
    pub upload_url: String,
    /// Multipart form field name the upload server expects.
    #[serde(default = "default_upload_field")]
    pub upload_field: String,
}

fn default_sample_rate() -> u32 {
    defaults::SAMPLE_RATE
}

fn default_channels() -> u16 {
    defaults::CHANNELS
}

fn default_flush_threshold() -> usize {
    defaults::FLUSH_THRESHOLD_FRAMES
}

fn default_websocket_url() -> String {
    defaults::WEBSOCKET_URL.to_string()
}

fn default_upload_url() -> String {
    defaults::UPLOAD_URL.to_string()
}

fn default_upload_field() -> String {
    defaults::UPLOAD_FIELD.to_string()
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: default_sample_rate(),
            channels: default_channels(),
            flush_threshold: default_flush_threshold(),
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            websocket_url: default_websocket_url(),
            upload_url: default_upload_url(),
            upload_field: default_upload_field(),
        }
    }
}

impl Config {
    /// Load configuration from a specific path.
    ///
    /// # Errors
    /// Returns `ConfigFileNotFound` if the file does not exist and a parse
    /// error for invalid TOML.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(MicstreamError::ConfigFileNotFound {
                path: path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    ///
    /// A present-but-invalid file still fails loudly; only absence falls
    /// back.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Default config file location: `~/.config/micstream/config.toml`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("micstream")
            .join("config.toml")
    }

    /// Apply `MICSTREAM_*` environment variable overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(device) = std::env::var("MICSTREAM_DEVICE")
            && !device.is_empty()
        {
            self.audio.device = Some(device);
        }
        if let Ok(rate) = std::env::var("MICSTREAM_SAMPLE_RATE")
            && let Ok(rate) = rate.parse()
        {
            self.audio.sample_rate = rate;
        }
        if let Ok(channels) = std::env::var("MICSTREAM_CHANNELS")
            && let Ok(channels) = channels.parse()
        {
            self.audio.channels = channels;
        }
        if let Ok(url) = std::env::var("MICSTREAM_WEBSOCKET_URL")
            && !url.is_empty()
        {
            self.transport.websocket_url = url;
        }
        if let Ok(url) = std::env::var("MICSTREAM_UPLOAD_URL")
            && !url.is_empty()
        {
            self.transport.upload_url = url;
        }
        self
    }

    /// Validate values that serde cannot check structurally.
    pub fn validate(&self) -> Result<()> {
        if self.audio.channels == 0 || self.audio.channels > defaults::MAX_CHANNELS {
            return Err(MicstreamError::ConfigInvalidValue {
                key: "audio.channels".to_string(),
                message: format!(
                    "{} is not supported (mono and stereo only)",
                    self.audio.channels
                ),
            });
        }
        if self.audio.sample_rate == 0 {
            return Err(MicstreamError::ConfigInvalidValue {
                key: "audio.sample_rate".to_string(),
                message: "must be non-zero".to_string(),
            });
        }
        if self.audio.flush_threshold == 0 {
            return Err(MicstreamError::ConfigInvalidValue {
                key: "audio.flush_threshold".to_string(),
                message: "must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}
