//! Error types for micstream.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MicstreamError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Session setup errors
    #[error("Unsupported channel count: {channels} (mono and stereo only)")]
    UnsupportedChannelCount { channels: u16 },

    #[error("Invalid sample rate: {rate}")]
    InvalidSampleRate { rate: u32 },

    // Audio capture errors
    #[error("Audio device not found: {device}")]
    AudioDeviceNotFound { device: String },

    #[error("Audio format mismatch: expected {expected}, got {actual}")]
    AudioFormatMismatch { expected: String, actual: String },

    #[error("Audio capture failed: {message}")]
    AudioCapture { message: String },

    // Buffer accumulation errors
    #[error("Channel length mismatch: expected {expected} frames, got {actual}")]
    ChannelLengthMismatch { expected: usize, actual: usize },

    #[error("Channel count mismatch: expected {expected} channels, got {actual}")]
    ChannelCountMismatch { expected: usize, actual: usize },

    // Transport errors
    #[error("Transport error: {message}")]
    Transport { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, MicstreamError>;
