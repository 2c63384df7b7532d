//! micstream - Microphone capture and PCM/WAV streaming
//!
//! Captures audio from a microphone (or a generator), accumulates sample
//! blocks until a flush policy fires, encodes to 16-bit PCM or WAV, and
//! delivers the result over WebSocket, HTTP multipart upload, or to local
//! files.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod capture;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod pcm;
pub mod transport;

// Core traits (source → controller → sink)
pub use audio::source::{AudioSource, MockAudioSource, SampleBlock};
pub use transport::{EncodedBlock, MockSink, TransportSink};

// Pipeline
pub use capture::{
    CaptureController, CaptureEvent, CapturePipeline, CapturePipelineHandle, FlushPolicy,
};

// Error handling
pub use error::{MicstreamError, Result};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }
}
