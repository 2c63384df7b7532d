//! Default configuration constants for micstream.
//!
//! This module provides shared constants used across different configuration types
//! to ensure consistency and eliminate duplication.

/// Default audio sample rate in Hz.
///
/// 44.1kHz matches what desktop audio stacks and browsers deliver by default,
/// so captured sessions play back everywhere without conversion.
pub const SAMPLE_RATE: u32 = 44100;

/// Default number of capture channels (mono).
pub const CHANNELS: u16 = 1;

/// Maximum supported channel count.
///
/// The interleaver handles mono and stereo only; anything wider is rejected
/// at session setup.
pub const MAX_CHANNELS: u16 = 2;

/// Flush threshold in frames for streaming mode.
///
/// Once the sample buffer accumulates this many frames per channel, the
/// buffered audio is merged, encoded to 16-bit PCM, and handed to the
/// transport as one block. 4096 frames is ~93ms at 44.1kHz.
pub const FLUSH_THRESHOLD_FRAMES: usize = 4096;

/// Frames per sample block delivered by the capture sources.
///
/// Matches the render quantum of real-time audio callbacks (128 frames).
pub const BLOCK_FRAMES: usize = 128;

/// Capture-to-control channel capacity (number of buffered messages).
pub const CHANNEL_BUFFER_SIZE: usize = 1000;

/// Polling interval for the capture thread when no samples are available (ms).
pub const POLL_INTERVAL_MS: u64 = 10;

/// Default WebSocket endpoint for streaming mode.
pub const WEBSOCKET_URL: &str = "ws://localhost:8080/websocket";

/// Default HTTP endpoint for batch upload mode.
pub const UPLOAD_URL: &str = "http://localhost:8000/upload";

/// Default multipart form field name for batch uploads.
pub const UPLOAD_FIELD: &str = "audio_data";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flush_threshold_is_a_whole_number_of_blocks() {
        assert_eq!(FLUSH_THRESHOLD_FRAMES % BLOCK_FRAMES, 0);
    }

    #[test]
    fn default_channels_within_supported_range() {
        assert!(CHANNELS >= 1 && CHANNELS <= MAX_CHANNELS);
    }
}
