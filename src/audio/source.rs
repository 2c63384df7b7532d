//! The audio source trait and sample block type.

use crate::error::{MicstreamError, Result};
use std::collections::VecDeque;

/// One multi-channel block of floating-point samples.
///
/// Every channel carries the same number of frames; samples are nominally in
/// [-1, 1] (the encoder clamps anything outside). Blocks are delivered
/// atomically by the source's callback and copied into the sample buffer on
/// receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBlock {
    channels: Vec<Vec<f32>>,
}

impl SampleBlock {
    /// Creates a block from per-channel sample arrays.
    ///
    /// # Errors
    /// Returns `ChannelLengthMismatch` if the channels differ in length and
    /// `UnsupportedChannelCount` if the channel list is empty.
    pub fn new(channels: Vec<Vec<f32>>) -> Result<Self> {
        let Some(first) = channels.first() else {
            return Err(MicstreamError::UnsupportedChannelCount { channels: 0 });
        };
        let frame_len = first.len();
        for channel in &channels {
            if channel.len() != frame_len {
                return Err(MicstreamError::ChannelLengthMismatch {
                    expected: frame_len,
                    actual: channel.len(),
                });
            }
        }
        Ok(Self { channels })
    }

    /// Creates a mono block.
    pub fn mono(samples: Vec<f32>) -> Self {
        Self {
            channels: vec![samples],
        }
    }

    /// Creates a stereo block from equal-length left and right channels.
    pub fn stereo(left: Vec<f32>, right: Vec<f32>) -> Result<Self> {
        Self::new(vec![left, right])
    }

    /// Number of channels in this block.
    pub fn channels(&self) -> usize {
        self.channels.len()
    }

    /// Frames per channel.
    pub fn frame_len(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Borrows one channel's samples.
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    /// Consumes the block, returning the per-channel arrays.
    pub fn into_inner(self) -> Vec<Vec<f32>> {
        self.channels
    }
}

/// Trait for audio source devices.
///
/// This trait allows swapping implementations (real audio device vs mock).
pub trait AudioSource: Send {
    /// Start capturing audio from the source.
    fn start(&mut self) -> Result<()>;

    /// Stop capturing audio from the source.
    fn stop(&mut self) -> Result<()>;

    /// Read the next pending sample block, if any.
    ///
    /// Returns `Ok(None)` when no samples are pending; callers poll again
    /// after a short interval.
    fn read_block(&mut self) -> Result<Option<SampleBlock>>;

    /// Number of channels this source delivers per block.
    fn channels(&self) -> u16;

    /// Whether this source ends on its own (file/queue-backed sources).
    ///
    /// Finite sources signal end-of-input by returning `Ok(None)` forever;
    /// live devices return false and run until stopped.
    fn is_finite(&self) -> bool {
        false
    }
}

impl AudioSource for Box<dyn AudioSource> {
    fn start(&mut self) -> Result<()> {
        (**self).start()
    }

    fn stop(&mut self) -> Result<()> {
        (**self).stop()
    }

    fn read_block(&mut self) -> Result<Option<SampleBlock>> {
        (**self).read_block()
    }

    fn channels(&self) -> u16 {
        (**self).channels()
    }

    fn is_finite(&self) -> bool {
        (**self).is_finite()
    }
}

/// Mock audio source for testing.
#[derive(Debug, Clone)]
pub struct MockAudioSource {
    is_started: bool,
    blocks: VecDeque<SampleBlock>,
    channels: u16,
    should_fail_start: bool,
    should_fail_stop: bool,
    should_fail_read: bool,
    error_message: String,
}

impl MockAudioSource {
    /// Create a new mono mock source with no queued blocks.
    pub fn new() -> Self {
        Self {
            is_started: false,
            blocks: VecDeque::new(),
            channels: 1,
            should_fail_start: false,
            should_fail_stop: false,
            should_fail_read: false,
            error_message: "mock audio error".to_string(),
        }
    }

    /// Configure the channel count reported by the mock.
    pub fn with_channels(mut self, channels: u16) -> Self {
        self.channels = channels;
        self
    }

    /// Queue blocks to be returned by `read_block`, in order.
    pub fn with_blocks(mut self, blocks: Vec<SampleBlock>) -> Self {
        self.blocks = blocks.into();
        self
    }

    /// Configure the mock to fail on start.
    pub fn with_start_failure(mut self) -> Self {
        self.should_fail_start = true;
        self
    }

    /// Configure the mock to fail on stop.
    pub fn with_stop_failure(mut self) -> Self {
        self.should_fail_stop = true;
        self
    }

    /// Configure the mock to fail on read.
    pub fn with_read_failure(mut self) -> Self {
        self.should_fail_read = true;
        self
    }

    /// Configure the error message for failures.
    pub fn with_error_message(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }

    /// Check if the audio source is started.
    pub fn is_started(&self) -> bool {
        self.is_started
    }
}

impl Default for MockAudioSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSource for MockAudioSource {
    fn start(&mut self) -> Result<()> {
        if self.should_fail_start {
            Err(MicstreamError::AudioCapture {
                message: self.error_message.clone(),
            })
        } else {
            self.is_started = true;
            Ok(())
        }
    }

    fn stop(&mut self) -> Result<()> {
        if self.should_fail_stop {
            Err(MicstreamError::AudioCapture {
                message: self.error_message.clone(),
            })
        } else {
            self.is_started = false;
            Ok(())
        }
    }

    fn read_block(&mut self) -> Result<Option<SampleBlock>> {
        if self.should_fail_read {
            Err(MicstreamError::AudioCapture {
                message: self.error_message.clone(),
            })
        } else {
            Ok(self.blocks.pop_front())
        }
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn is_finite(&self) -> bool {
        true
    }
}
