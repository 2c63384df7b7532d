//! The capture controller: accumulation, threshold flushes, and stop.
//!
//! Pure synchronous state machine. Blocks go in, encoded flushes come out;
//! all I/O (sinks, channels, timing) lives in the pipeline around it, which
//! keeps every flush decision unit-testable.

use crate::audio::source::SampleBlock;
use crate::defaults;
use crate::error::{MicstreamError, Result};
use crate::pcm::{self, SampleBuffer};
use crate::transport::EncodedBlock;

/// When accumulated frames turn into an encoded flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushPolicy {
    /// Flush raw PCM whenever at least this many frames have accumulated.
    Threshold(usize),
    /// Accumulate everything; emit one WAV-framed flush at stop.
    OnStop,
}

impl Default for FlushPolicy {
    fn default() -> Self {
        FlushPolicy::Threshold(defaults::FLUSH_THRESHOLD_FRAMES)
    }
}

/// Lifecycle of a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Recording,
    Stopped,
}

/// Accumulates sample blocks and decides when to encode.
///
/// `record` returns `Some(EncodedBlock)` whenever the policy triggers a
/// flush; `stop` drains whatever remains. Blocks arriving outside the
/// `Recording` state are discarded, reported via the `Ok(None)` path plus a
/// discard flag so the caller can emit an event.
pub struct CaptureController {
    channels: u16,
    sample_rate: u32,
    policy: FlushPolicy,
    state: SessionState,
    buffer: SampleBuffer,
}

impl CaptureController {
    /// Create a controller for the given capture format.
    ///
    /// # Errors
    /// Rejects channel counts outside mono/stereo and a zero sample rate
    /// before any capture starts.
    pub fn new(channels: u16, sample_rate: u32, policy: FlushPolicy) -> Result<Self> {
        if channels == 0 || channels > defaults::MAX_CHANNELS {
            return Err(MicstreamError::UnsupportedChannelCount { channels });
        }
        if sample_rate == 0 {
            return Err(MicstreamError::InvalidSampleRate { rate: sample_rate });
        }

        Ok(Self {
            channels,
            sample_rate,
            policy,
            state: SessionState::Idle,
            buffer: SampleBuffer::new(channels as usize),
        })
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Frames accumulated since the last flush.
    pub fn pending_frames(&self) -> usize {
        self.buffer.accumulated_frames()
    }

    /// Channel count this controller expects per block.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Sample rate used for WAV framing.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Begin accepting blocks.
    ///
    /// Idempotent while recording; a stopped session cannot be restarted,
    /// build a fresh controller instead.
    pub fn begin(&mut self) -> Result<()> {
        match self.state {
            SessionState::Idle | SessionState::Recording => {
                self.state = SessionState::Recording;
                Ok(())
            }
            SessionState::Stopped => Err(MicstreamError::Other(
                "capture session already stopped".to_string(),
            )),
        }
    }

    /// Accept one sample block; returns an encoded flush if the policy fired.
    ///
    /// Blocks arriving while not recording are discarded and reported as
    /// `Ok(None)`; the pipeline emits a discard event for them. A block with
    /// the wrong channel count is an error, the source has changed shape
    /// under us.
    pub fn record(&mut self, block: SampleBlock) -> Result<Option<EncodedBlock>> {
        if self.state != SessionState::Recording {
            return Ok(None);
        }
        if block.channels() != self.channels as usize {
            return Err(MicstreamError::ChannelCountMismatch {
                expected: self.channels as usize,
                actual: block.channels(),
            });
        }

        self.buffer.push(block);

        match self.policy {
            FlushPolicy::Threshold(frames) if self.buffer.accumulated_frames() >= frames => {
                self.flush()
            }
            _ => Ok(None),
        }
    }

    /// Whether a block arriving now would be discarded.
    pub fn discards_input(&self) -> bool {
        self.state != SessionState::Recording
    }

    /// Encode and drain the accumulated buffer as raw PCM.
    ///
    /// An empty buffer is a no-op returning `None`; no zero-length payloads
    /// ever reach a sink.
    pub fn flush(&mut self) -> Result<Option<EncodedBlock>> {
        if self.buffer.is_empty() {
            return Ok(None);
        }

        let taken = self.buffer.take();
        let pcm = self.encode(taken)?;
        Ok(Some(EncodedBlock::Pcm(pcm)))
    }

    /// Stop the session, draining any remainder.
    ///
    /// Under `Threshold` the remainder goes out as one final PCM flush;
    /// under `OnStop` the whole take is framed as a WAV byte stream.
    /// Idempotent: a second stop finds an empty buffer and returns `None`.
    pub fn stop(&mut self) -> Result<Option<EncodedBlock>> {
        self.state = SessionState::Stopped;

        if self.buffer.is_empty() {
            return Ok(None);
        }

        let taken = self.buffer.take();
        let pcm = self.encode(taken)?;
        match self.policy {
            FlushPolicy::Threshold(_) => Ok(Some(EncodedBlock::Pcm(pcm))),
            FlushPolicy::OnStop => {
                let wav = pcm::wav::frame(&pcm, self.sample_rate, self.channels)?;
                Ok(Some(EncodedBlock::Wav(wav)))
            }
        }
    }

    /// Merge, interleave, and encode one buffer take to 16-bit PCM bytes.
    fn encode(&self, taken: SampleBuffer) -> Result<Vec<u8>> {
        let total_frames = taken.accumulated_frames();
        let merged: Vec<Vec<f32>> = taken
            .into_channels()
            .iter()
            .map(|blocks| pcm::merge(blocks, total_frames))
            .collect::<Result<_>>()?;
        let interleaved = pcm::interleave(merged)?;
        Ok(pcm::encode_block(&interleaved))
    }
}
