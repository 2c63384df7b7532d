//! Accumulation buffer for per-channel sample blocks.

use crate::audio::source::SampleBlock;
use std::mem;

/// Accumulates sample blocks per channel until the next flush.
///
/// Blocks are kept unmerged in arrival order; merging is deferred to flush
/// time so the capture path stays append-only. Every channel always holds the
/// same total number of frames, tracked in `frames`.
#[derive(Debug)]
pub struct SampleBuffer {
    /// Per-channel ordered sequence of received blocks.
    channels: Vec<Vec<Vec<f32>>>,
    /// Total frames accumulated per channel.
    frames: usize,
}

impl SampleBuffer {
    /// Creates an empty buffer for the given channel count.
    pub fn new(num_channels: usize) -> Self {
        Self {
            channels: vec![Vec::new(); num_channels],
            frames: 0,
        }
    }

    /// Number of channels this buffer accumulates.
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Total frames accumulated per channel since the last flush.
    pub fn accumulated_frames(&self) -> usize {
        self.frames
    }

    /// Returns true if no frames have been accumulated.
    pub fn is_empty(&self) -> bool {
        self.frames == 0
    }

    /// Appends one block to every channel.
    ///
    /// The caller is responsible for matching the block's channel count to
    /// this buffer; blocks themselves guarantee equal per-channel length.
    pub fn push(&mut self, block: SampleBlock) {
        let frame_len = block.frame_len();
        for (channel, data) in self.channels.iter_mut().zip(block.into_inner()) {
            channel.push(data);
        }
        self.frames += frame_len;
    }

    /// Atomically takes the buffered contents, leaving this buffer empty.
    ///
    /// A single swap, so no block can be double-counted or dropped between
    /// the snapshot and the reset.
    pub fn take(&mut self) -> SampleBuffer {
        let num_channels = self.channels.len();
        mem::replace(self, SampleBuffer::new(num_channels))
    }

    /// Consumes the buffer, returning the per-channel block sequences.
    pub fn into_channels(self) -> Vec<Vec<Vec<f32>>> {
        self.channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mono_block(samples: Vec<f32>) -> SampleBlock {
        SampleBlock::mono(samples)
    }

    #[test]
    fn new_buffer_is_empty() {
        let buffer = SampleBuffer::new(2);
        assert_eq!(buffer.num_channels(), 2);
        assert_eq!(buffer.accumulated_frames(), 0);
        assert!(buffer.is_empty());
    }

    #[test]
    fn push_accumulates_frames() {
        let mut buffer = SampleBuffer::new(1);
        buffer.push(mono_block(vec![0.0; 128]));
        buffer.push(mono_block(vec![0.0; 128]));
        assert_eq!(buffer.accumulated_frames(), 256);
        assert!(!buffer.is_empty());
    }

    #[test]
    fn push_stereo_counts_frames_not_samples() {
        let mut buffer = SampleBuffer::new(2);
        let block = SampleBlock::stereo(vec![0.1; 64], vec![0.2; 64]).unwrap();
        buffer.push(block);
        // 64 frames per channel, not 128
        assert_eq!(buffer.accumulated_frames(), 64);
    }

    #[test]
    fn all_channels_hold_equal_totals() {
        let mut buffer = SampleBuffer::new(2);
        buffer.push(SampleBlock::stereo(vec![0.0; 100], vec![0.0; 100]).unwrap());
        buffer.push(SampleBlock::stereo(vec![0.0; 28], vec![0.0; 28]).unwrap());

        let channels = buffer.into_channels();
        for channel in &channels {
            let total: usize = channel.iter().map(Vec::len).sum();
            assert_eq!(total, 128);
        }
    }

    #[test]
    fn take_returns_contents_and_resets() {
        let mut buffer = SampleBuffer::new(1);
        buffer.push(mono_block(vec![0.5; 200]));

        let taken = buffer.take();
        assert_eq!(taken.accumulated_frames(), 200);
        assert_eq!(taken.num_channels(), 1);

        // Original is empty but keeps its channel count
        assert!(buffer.is_empty());
        assert_eq!(buffer.num_channels(), 1);
        assert_eq!(buffer.accumulated_frames(), 0);
    }

    #[test]
    fn take_on_empty_buffer_is_empty() {
        let mut buffer = SampleBuffer::new(2);
        let taken = buffer.take();
        assert!(taken.is_empty());
        assert_eq!(taken.num_channels(), 2);
    }

    #[test]
    fn buffer_usable_after_take() {
        let mut buffer = SampleBuffer::new(1);
        buffer.push(mono_block(vec![0.1; 100]));
        let _ = buffer.take();

        buffer.push(mono_block(vec![0.2; 50]));
        assert_eq!(buffer.accumulated_frames(), 50);
    }

    #[test]
    fn blocks_preserved_in_arrival_order() {
        let mut buffer = SampleBuffer::new(1);
        buffer.push(mono_block(vec![1.0, 2.0]));
        buffer.push(mono_block(vec![3.0]));
        buffer.push(mono_block(vec![4.0, 5.0]));

        let channels = buffer.into_channels();
        let flat: Vec<f32> = channels[0].iter().flatten().copied().collect();
        assert_eq!(flat, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }
}
