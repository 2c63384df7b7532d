//! White-noise audio source.
//!
//! A toy generator for exercising the capture pipeline without a microphone:
//! every block is uniform random samples in [-1, 1). Block production is
//! paced to real time so the pipeline sees realistic arrival timing.

use crate::audio::source::{AudioSource, SampleBlock};
use crate::defaults;
use crate::error::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};

/// Generates random noise blocks at the configured sample rate.
pub struct NoiseAudioSource {
    rng: StdRng,
    channels: u16,
    running: bool,
    block_frames: usize,
    block_interval: Duration,
    next_due: Instant,
}

impl NoiseAudioSource {
    /// Create a noise source for the given format.
    pub fn new(channels: u16, sample_rate: u32) -> Self {
        let block_frames = defaults::BLOCK_FRAMES;
        let nanos = (block_frames as u64 * 1_000_000_000) / sample_rate.max(1) as u64;
        Self {
            rng: StdRng::from_entropy(),
            channels,
            running: false,
            block_frames,
            block_interval: Duration::from_nanos(nanos),
            next_due: Instant::now(),
        }
    }

    fn noise_channel(&mut self) -> Vec<f32> {
        (0..self.block_frames)
            .map(|_| self.rng.r#gen::<f32>() * 2.0 - 1.0)
            .collect()
    }
}

impl AudioSource for NoiseAudioSource {
    fn start(&mut self) -> Result<()> {
        self.running = true;
        self.next_due = Instant::now();
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.running = false;
        Ok(())
    }

    fn read_block(&mut self) -> Result<Option<SampleBlock>> {
        if !self.running || Instant::now() < self.next_due {
            return Ok(None);
        }
        self.next_due += self.block_interval;

        let channels: Vec<Vec<f32>> = (0..self.channels).map(|_| self.noise_channel()).collect();
        Ok(Some(SampleBlock::new(channels)?))
    }

    fn channels(&self) -> u16 {
        self.channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_nothing_before_start() {
        let mut source = NoiseAudioSource::new(1, 44100);
        assert!(source.read_block().unwrap().is_none());
    }

    #[test]
    fn produces_blocks_of_configured_shape() {
        let mut source = NoiseAudioSource::new(2, 44100);
        source.start().unwrap();

        let block = source.read_block().unwrap().expect("block due immediately");
        assert_eq!(block.channels(), 2);
        assert_eq!(block.frame_len(), defaults::BLOCK_FRAMES);
    }

    #[test]
    fn samples_within_unit_range() {
        let mut source = NoiseAudioSource::new(1, 44100);
        source.start().unwrap();

        let block = source.read_block().unwrap().expect("block due immediately");
        assert!(
            block
                .channel(0)
                .iter()
                .all(|&s| (-1.0..=1.0).contains(&s))
        );
    }

    #[test]
    fn production_is_paced() {
        let mut source = NoiseAudioSource::new(1, 44100);
        source.start().unwrap();

        // First block is due immediately; the next only after ~2.9ms.
        assert!(source.read_block().unwrap().is_some());
        assert!(source.read_block().unwrap().is_none());
    }

    #[test]
    fn stop_halts_production() {
        let mut source = NoiseAudioSource::new(1, 44100);
        source.start().unwrap();
        source.stop().unwrap();
        assert!(source.read_block().unwrap().is_none());
    }
}
