//! The PCM pipeline: buffer accumulation, merging, encoding, and WAV framing.
//!
//! Per-channel f32 blocks accumulate in a [`SampleBuffer`] until a flush,
//! which merges each channel into one contiguous array, interleaves stereo,
//! converts to 16-bit little-endian PCM, and (in batch mode) wraps the result
//! in a canonical WAV header.

pub mod buffer;
pub mod encode;
pub mod merge;
pub mod wav;

pub use buffer::SampleBuffer;
pub use encode::{encode_block, float_to_i16};
pub use merge::{interleave, merge};
