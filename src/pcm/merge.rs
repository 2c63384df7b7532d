//! Block merging and channel interleaving.

use crate::error::{MicstreamError, Result};

/// Concatenates one channel's blocks into a single contiguous array.
///
/// Blocks are appended in arrival order. `total_frames` is the caller's
/// running count; a mismatch against the actual block lengths means a
/// producer bug, reported as [`MicstreamError::ChannelLengthMismatch`].
pub fn merge(blocks: &[Vec<f32>], total_frames: usize) -> Result<Vec<f32>> {
    let actual: usize = blocks.iter().map(Vec::len).sum();
    if actual != total_frames {
        return Err(MicstreamError::ChannelLengthMismatch {
            expected: total_frames,
            actual,
        });
    }

    let mut result = Vec::with_capacity(total_frames);
    for block in blocks {
        result.extend_from_slice(block);
    }
    Ok(result)
}

/// Interleaves per-channel arrays into a single frame-major sample stream.
///
/// Mono passes through untouched. Stereo produces `[L0, R0, L1, R1, ...]`.
/// Anything wider than stereo is a configuration error, as is an empty
/// channel list.
pub fn interleave(mut channels: Vec<Vec<f32>>) -> Result<Vec<f32>> {
    match channels.len() {
        1 => Ok(channels.swap_remove(0)),
        2 => {
            let right = channels.pop().unwrap_or_default();
            let left = channels.pop().unwrap_or_default();
            if left.len() != right.len() {
                return Err(MicstreamError::ChannelLengthMismatch {
                    expected: left.len(),
                    actual: right.len(),
                });
            }

            let mut result = Vec::with_capacity(left.len() * 2);
            for (l, r) in left.iter().zip(right.iter()) {
                result.push(*l);
                result.push(*r);
            }
            Ok(result)
        }
        n => Err(MicstreamError::UnsupportedChannelCount { channels: n as u16 }),
    }
}
