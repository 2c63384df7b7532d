//! WAV framing: canonical 44-byte RIFF/WAVE header plus data chunk.

use crate::error::{MicstreamError, Result};

/// Size of the canonical header in bytes.
pub const HEADER_LEN: usize = 44;

/// Wraps raw 16-bit PCM bytes in a complete WAV byte stream.
///
/// The header is the fixed 44-byte PCM layout: RIFF chunk, 16-byte fmt
/// subchunk (audio format 1, 16 bits per sample), and the data subchunk. All
/// multi-byte fields are little-endian. Pure and deterministic; the only
/// error condition is a zero channel count.
pub fn frame(pcm: &[u8], sample_rate: u32, num_channels: u16) -> Result<Vec<u8>> {
    if num_channels == 0 {
        return Err(MicstreamError::UnsupportedChannelCount { channels: 0 });
    }

    let data_size = pcm.len() as u32;
    let byte_rate = sample_rate * num_channels as u32 * 2;
    let block_align = num_channels * 2;

    let mut out = Vec::with_capacity(HEADER_LEN + pcm.len());
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_size).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes()); // fmt subchunk size
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&num_channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_size.to_le_bytes());
    out.extend_from_slice(pcm);
    Ok(out)
}
