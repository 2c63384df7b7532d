//! Float-to-PCM sample conversion.

/// Converts one f32 sample in [-1, 1] to a signed 16-bit PCM sample.
///
/// Samples outside [-1, 1] are clamped. Negative samples scale by 32768 and
/// positive ones by 32767 so the full asymmetric i16 range is used exactly:
/// -1.0 maps to -32768 and 1.0 maps to 32767. The scaled value is truncated,
/// not rounded.
pub fn float_to_i16(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

/// Encodes a flat sample array as little-endian 16-bit PCM bytes.
///
/// Output length is exactly `2 * samples.len()`.
pub fn encode_block(samples: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        out.extend_from_slice(&float_to_i16(sample).to_le_bytes());
    }
    out
}
