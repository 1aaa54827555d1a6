//! PCM and base64 helpers for spoken audio.
//!
//! Microphone input is 16 kHz mono; model speech arrives as 24 kHz mono.
//! Both travel as little-endian signed 16-bit PCM, base64 encoded.

use std::time::Duration;

use atelier_error::{GeminiError, GeminiErrorKind};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::GeminiResult;

/// Microphone sample rate.
pub const INPUT_SAMPLE_RATE: u32 = 16_000;

/// Model speech sample rate.
pub const OUTPUT_SAMPLE_RATE: u32 = 24_000;

/// MIME type of microphone chunks.
pub const INPUT_MIME_TYPE: &str = "audio/pcm;rate=16000";

/// Encode float samples in `[-1.0, 1.0]` as little-endian i16 PCM.
///
/// Out-of-range samples are clamped.
///
/// # Examples
///
/// ```
/// use atelier_models::encode_pcm16;
///
/// assert_eq!(encode_pcm16(&[0.0, -1.0]), vec![0x00, 0x00, 0x00, 0x80]);
/// ```
pub fn encode_pcm16(samples: &[f32]) -> Vec<u8> {
    samples
        .iter()
        .flat_map(|s| {
            let value = (s * 32_768.0).clamp(i16::MIN as f32, i16::MAX as f32) as i16;
            value.to_le_bytes()
        })
        .collect()
}

/// Decode little-endian i16 PCM into float samples.
///
/// A trailing odd byte is ignored.
pub fn decode_pcm16(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|pair| f32::from(i16::from_le_bytes([pair[0], pair[1]])) / 32_768.0)
        .collect()
}

/// Standard base64 encoding.
pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Standard base64 decoding.
///
/// # Errors
///
/// Returns `Base64Decode` if `data` is not valid base64.
pub fn decode_base64(data: &str) -> GeminiResult<Vec<u8>> {
    STANDARD
        .decode(data.trim())
        .map_err(|e| GeminiError::new(GeminiErrorKind::Base64Decode(e.to_string())))
}

/// Playback length of `sample_count` mono samples.
pub fn duration_of(sample_count: usize, sample_rate: u32) -> Duration {
    if sample_rate == 0 {
        return Duration::ZERO;
    }
    let nanos = (sample_count as u64).saturating_mul(1_000_000_000) / u64::from(sample_rate);
    Duration::from_nanos(nanos)
}
