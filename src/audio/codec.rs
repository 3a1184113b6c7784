//! PCM codec: conversions between capture buffers and typed samples.
//!
//! Everything in the pipeline agrees on little-endian signed 16-bit PCM as
//! the wire format for segment payloads; floats are the format the
//! transcription contract consumes.

/// Convert 16-bit samples to a little-endian byte buffer.
pub fn i16_to_bytes(samples: &[i16]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    bytes
}

/// Convert a little-endian byte buffer to 16-bit samples.
///
/// A trailing odd byte is ignored.
pub fn bytes_to_i16(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Convert 16-bit samples to normalized floats in [-1.0, 1.0).
pub fn i16_to_f32(samples: &[i16]) -> Vec<f32> {
    samples.iter().map(|&s| s as f32 / 32768.0).collect()
}

/// Convert normalized floats to 16-bit samples, clamping to [-1.0, 1.0].
pub fn f32_to_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
        .collect()
}

/// Convert a little-endian 16-bit PCM byte buffer to normalized floats.
pub fn bytes_to_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
        .collect()
}

/// Calculates the Root Mean Square (RMS) of audio samples.
///
/// Returns a normalized value (0.0 to 1.0), where 0.0 is silence,
/// ~0.707 is a full-scale sine wave and 1.0 is maximum amplitude.
pub fn rms(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = samples
        .iter()
        .map(|&sample| {
            let normalized = sample as f64 / i16::MAX as f64;
            normalized * normalized
        })
        .sum();

    let mean_square = sum_squares / samples.len() as f64;
    mean_square.sqrt() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_i16_bytes_roundtrip() {
        let samples = vec![0i16, 1, -1, i16::MAX, i16::MIN, 12345, -12345];
        let bytes = i16_to_bytes(&samples);
        assert_eq!(bytes.len(), samples.len() * 2);
        assert_eq!(bytes_to_i16(&bytes), samples);
    }

    #[test]
    fn test_bytes_to_i16_ignores_trailing_odd_byte() {
        let mut bytes = i16_to_bytes(&[100, 200]);
        bytes.push(0xFF);
        assert_eq!(bytes_to_i16(&bytes), vec![100, 200]);
    }

    #[test]
    fn test_f32_to_i16_clamps_out_of_range() {
        let samples = vec![2.0f32, -2.0, 1.0, -1.0, 0.0];
        let converted = f32_to_i16(&samples);
        assert_eq!(converted[0], i16::MAX);
        assert_eq!(converted[1], -i16::MAX);
        assert_eq!(converted[2], i16::MAX);
        assert_eq!(converted[3], -i16::MAX);
        assert_eq!(converted[4], 0);
    }

    #[test]
    fn test_i16_to_f32_normalizes() {
        let floats = i16_to_f32(&[0, 16384, -16384]);
        assert_eq!(floats[0], 0.0);
        assert!((floats[1] - 0.5).abs() < 1e-6);
        assert!((floats[2] + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_bytes_to_f32_matches_two_step_conversion() {
        let samples = vec![0i16, 1000, -1000, i16::MAX];
        let bytes = i16_to_bytes(&samples);
        assert_eq!(bytes_to_f32(&bytes), i16_to_f32(&samples));
    }

    #[test]
    fn test_empty_buffers() {
        assert!(i16_to_bytes(&[]).is_empty());
        assert!(bytes_to_i16(&[]).is_empty());
        assert!(i16_to_f32(&[]).is_empty());
        assert!(f32_to_i16(&[]).is_empty());
        assert!(bytes_to_f32(&[]).is_empty());
    }

    #[test]
    fn test_rms_silence_is_zero() {
        assert_eq!(rms(&vec![0i16; 1000]), 0.0);
    }

    #[test]
    fn test_rms_max_amplitude() {
        let value = rms(&vec![i16::MAX; 1000]);
        assert!((value - 1.0).abs() < 0.001, "RMS should be ~1.0, got {value}");
    }

    #[test]
    fn test_rms_negative_samples() {
        let value = rms(&vec![i16::MIN; 1000]);
        assert!(value > 0.99, "RMS should be ~1.0 for i16::MIN, got {value}");
    }

    #[test]
    fn test_rms_empty_samples() {
        assert_eq!(rms(&[]), 0.0);
    }
}
