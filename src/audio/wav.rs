//! WAV file audio source for replay and testing.

use crate::audio::source::AudioSource;
use crate::error::{Result, WingmanError};
use std::io::Read;
use std::path::Path;

/// Finite audio source backed by WAV data.
///
/// Accepts arbitrary sample rates and channel counts, downmixing to mono
/// and resampling to the target rate up front. Serves 100ms blocks.
pub struct WavAudioSource {
    samples: Vec<i16>,
    position: usize,
    block_size: usize,
}

impl WavAudioSource {
    /// Create from any reader.
    pub fn from_reader(reader: Box<dyn Read + Send>, target_rate: u32) -> Result<Self> {
        let mut wav_reader =
            hound::WavReader::new(reader).map_err(|e| WingmanError::AudioCapture {
                message: format!("Failed to parse WAV data: {e}"),
            })?;

        let spec = wav_reader.spec();
        let raw: Vec<i16> = wav_reader
            .samples::<i16>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| WingmanError::AudioCapture {
                message: format!("Failed to read WAV samples: {e}"),
            })?;

        let mono = downmix(&raw, spec.channels as usize);
        let samples = if spec.sample_rate == target_rate {
            mono
        } else {
            resample(&mono, spec.sample_rate, target_rate)
        };

        Ok(Self {
            samples,
            position: 0,
            block_size: (target_rate / 10) as usize,
        })
    }

    /// Create from a file path.
    pub fn from_path(path: &Path, target_rate: u32) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_reader(Box::new(std::io::Cursor::new(data)), target_rate)
    }

    /// Consume the source and return all samples as a single buffer.
    pub fn into_samples(self) -> Vec<i16> {
        self.samples
    }
}

impl AudioSource for WavAudioSource {
    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<i16>> {
        if self.position >= self.samples.len() {
            return Ok(Vec::new());
        }

        let end = usize::min(self.position + self.block_size, self.samples.len());
        let block = self.samples[self.position..end].to_vec();
        self.position = end;
        Ok(block)
    }

    fn is_finite(&self) -> bool {
        true
    }
}

/// Average interleaved channels down to mono.
fn downmix(samples: &[i16], channels: usize) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks_exact(channels)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}

/// Simple linear interpolation resampling.
pub fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = source_pos.floor() as usize;
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[samples.len() - 1]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as i16
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn make_wav_data(sample_rate: u32, channels: u16, samples: &[i16]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_16khz_mono_passes_through() {
        let input = vec![100i16, 200, 300, 400, 500];
        let data = make_wav_data(16000, 1, &input);

        let source = WavAudioSource::from_reader(Box::new(Cursor::new(data)), 16000).unwrap();
        assert_eq!(source.into_samples(), input);
    }

    #[test]
    fn test_stereo_downmixes_to_mono() {
        let stereo = vec![100i16, 200, 300, 400, 500, 600];
        let data = make_wav_data(16000, 2, &stereo);

        let source = WavAudioSource::from_reader(Box::new(Cursor::new(data)), 16000).unwrap();
        assert_eq!(source.into_samples(), vec![150i16, 350, 550]);
    }

    #[test]
    fn test_48khz_resamples_to_16khz() {
        let input = vec![0i16; 48000]; // 1 second
        let data = make_wav_data(48000, 1, &input);

        let source = WavAudioSource::from_reader(Box::new(Cursor::new(data)), 16000).unwrap();
        let len = source.into_samples().len();
        assert!((15900..=16100).contains(&len), "got {len} samples");
    }

    #[test]
    fn test_reads_come_in_100ms_blocks() {
        let input = vec![7i16; 4000]; // 250ms at 16kHz
        let data = make_wav_data(16000, 1, &input);

        let mut source = WavAudioSource::from_reader(Box::new(Cursor::new(data)), 16000).unwrap();
        source.start().unwrap();
        assert_eq!(source.read_samples().unwrap().len(), 1600);
        assert_eq!(source.read_samples().unwrap().len(), 1600);
        assert_eq!(source.read_samples().unwrap().len(), 800);
        assert!(source.read_samples().unwrap().is_empty());
        assert!(source.is_finite());
    }

    #[test]
    fn test_invalid_data_is_rejected() {
        let garbage = vec![1u8, 2, 3, 4];
        let result = WavAudioSource::from_reader(Box::new(Cursor::new(garbage)), 16000);
        assert!(result.is_err());
    }

    #[test]
    fn test_resample_identity() {
        let samples = vec![1i16, 2, 3];
        assert_eq!(resample(&samples, 16000, 16000), samples);
    }

    #[test]
    fn test_resample_empty() {
        assert!(resample(&[], 48000, 16000).is_empty());
    }
}
