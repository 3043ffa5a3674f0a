//! Decoded audio input
//!
//! The analysis core consumes mono `f32` samples. Container decoding lives in
//! [`decode`], sample-rate conversion in [`resample`].

pub mod decode;
pub mod resample;

pub use decode::decode_file;

use crate::error::ResampleError;
use std::borrow::Cow;
use std::sync::Arc;

/// Immutable mono audio buffer
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    samples: Arc<[f32]>,
    sample_rate: u32,
}

impl DecodedAudio {
    /// Wrap mono samples at the given sample rate
    pub fn new(samples: impl Into<Arc<[f32]>>, sample_rate: u32) -> Self {
        Self {
            samples: samples.into(),
            sample_rate,
        }
    }

    /// Mono samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration in seconds (0.0 when the sample rate is zero)
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// True when there is nothing to analyze
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty() || self.sample_rate == 0
    }

    /// View of this audio at `rate`, resampling only when the rate differs
    pub fn at_rate(&self, rate: u32) -> Result<Cow<'_, DecodedAudio>, ResampleError> {
        if rate == self.sample_rate || self.is_empty() {
            return Ok(Cow::Borrowed(self));
        }
        let samples = resample::resample(&self.samples, self.sample_rate, rate)?;
        Ok(Cow::Owned(DecodedAudio::new(samples, rate)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration() {
        let audio = DecodedAudio::new(vec![0.0f32; 44100 * 5], 44100);
        assert!((audio.duration() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_rate_is_empty() {
        let audio = DecodedAudio::new(vec![0.0f32; 100], 0);
        assert!(audio.is_empty());
        assert_eq!(audio.duration(), 0.0);
    }

    #[test]
    fn test_at_rate_borrows_when_equal() {
        let audio = DecodedAudio::new(vec![0.5f32; 1600], 16000);
        assert!(matches!(audio.at_rate(16000).unwrap(), Cow::Borrowed(_)));
    }

    #[test]
    fn test_at_rate_keeps_duration() {
        let audio = DecodedAudio::new(vec![0.0f32; 44100 * 4], 44100);
        let down = audio.at_rate(16000).unwrap();
        assert_eq!(down.sample_rate(), 16000);
        assert!((down.duration() - 4.0).abs() < 0.01);
    }

    #[test]
    fn test_at_rate_does_not_alias_high_tones() {
        let samples: Vec<f32> = (0..44_100)
            .map(|i| (2.0 * std::f32::consts::PI * 12_000.0 * i as f32 / 44_100.0).sin())
            .collect();
        let audio = DecodedAudio::new(samples, 44_100);
        let down = audio.at_rate(16_000).unwrap();
        let energy = down.samples().iter().map(|s| s * s).sum::<f32>() / down.samples().len() as f32;
        assert!(energy.sqrt() < 0.05);
    }
}
