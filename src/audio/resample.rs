//! Sample-rate conversion
//!
//! Band-limited sinc resampling with rubato. Content above the target
//! Nyquist frequency is filtered out instead of folding back into the band
//! the classifiers see.

use crate::error::ResampleError;
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

/// Input frames fed to the resampler per call
const CHUNK_SIZE: usize = 4096;

fn sinc_parameters() -> SincInterpolationParameters {
    SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    }
}

/// Resample mono audio from `from_sr` to `to_sr`
///
/// The output is aligned with the input (the filter delay is removed) and
/// holds `len * to_sr / from_sr` samples, rounded.
pub fn resample(samples: &[f32], from_sr: u32, to_sr: u32) -> Result<Vec<f32>, ResampleError> {
    if samples.is_empty() || from_sr == 0 || to_sr == 0 {
        return Ok(Vec::new());
    }
    if from_sr == to_sr {
        return Ok(samples.to_vec());
    }

    let ratio = to_sr as f64 / from_sr as f64;
    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, sinc_parameters(), CHUNK_SIZE, 1)?;

    let expected = (samples.len() as f64 * ratio).round() as usize;
    let delay = resampler.output_delay();
    let mut output = Vec::with_capacity(expected + delay + resampler.output_frames_max());

    let mut chunks = samples.chunks_exact(CHUNK_SIZE);
    for chunk in &mut chunks {
        let out = resampler.process(&[chunk][..], None)?;
        output.extend_from_slice(&out[0]);
    }
    let tail = chunks.remainder();
    if !tail.is_empty() {
        let out = resampler.process_partial(Some(&[tail][..]), None)?;
        output.extend_from_slice(&out[0]);
    }

    // Flush the samples still held back by the filter delay
    while output.len() < expected + delay {
        let out = resampler.process_partial::<&[f32]>(None, None)?;
        if out[0].is_empty() {
            break;
        }
        output.extend_from_slice(&out[0]);
    }

    output.drain(..delay.min(output.len()));
    output.resize(expected, 0.0);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine(freq: f32, rate: u32, secs: f32) -> Vec<f32> {
        let n = (rate as f32 * secs) as usize;
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f32 / rate as f32).sin())
            .collect()
    }

    fn rms(samples: &[f32]) -> f32 {
        (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
    }

    #[test]
    fn test_downsample_length() {
        let input = vec![0.0f32; 44100];
        let out = resample(&input, 44100, 16000).unwrap();
        assert_eq!(out.len(), 16000);
    }

    #[test]
    fn test_upsample_length() {
        let input = vec![0.0f32; 22050 * 2];
        let out = resample(&input, 22050, 44100).unwrap();
        assert_eq!(out.len(), 88200);
    }

    #[test]
    fn test_tone_above_target_nyquist_is_removed() {
        // 12 kHz would alias to 4 kHz at 16 kHz without a low-pass filter
        let input = sine(12_000.0, 44_100, 1.0);
        let out = resample(&input, 44_100, 16_000).unwrap();
        assert!(rms(&out) < 0.05, "aliased energy: {}", rms(&out));
    }

    #[test]
    fn test_tone_in_band_is_kept() {
        let input = sine(1_000.0, 44_100, 1.0);
        let out = resample(&input, 44_100, 16_000).unwrap();
        // Skip the edges where the filter sees the abrupt start and end
        let body = &out[1000..out.len() - 1000];
        assert!((rms(body) - std::f32::consts::FRAC_1_SQRT_2).abs() < 0.02);
    }

    #[test]
    fn test_output_is_aligned_with_input() {
        let input = sine(100.0, 44_100, 1.0);
        let out = resample(&input, 44_100, 16_000).unwrap();
        let expected = sine(100.0, 16_000, 1.0);
        for i in (2000..14000).step_by(997) {
            assert!((out[i] - expected[i]).abs() < 0.05, "sample {}", i);
        }
    }

    #[test]
    fn test_equal_rates_copy() {
        let input = vec![0.25f32, -0.5, 0.75];
        assert_eq!(resample(&input, 16000, 16000).unwrap(), input);
    }

    #[test]
    fn test_empty_input() {
        assert!(resample(&[], 44100, 16000).unwrap().is_empty());
    }
}
