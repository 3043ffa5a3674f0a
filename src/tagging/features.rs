//! Log-mel spectrogram and patch framing for the embedding extractors
//!
//! Both backbones consume 96-band log-compressed mel frames computed from
//! 16 kHz mono audio (frame 512, hop 256, `log10(1 + 10000 x)`). They differ
//! only in how many frames make up one input patch.

use crate::error::InferenceError;
use ndarray::{s, Array2, Array3, ArrayView2};
use realfft::RealFftPlanner;

/// Sample rate the embedding models were trained at
pub const MEL_SAMPLE_RATE: u32 = 16_000;
pub const N_BANDS: usize = 96;
pub const FRAME_SIZE: usize = 512;
pub const HOP_SIZE: usize = 256;

/// Compute the `[frames, N_BANDS]` log-mel spectrogram of mono samples
///
/// Input shorter than one frame is zero-padded to a single frame.
pub fn compute_mel_spectrogram(
    samples: &[f32],
    sample_rate: u32,
) -> Result<Array2<f32>, InferenceError> {
    if samples.is_empty() || sample_rate == 0 {
        return Err(InferenceError::Shape("empty input samples".to_string()));
    }

    let n_frames = samples.len().saturating_sub(FRAME_SIZE) / HOP_SIZE + 1;
    let filterbank = mel_filterbank(N_BANDS, FRAME_SIZE, sample_rate as f32);
    let window = hann_window(FRAME_SIZE);

    let mut planner = RealFftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(FRAME_SIZE);
    let mut scratch = fft.make_scratch_vec();
    let mut frame_buf = vec![0.0f32; FRAME_SIZE];
    let mut spectrum = fft.make_output_vec();
    let mut power = vec![0.0f32; spectrum.len()];

    let mut mel = Array2::<f32>::zeros((n_frames, N_BANDS));

    for frame_idx in 0..n_frames {
        let start = frame_idx * HOP_SIZE;
        let end = (start + FRAME_SIZE).min(samples.len());

        frame_buf.fill(0.0);
        for (i, &sample) in samples[start..end].iter().enumerate() {
            frame_buf[i] = sample * window[i];
        }

        fft.process_with_scratch(&mut frame_buf, &mut spectrum, &mut scratch)
            .map_err(|e| InferenceError::Runtime(format!("FFT failed: {:?}", e)))?;

        for (p, c) in power.iter_mut().zip(spectrum.iter()) {
            *p = c.norm_sqr() / FRAME_SIZE as f32;
        }

        for (band, filter) in filterbank.outer_iter().enumerate() {
            let energy: f32 = filter.iter().zip(power.iter()).map(|(&w, &p)| w * p).sum();
            mel[[frame_idx, band]] = (1.0 + 10000.0 * energy.max(0.0)).log10();
        }
    }

    Ok(mel)
}

/// Cut a mel spectrogram into `[patches, frames, bands]`
///
/// Patches start every `hop` frames. A trailing partial patch, or a
/// spectrogram shorter than one patch, is zero-padded.
pub fn extract_patches(mel: ArrayView2<'_, f32>, frames: usize, hop: usize) -> Array3<f32> {
    let (total, bands) = mel.dim();
    let hop = hop.max(1);
    if total == 0 || frames == 0 {
        return Array3::zeros((0, frames, bands));
    }

    let n_patches = if total <= frames {
        1
    } else {
        (total - frames).div_ceil(hop) + 1
    };

    let mut patches = Array3::<f32>::zeros((n_patches, frames, bands));
    for p in 0..n_patches {
        let start = p * hop;
        let end = (start + frames).min(total);
        patches
            .slice_mut(s![p, ..end - start, ..])
            .assign(&mel.slice(s![start..end, ..]));
    }
    patches
}

/// Periodic Hann window
fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let phase = 2.0 * std::f32::consts::PI * i as f32 / size as f32;
            0.5 * (1.0 - phase.cos())
        })
        .collect()
}

/// Triangular mel filters, one row per band over the `frame_size / 2 + 1` bins
fn mel_filterbank(n_bands: usize, frame_size: usize, sample_rate: f32) -> Array2<f32> {
    let n_bins = frame_size / 2 + 1;
    let mel_min = hz_to_mel(0.0);
    let mel_max = hz_to_mel(sample_rate / 2.0);

    let n_points = n_bands + 2;
    let bin_points: Vec<f32> = (0..n_points)
        .map(|i| mel_min + (mel_max - mel_min) * i as f32 / (n_points - 1) as f32)
        .map(|m| mel_to_hz(m) * frame_size as f32 / sample_rate)
        .collect();

    let mut filterbank = Array2::<f32>::zeros((n_bands, n_bins));
    for band in 0..n_bands {
        let (left, center, right) = (bin_points[band], bin_points[band + 1], bin_points[band + 2]);
        for bin in 0..n_bins {
            let f = bin as f32;
            let weight = if f >= left && f <= center && center > left {
                (f - left) / (center - left)
            } else if f > center && f <= right && right > center {
                (right - f) / (right - center)
            } else {
                0.0
            };
            filterbank[[band, bin]] = weight;
        }
    }
    filterbank
}

fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10.0_f32.powf(mel / 2595.0) - 1.0)
}
