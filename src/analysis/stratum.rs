//! Key and tempo estimation using stratum-dsp
//!
//! stratum-dsp computes BPM, key and beat grid in a single pass, so both
//! estimates come out of one `analyze_audio` call.

use super::traits::{Estimates, Estimator, RawKey, RawTempo};
use crate::audio::DecodedAudio;
use crate::error::EstimationFailure;
use stratum_dsp::{analyze_audio, AnalysisConfig, Key};

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// stratum-dsp backed estimator
#[derive(Debug, Clone)]
pub struct StratumEstimator {
    /// Minimum BPM for detection range
    min_bpm: f32,
    /// Maximum BPM for detection range
    max_bpm: f32,
}

impl StratumEstimator {
    pub fn new() -> Self {
        Self {
            min_bpm: 60.0,
            max_bpm: 180.0,
        }
    }

    /// Create estimator with custom BPM range
    pub fn with_bpm_range(mut self, min: f32, max: f32) -> Self {
        self.min_bpm = min;
        self.max_bpm = max;
        self
    }

    fn analyze(&self, audio: &DecodedAudio) -> Result<stratum_dsp::AnalysisResult, EstimationFailure> {
        log::debug!(
            "Running stratum-dsp on {} samples at {}Hz",
            audio.samples().len(),
            audio.sample_rate()
        );

        let config = AnalysisConfig {
            min_bpm: self.min_bpm,
            max_bpm: self.max_bpm,
            ..AnalysisConfig::default()
        };

        analyze_audio(audio.samples(), audio.sample_rate(), config)
            .map_err(|e| EstimationFailure::Backend(e.to_string()))
    }

    fn key_from(result: &stratum_dsp::AnalysisResult) -> RawKey {
        let (index, scale) = match result.key {
            Key::Major(i) => (i, "major"),
            Key::Minor(i) => (i, "minor"),
        };

        RawKey {
            root: NOTE_NAMES[index as usize % 12].to_string(),
            scale: scale.to_string(),
            strength: result.key_confidence,
        }
    }

    fn tempo_from(&self, result: &stratum_dsp::AnalysisResult) -> Result<RawTempo, EstimationFailure> {
        let bpm = fold_bpm(result.bpm, self.min_bpm, self.max_bpm);
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(EstimationFailure::InvalidTempo(result.bpm));
        }

        Ok(RawTempo {
            bpm,
            confidence: result.bpm_confidence,
            beats: result.beat_grid.beats.clone(),
        })
    }
}

impl Default for StratumEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl Estimator for StratumEstimator {
    fn estimate_key(&self, audio: &DecodedAudio) -> Result<RawKey, EstimationFailure> {
        self.analyze(audio).map(|result| Self::key_from(&result))
    }

    fn estimate_tempo(&self, audio: &DecodedAudio) -> Result<RawTempo, EstimationFailure> {
        self.analyze(audio).and_then(|result| self.tempo_from(&result))
    }

    fn estimate(&self, audio: &DecodedAudio, want_key: bool, want_tempo: bool) -> Estimates {
        if !want_key && !want_tempo {
            return Estimates::default();
        }

        match self.analyze(audio) {
            Ok(result) => {
                log::info!(
                    "stratum-dsp: BPM={:.1} ({:.2}), key={} ({:.2}), {} beats",
                    result.bpm,
                    result.bpm_confidence,
                    result.key.name(),
                    result.key_confidence,
                    result.beat_grid.beats.len()
                );
                Estimates {
                    key: want_key.then(|| Ok(Self::key_from(&result))),
                    tempo: want_tempo.then(|| self.tempo_from(&result)),
                }
            }
            Err(e) => Estimates {
                key: want_key.then(|| Err(e.clone())),
                tempo: want_tempo.then(|| Err(e)),
            },
        }
    }
}

/// Fold a tempo into `[min_bpm, max_bpm]` by doubling or halving
pub fn fold_bpm(bpm: f32, min_bpm: f32, max_bpm: f32) -> f32 {
    let mut bpm = bpm;
    if min_bpm > 0.0 && max_bpm > 0.0 && bpm.is_finite() && bpm > 0.0 {
        while bpm < min_bpm && bpm * 2.0 <= max_bpm {
            bpm *= 2.0;
            log::debug!("BPM doubled to {:.1} (was below minimum {})", bpm, min_bpm);
        }
        while bpm > max_bpm && bpm / 2.0 >= min_bpm {
            bpm /= 2.0;
            log::debug!("BPM halved to {:.1} (was above maximum {})", bpm, max_bpm);
        }
    }
    bpm
}
