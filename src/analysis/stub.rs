//! Fixed-answer estimator
//!
//! Returns preconfigured estimates without looking at the audio. Used when
//! estimation is disabled and in tests.

use super::traits::{Estimator, RawKey, RawTempo};
use crate::audio::DecodedAudio;
use crate::error::EstimationFailure;

/// Estimator with canned key and tempo answers
#[derive(Debug, Clone)]
pub struct StubEstimator {
    key: Result<RawKey, EstimationFailure>,
    tempo: Result<RawTempo, EstimationFailure>,
}

impl StubEstimator {
    /// Stub that reports both estimates as unavailable
    pub fn new() -> Self {
        Self {
            key: Err(EstimationFailure::Unavailable("stub estimator".into())),
            tempo: Err(EstimationFailure::Unavailable("stub estimator".into())),
        }
    }

    /// Answer key requests with this label
    pub fn with_key(mut self, root: &str, scale: &str, strength: f32) -> Self {
        self.key = Ok(RawKey {
            root: root.to_string(),
            scale: scale.to_string(),
            strength,
        });
        self
    }

    /// Answer tempo requests with this tempo and beat list
    pub fn with_tempo(mut self, bpm: f32, confidence: f32, beats: Vec<f32>) -> Self {
        self.tempo = Ok(RawTempo {
            bpm,
            confidence,
            beats,
        });
        self
    }

    /// Fail key requests with this error
    pub fn with_key_failure(mut self, failure: EstimationFailure) -> Self {
        self.key = Err(failure);
        self
    }

    /// Fail tempo requests with this error
    pub fn with_tempo_failure(mut self, failure: EstimationFailure) -> Self {
        self.tempo = Err(failure);
        self
    }
}

impl Default for StubEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl Estimator for StubEstimator {
    fn estimate_key(&self, _audio: &DecodedAudio) -> Result<RawKey, EstimationFailure> {
        log::debug!("Stub key estimate");
        self.key.clone()
    }

    fn estimate_tempo(&self, _audio: &DecodedAudio) -> Result<RawTempo, EstimationFailure> {
        log::debug!("Stub tempo estimate");
        self.tempo.clone()
    }
}
