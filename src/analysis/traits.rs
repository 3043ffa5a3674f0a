//! Estimator trait definitions and raw estimate types

use crate::audio::DecodedAudio;
use crate::error::EstimationFailure;

/// Key label as produced by an estimator, before normalization
#[derive(Debug, Clone, PartialEq)]
pub struct RawKey {
    /// Root note, possibly flat-spelled (e.g. "Eb")
    pub root: String,
    /// Scale name ("major" / "minor")
    pub scale: String,
    /// Algorithm strength in [0, 1]
    pub strength: f32,
}

/// Tempo as produced by an estimator
#[derive(Debug, Clone, PartialEq)]
pub struct RawTempo {
    /// Beats per minute
    pub bpm: f32,
    /// Confidence score
    pub confidence: f32,
    /// Every beat timestamp in seconds, in order
    pub beats: Vec<f32>,
}

/// Outcome of a combined estimation pass
///
/// `None` means the quantity was not requested.
#[derive(Debug, Clone, Default)]
pub struct Estimates {
    pub key: Option<Result<RawKey, EstimationFailure>>,
    pub tempo: Option<Result<RawTempo, EstimationFailure>>,
}

/// Key and tempo estimation - allows swapping between real and stub backends
///
/// Key and tempo are independent: a failure of one must not affect the other.
pub trait Estimator: Send + Sync {
    /// Estimate the musical key of mono audio
    fn estimate_key(&self, audio: &DecodedAudio) -> Result<RawKey, EstimationFailure>;

    /// Estimate tempo and beat positions of mono audio
    fn estimate_tempo(&self, audio: &DecodedAudio) -> Result<RawTempo, EstimationFailure>;

    /// Run the requested estimations
    ///
    /// Backends that compute key and tempo in one pass override this to avoid
    /// doing the work twice.
    fn estimate(&self, audio: &DecodedAudio, want_key: bool, want_tempo: bool) -> Estimates {
        Estimates {
            key: want_key.then(|| self.estimate_key(audio)),
            tempo: want_tempo.then(|| self.estimate_tempo(audio)),
        }
    }
}
