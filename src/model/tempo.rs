//! Tempo results

use serde::{Deserialize, Serialize};

/// Maximum number of beat timestamps reported
pub const MAX_REPORTED_BEATS: usize = 100;

/// Detected tempo as reported to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TempoResult {
    /// Beats per minute (> 0)
    pub value: f32,

    /// Confidence in [0, 1]
    pub confidence: f32,

    /// First beat timestamps in seconds; `None` when no beats were found
    pub beats: Option<Vec<f32>>,
}

impl TempoResult {
    /// Build a result, bounding the beat list and clamping the confidence
    pub fn new(bpm: f32, confidence: f32, beats: &[f32]) -> Self {
        let beats = if beats.is_empty() {
            None
        } else {
            Some(beats.iter().take(MAX_REPORTED_BEATS).copied().collect())
        };

        Self {
            value: bpm,
            confidence: confidence.clamp(0.0, 1.0),
            beats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beats_truncated() {
        let beats: Vec<f32> = (0..250).map(|i| i as f32 * 0.5).collect();
        let tempo = TempoResult::new(120.0, 0.9, &beats);
        let reported = tempo.beats.unwrap();
        assert_eq!(reported.len(), MAX_REPORTED_BEATS);
        assert_eq!(reported[99], 49.5);
    }

    #[test]
    fn test_no_beats_is_null() {
        let tempo = TempoResult::new(120.0, 0.9, &[]);
        assert!(tempo.beats.is_none());
        let json = serde_json::to_value(&tempo).unwrap();
        assert!(json["beats"].is_null());
    }

    #[test]
    fn test_short_beat_list_kept() {
        let tempo = TempoResult::new(90.0, 1.7, &[0.1, 0.8]);
        assert_eq!(tempo.beats, Some(vec![0.1, 0.8]));
        assert_eq!(tempo.confidence, 1.0);
    }
}
