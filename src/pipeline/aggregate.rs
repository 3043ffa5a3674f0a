//! Merging component outcomes into one [`AnalysisResult`]
//!
//! Every non-precondition failure arrives here as an `Err` and leaves as an
//! absent field plus a log line. Nothing recorded here can fail the analysis.

use crate::analysis::{RawKey, RawTempo};
use crate::error::{EstimationFailure, TagFailure};
use crate::model::{AnalysisResult, KeyResult, TagResult, TempoResult};
use crate::tagging::ClassifierRun;
use std::time::Duration;

/// Collects sub-results for one request
#[derive(Debug, Default)]
pub struct ResultAggregator {
    duration: f64,
    key: Option<KeyResult>,
    bpm: Option<TempoResult>,
    tags: Option<TagResult>,
}

impl ResultAggregator {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            ..Self::default()
        }
    }

    /// Record the key estimate; `None` means key was not requested
    pub fn record_key(&mut self, key: Option<Result<RawKey, EstimationFailure>>) {
        match key {
            Some(Ok(raw)) => {
                let result = KeyResult::from_raw(&raw.root, &raw.scale, raw.strength);
                log::debug!("Key: {} ({})", result.value, result.camelot);
                self.key = Some(result);
            }
            Some(Err(e)) => log::warn!("Key detection failed: {}", e),
            None => {}
        }
    }

    /// Record the tempo estimate; `None` means tempo was not requested
    pub fn record_tempo(&mut self, tempo: Option<Result<RawTempo, EstimationFailure>>) {
        match tempo {
            Some(Ok(raw)) if raw.bpm.is_finite() && raw.bpm > 0.0 => {
                log::debug!("Tempo: {:.1} BPM, {} beats", raw.bpm, raw.beats.len());
                self.bpm = Some(TempoResult::new(raw.bpm, raw.confidence, &raw.beats));
            }
            Some(Ok(raw)) => {
                log::warn!("BPM detection failed: {}", EstimationFailure::InvalidTempo(raw.bpm))
            }
            Some(Err(e)) => log::warn!("BPM detection failed: {}", e),
            None => {}
        }
    }

    /// Record classifier outcomes
    ///
    /// Tagging was requested, so the tag record is present even when every
    /// classifier was unavailable.
    pub fn record_tags(&mut self, runs: Vec<ClassifierRun>) {
        let tags = self.tags.get_or_insert_with(TagResult::default);

        for run in runs {
            match run.outcome {
                Ok(outcome) => {
                    if !tags.record(run.field, outcome) {
                        log::warn!("Classifier {} produced an outcome of the wrong shape", run.model);
                    }
                }
                // Already logged when the model failed to load
                Err(TagFailure::Unavailable(reason)) => {
                    log::debug!("Skipping {}: {}", run.model, reason);
                }
                Err(TagFailure::Failed(e)) => {
                    log::warn!("Classifier {} failed: {}", run.model, e);
                }
            }
        }
    }

    pub fn finish(self, elapsed: Duration) -> AnalysisResult {
        AnalysisResult {
            key: self.key,
            bpm: self.bpm,
            tags: self.tags,
            duration: self.duration,
            analysis_time_ms: elapsed.as_millis() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ClassificationFailure, ModelUnavailable};
    use crate::model::{ClassificationOutcome, TagField};
    use crate::tagging::ModelId;

    fn run(
        model: ModelId,
        field: TagField,
        outcome: Result<ClassificationOutcome, TagFailure>,
    ) -> ClassifierRun {
        ClassifierRun {
            model,
            field,
            outcome,
        }
    }

    #[test]
    fn test_nothing_recorded_only_duration() {
        let result = ResultAggregator::new(5.0).finish(Duration::from_millis(12));
        assert!(result.key.is_none());
        assert!(result.bpm.is_none());
        assert!(result.tags.is_none());
        assert_eq!(result.duration, 5.0);
        assert_eq!(result.analysis_time_ms, 12);
    }

    #[test]
    fn test_key_normalized_and_mapped() {
        let mut agg = ResultAggregator::new(30.0);
        agg.record_key(Some(Ok(RawKey {
            root: "Eb".into(),
            scale: "minor".into(),
            strength: 0.42,
        })));
        let key = agg.finish(Duration::ZERO).key.unwrap();
        assert_eq!(key.value, "D# minor");
        assert_eq!(key.camelot, "2A");
        assert_eq!(key.confidence, 0.42);
    }

    #[test]
    fn test_failures_become_absent_fields() {
        let mut agg = ResultAggregator::new(30.0);
        agg.record_key(Some(Err(EstimationFailure::Backend("bad audio".into()))));
        agg.record_tempo(Some(Ok(RawTempo {
            bpm: 0.0,
            confidence: 0.9,
            beats: vec![],
        })));
        let result = agg.finish(Duration::ZERO);
        assert!(result.key.is_none());
        assert!(result.bpm.is_none());
    }

    #[test]
    fn test_tag_failures_are_isolated() {
        let mut agg = ResultAggregator::new(30.0);
        agg.record_tags(vec![
            run(
                ModelId::Genre,
                TagField::Genres,
                Err(ClassificationFailure::NoFrames.into()),
            ),
            run(
                ModelId::MoodTheme,
                TagField::Moods,
                Err(ModelUnavailable::ProviderUnavailable("effnet").into()),
            ),
            run(
                ModelId::Danceability,
                TagField::Danceability,
                Ok(ClassificationOutcome::BinaryDecision {
                    decision: true,
                    confidence: 0.8,
                }),
            ),
        ]);

        let tags = agg.finish(Duration::ZERO).tags.unwrap();
        assert!(tags.genres.is_none());
        assert!(tags.moods.is_none());
        assert_eq!(tags.is_danceable, Some(true));
        assert_eq!(tags.danceability_confidence, Some(0.8));
    }

    #[test]
    fn test_tags_present_when_requested_but_all_unavailable() {
        let mut agg = ResultAggregator::new(30.0);
        agg.record_tags(vec![run(
            ModelId::GeneralTags,
            TagField::TopTags,
            Err(ModelUnavailable::Missing("/models/msd-musicnn-1.onnx".into()).into()),
        )]);
        let tags = agg.finish(Duration::ZERO).tags.unwrap();
        assert!(tags.is_empty());
    }
}
