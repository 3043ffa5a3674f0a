//! Main analysis pipeline orchestration

use super::aggregate::ResultAggregator;
use super::config::{AnalysisConfig, AnalysisRequest};
use crate::analysis::{Estimates, Estimator, StratumEstimator};
use crate::audio::{decode_file, DecodedAudio};
use crate::error::{AnalysisError, EstimationFailure};
use crate::model::AnalysisResult;
use crate::tagging::{ModelRegistry, Tagger};
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// One request's worth of analysis over shared, process-lifetime state
///
/// The pipeline itself is immutable; many threads may call
/// [`analyze`](Self::analyze) at once on the same instance.
pub struct AnalysisPipeline<E: Estimator> {
    config: AnalysisConfig,
    estimator: E,
    registry: Arc<ModelRegistry>,
}

impl AnalysisPipeline<StratumEstimator> {
    /// Pipeline with the stratum-dsp estimator tuned to the config's tempo range
    pub fn with_stratum(config: AnalysisConfig, registry: Arc<ModelRegistry>) -> Self {
        let estimator = StratumEstimator::new().with_bpm_range(config.min_bpm, config.max_bpm);
        Self::new(config, estimator, registry)
    }
}

impl<E: Estimator> AnalysisPipeline<E> {
    pub fn new(config: AnalysisConfig, estimator: E, registry: Arc<ModelRegistry>) -> Self {
        Self {
            config,
            estimator,
            registry,
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Analyze decoded audio
    ///
    /// Only a missing or too-short input is an error. Everything else that
    /// goes wrong shows up as an absent field in the result.
    pub fn analyze(
        &self,
        audio: &DecodedAudio,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResult, AnalysisError> {
        let started = Instant::now();
        self.check_preconditions(audio)?;

        let duration = audio.duration();
        log::debug!("Analyzing {:.2}s of audio", duration);
        let mut aggregator = ResultAggregator::new(duration);

        if request.detect_key || request.detect_bpm {
            let estimates = match audio.at_rate(self.config.estimation_sample_rate) {
                Ok(estimation_audio) => self.estimator.estimate(
                    &estimation_audio,
                    request.detect_key,
                    request.detect_bpm,
                ),
                Err(e) => {
                    let failure = EstimationFailure::Backend(e.to_string());
                    Estimates {
                        key: request.detect_key.then(|| Err(failure.clone())),
                        tempo: request.detect_bpm.then(|| Err(failure)),
                    }
                }
            };
            aggregator.record_key(estimates.key);
            aggregator.record_tempo(estimates.tempo);
        }

        if request.detect_tags {
            let top_n = request.tag_top_n.unwrap_or(self.config.default_top_n);
            let runs = match audio.at_rate(self.config.tagging_sample_rate) {
                Ok(tagging_audio) => Tagger::new(&self.registry).classify(
                    &tagging_audio,
                    top_n,
                    &request.tag_options,
                ),
                Err(e) => {
                    log::warn!("Tagging skipped: {}", e);
                    Vec::new()
                }
            };
            aggregator.record_tags(runs);
        }

        let result = aggregator.finish(started.elapsed());
        log::debug!("Analysis finished in {}ms", result.analysis_time_ms);
        Ok(result)
    }

    /// Decode a file and analyze it
    pub fn analyze_file(&self, path: &Path, request: &AnalysisRequest) -> Result<AnalysisResult> {
        let audio = decode_file(path, self.config.max_decode_secs)?;
        Ok(self.analyze(&audio, request)?)
    }

    /// Refuse audio that is missing or shorter than the configured minimum
    pub fn check_preconditions(&self, audio: &DecodedAudio) -> Result<(), AnalysisError> {
        if audio.is_empty() {
            return Err(AnalysisError::MissingAudio);
        }

        let duration = audio.duration();
        if duration < self.config.min_duration_secs {
            return Err(AnalysisError::TooShort {
                duration,
                minimum: self.config.min_duration_secs,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::StubEstimator;
    use tempfile::TempDir;

    fn pipeline(dir: &TempDir) -> AnalysisPipeline<StubEstimator> {
        let registry = Arc::new(ModelRegistry::onnx(dir.path().to_path_buf()));
        AnalysisPipeline::new(AnalysisConfig::default(), StubEstimator::new(), registry)
    }

    #[test]
    fn test_empty_audio_is_missing() {
        let dir = TempDir::new().unwrap();
        let audio = DecodedAudio::new(Vec::<f32>::new(), 44_100);
        assert_eq!(
            pipeline(&dir).analyze(&audio, &AnalysisRequest::default()),
            Err(AnalysisError::MissingAudio)
        );
    }

    #[test]
    fn test_short_audio_is_refused() {
        let dir = TempDir::new().unwrap();
        let audio = DecodedAudio::new(vec![0.0f32; 44_100 * 2], 44_100);
        let err = pipeline(&dir)
            .analyze(&audio, &AnalysisRequest::full())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::TooShort { minimum, .. } if minimum == 3.0));
    }

    #[test]
    fn test_exactly_minimum_duration_is_accepted() {
        let dir = TempDir::new().unwrap();
        let audio = DecodedAudio::new(vec![0.0f32; 44_100 * 3], 44_100);
        assert!(pipeline(&dir).check_preconditions(&audio).is_ok());
    }

    #[test]
    fn test_unavailable_estimates_are_absent() {
        let dir = TempDir::new().unwrap();
        let audio = DecodedAudio::new(vec![0.0f32; 44_100 * 4], 44_100);
        let result = pipeline(&dir)
            .analyze(&audio, &AnalysisRequest::default())
            .unwrap();
        assert!(result.key.is_none());
        assert!(result.bpm.is_none());
        assert!(result.tags.is_none());
        assert!((result.duration - 4.0).abs() < 1e-9);
    }
}
