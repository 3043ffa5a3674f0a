//! Analysis configuration and per-request options

use crate::tagging::{TagOptions, MEL_SAMPLE_RATE};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default model directory
pub const DEFAULT_MODEL_DIR: &str = "/app/models";

/// Process-wide analysis settings
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Directory holding `<model>.onnx` artifacts and `<model>.json` sidecars
    pub model_dir: PathBuf,

    /// Shorter audio is refused
    pub min_duration_secs: f64,

    /// Ranked-label count when a request does not set one
    pub default_top_n: usize,

    /// Rate key and tempo estimation run at
    pub estimation_sample_rate: u32,

    /// Rate the embedding models consume
    pub tagging_sample_rate: u32,

    /// Tempo search range
    pub min_bpm: f32,
    pub max_bpm: f32,

    /// Decode at most this many seconds of a file (None = whole file)
    pub max_decode_secs: Option<f64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            min_duration_secs: 3.0,
            default_top_n: 10,
            estimation_sample_rate: 44_100,
            tagging_sample_rate: MEL_SAMPLE_RATE,
            min_bpm: 60.0,
            max_bpm: 180.0,
            max_decode_secs: None,
        }
    }
}

impl AnalysisConfig {
    /// Default settings reading models from `model_dir`
    pub fn new(model_dir: PathBuf) -> Self {
        Self {
            model_dir,
            ..Self::default()
        }
    }

    pub fn with_min_duration(mut self, secs: f64) -> Self {
        self.min_duration_secs = secs;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.default_top_n = top_n;
        self
    }

    pub fn with_bpm_range(mut self, min: f32, max: f32) -> Self {
        self.min_bpm = min;
        self.max_bpm = max;
        self
    }

    /// Cap how much of each file is decoded
    pub fn with_max_decode_secs(mut self, secs: Option<f64>) -> Self {
        self.max_decode_secs = secs;
        self
    }
}

/// What one analysis should produce
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisRequest {
    pub detect_key: bool,
    pub detect_bpm: bool,
    pub detect_tags: bool,

    /// Ranked-label count; falls back to [`AnalysisConfig::default_top_n`]
    pub tag_top_n: Option<usize>,

    pub tag_options: TagOptions,
}

impl Default for AnalysisRequest {
    fn default() -> Self {
        Self {
            detect_key: true,
            detect_bpm: true,
            detect_tags: false,
            tag_top_n: None,
            tag_options: TagOptions::default(),
        }
    }
}

impl AnalysisRequest {
    /// Key, tempo and every tag category
    pub fn full() -> Self {
        Self {
            detect_tags: true,
            ..Self::default()
        }
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.tag_top_n = Some(top_n);
        self
    }

    pub fn with_tag_options(mut self, options: TagOptions) -> Self {
        self.tag_options = options;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.model_dir, PathBuf::from("/app/models"));
        assert_eq!(config.min_duration_secs, 3.0);
        assert_eq!(config.default_top_n, 10);
        assert_eq!(config.estimation_sample_rate, 44_100);
        assert_eq!(config.tagging_sample_rate, 16_000);
    }

    #[test]
    fn test_request_defaults_skip_tags() {
        let request: AnalysisRequest = serde_json::from_str("{}").unwrap();
        assert!(request.detect_key);
        assert!(request.detect_bpm);
        assert!(!request.detect_tags);
        assert_eq!(request.tag_top_n, None);
        assert_eq!(request.tag_options, TagOptions::default());
    }

    #[test]
    fn test_request_partial_tag_options() {
        let request: AnalysisRequest = serde_json::from_str(
            r#"{"detect_tags": true, "tag_top_n": 5, "tag_options": {"emotion": false}}"#,
        )
        .unwrap();
        assert!(request.detect_tags);
        assert_eq!(request.tag_top_n, Some(5));
        assert!(!request.tag_options.emotion);
        assert!(request.tag_options.genres);
    }
}
