//! Aggregate analysis record

use super::{KeyResult, TagResult, TempoResult};
use serde::{Deserialize, Serialize};

/// Everything produced for one audio input
///
/// Optional fields are present only if requested and successfully produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<KeyResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpm: Option<TempoResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagResult>,

    /// Input duration in seconds
    pub duration: f64,

    /// Wall-clock processing time in milliseconds
    pub analysis_time_ms: u64,
}
