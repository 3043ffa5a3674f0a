//! Audio Analysis - key, tempo and semantic tags for music
//!
//! This library turns decoded mono audio into a structured analysis record:
//! musical key with wheel notation, tempo with beat positions, and an
//! optional set of tags from pretrained classifiers.

pub mod analysis;
pub mod audio;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod tagging;

pub use audio::DecodedAudio;
pub use error::AnalysisError;
pub use model::AnalysisResult;
pub use pipeline::{AnalysisConfig, AnalysisPipeline, AnalysisRequest};
pub use tagging::{ModelRegistry, TagOptions};
