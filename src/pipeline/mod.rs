//! Request-level orchestration
//!
//! [`AnalysisPipeline`] checks preconditions, runs key/tempo estimation and
//! tagging for one input, and folds the outcomes into an
//! [`AnalysisResult`](crate::model::AnalysisResult) via [`ResultAggregator`].

pub mod aggregate;
pub mod config;
pub mod runner;

pub use aggregate::ResultAggregator;
pub use config::{AnalysisConfig, AnalysisRequest, DEFAULT_MODEL_DIR};
pub use runner::AnalysisPipeline;
