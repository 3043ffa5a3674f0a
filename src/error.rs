//! Error taxonomy for the analysis core
//!
//! Only [`AnalysisError`] ever reaches the caller of an analysis. Every other
//! failure is caught at its component boundary and turned into an absent
//! output field plus a log record.

use std::path::PathBuf;
use thiserror::Error;

/// Precondition failures: fatal to the whole analysis
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// No samples were supplied (or the sample rate is zero)
    #[error("no audio provided")]
    MissingAudio,

    /// Audio is shorter than the configured minimum duration
    #[error("audio too short for analysis: {duration:.2}s (minimum {minimum:.1}s)")]
    TooShort {
        /// Actual duration in seconds
        duration: f64,
        /// Configured minimum in seconds
        minimum: f64,
    },
}

/// A model (or the embedding provider it depends on) is not usable
#[derive(Debug, Clone, Error)]
pub enum ModelUnavailable {
    /// None of the candidate artifacts exist in the model directory
    #[error("model artifact not found: {0:?}")]
    Missing(PathBuf),

    /// The artifact exists but could not be loaded
    #[error("failed to load {path:?}: {reason}")]
    LoadFailed {
        /// Artifact that was attempted
        path: PathBuf,
        /// Loader error message
        reason: String,
    },

    /// The embedding provider feeding this model is unavailable
    #[error("embedding provider {0} unavailable")]
    ProviderUnavailable(&'static str),
}

/// Errors raised by an inference handle
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Input or output tensor had an unexpected shape
    #[error("shape error: {0}")]
    Shape(String),

    /// The inference runtime reported an error
    #[error("runtime error: {0}")]
    Runtime(String),

    /// The session lock was poisoned by a panicking thread
    #[error("inference session poisoned")]
    Poisoned,
}

/// A loaded classifier failed while producing its outcome
#[derive(Debug, Error)]
pub enum ClassificationFailure {
    /// Model invocation failed
    #[error(transparent)]
    Inference(#[from] InferenceError),

    /// The model produced zero frames of activations
    #[error("model produced no activation frames")]
    NoFrames,

    /// A pooled activation the outcome depends on is NaN or infinite
    #[error("non-finite activation at class {index}")]
    NonFinite {
        /// Class index of the offending activation
        index: usize,
    },

    /// The positive class index is outside the activation vector
    #[error("class index {index} out of range for {width} activations")]
    MissingClass {
        /// Requested class index
        index: usize,
        /// Width of the pooled activation vector
        width: usize,
    },
}

/// Why a classifier produced no outcome
#[derive(Debug, Error)]
pub enum TagFailure {
    #[error(transparent)]
    Unavailable(#[from] ModelUnavailable),

    #[error(transparent)]
    Failed(#[from] ClassificationFailure),
}

/// Key or tempo estimation failed for this audio
#[derive(Debug, Clone, Error)]
pub enum EstimationFailure {
    /// The underlying estimation backend rejected the audio
    #[error("estimation backend failed: {0}")]
    Backend(String),

    /// The backend returned a tempo that is not a positive number
    #[error("invalid tempo estimate: {0}")]
    InvalidTempo(f32),

    /// The estimator is not able to produce this quantity
    #[error("estimate unavailable: {0}")]
    Unavailable(String),
}

/// Sample-rate conversion failed
#[derive(Debug, Error)]
pub enum ResampleError {
    #[error("failed to build resampler: {0}")]
    Construction(#[from] rubato::ResamplerConstructionError),

    #[error("resampling failed: {0}")]
    Process(#[from] rubato::ResampleError),
}

/// Sidecar metadata could not be read
#[derive(Debug, Error)]
pub enum MetadataError {
    /// File could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid metadata JSON
    #[error("invalid metadata JSON: {0}")]
    Parse(#[from] serde_json::Error),
}
