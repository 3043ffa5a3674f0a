//! Inference seams
//!
//! The registry only sees models through these traits, so it can be driven by
//! ONNX Runtime in production and by in-memory fakes in tests.

use super::catalog::ModelId;
use crate::error::InferenceError;
use anyhow::Result;
use ndarray::{Array2, ArrayViewD};
use std::path::Path;
use std::sync::Arc;

/// A loaded model that maps an input tensor to a frame-by-output matrix
pub trait InferenceModel: Send + Sync {
    /// Run the model
    ///
    /// The first input axis is the frame/patch axis; the result has one row per
    /// frame and one column per output dimension.
    fn run(&self, input: ArrayViewD<'_, f32>) -> Result<Array2<f32>, InferenceError>;
}

/// Turns an artifact on disk into an [`InferenceModel`]
pub trait ModelLoader: Send + Sync {
    fn load(&self, id: ModelId, artifact: &Path) -> Result<Arc<dyn InferenceModel>>;
}
