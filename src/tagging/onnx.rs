//! ONNX Runtime backed models
//!
//! `Session::run` needs `&mut self`, so each session sits behind a mutex. The
//! lock is held for one forward pass.

use super::catalog::ModelId;
use super::traits::{InferenceModel, ModelLoader};
use crate::error::InferenceError;
use anyhow::{anyhow, Result};
use ndarray::{Array2, ArrayViewD};
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Loads `.onnx` artifacts into ort sessions
#[derive(Debug, Clone)]
pub struct OnnxLoader {
    intra_threads: usize,
}

impl OnnxLoader {
    pub fn new() -> Self {
        Self { intra_threads: 1 }
    }

    /// Threads ONNX Runtime may use inside one forward pass
    pub fn with_intra_threads(mut self, threads: usize) -> Self {
        self.intra_threads = threads.max(1);
        self
    }
}

impl Default for OnnxLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelLoader for OnnxLoader {
    fn load(&self, id: ModelId, artifact: &Path) -> Result<Arc<dyn InferenceModel>> {
        let session = Session::builder()
            .and_then(|b| b.with_intra_threads(self.intra_threads))
            .and_then(|b| b.commit_from_file(artifact))
            .map_err(|e| anyhow!("Failed to load {}: {}", id, e))?;

        let (output_name, output_index) = id.output();
        Ok(Arc::new(OnnxModel {
            id,
            session: Mutex::new(session),
            input_name: id.input_name(),
            output_name,
            output_index,
        }))
    }
}

/// One ort session plus the tensor names it is driven with
pub struct OnnxModel {
    id: ModelId,
    session: Mutex<Session>,
    input_name: &'static str,
    output_name: &'static str,
    output_index: usize,
}

impl InferenceModel for OnnxModel {
    fn run(&self, input: ArrayViewD<'_, f32>) -> Result<Array2<f32>, InferenceError> {
        let input_tensor = Tensor::from_array(input.to_owned())
            .map_err(|e| InferenceError::Runtime(format!("{} tensor creation: {}", self.id, e)))?;

        let mut session = self.session.lock().map_err(|_| InferenceError::Poisoned)?;
        let outputs = session
            .run(ort::inputs![self.input_name => input_tensor])
            .map_err(|e| InferenceError::Runtime(format!("{} inference: {}", self.id, e)))?;

        let value = outputs
            .iter()
            .find(|(name, _)| *name == self.output_name)
            .or_else(|| outputs.iter().nth(self.output_index))
            .or_else(|| {
                log::warn!("{} has fewer outputs than expected, using the first", self.id);
                outputs.iter().next()
            })
            .map(|(_, value)| value)
            .ok_or_else(|| InferenceError::Shape(format!("{} produced no output", self.id)))?;

        let (shape, data) = value
            .try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::Runtime(format!("{} output extraction: {}", self.id, e)))?;

        let dims: Vec<usize> = shape.iter().map(|&d| d.max(0) as usize).collect();
        to_matrix(&dims, data)
    }
}

/// Flatten an output tensor to `[frames, outputs]`, keeping the last axis
fn to_matrix(dims: &[usize], data: &[f32]) -> Result<Array2<f32>, InferenceError> {
    let cols = dims.last().copied().unwrap_or(data.len());
    if cols == 0 {
        return Ok(Array2::zeros((0, 0)));
    }
    let rows = data.len() / cols;

    Array2::from_shape_vec((rows, cols), data[..rows * cols].to_vec())
        .map_err(|e| InferenceError::Shape(e.to_string()))
}
