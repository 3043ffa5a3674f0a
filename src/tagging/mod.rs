//! Semantic tagging
//!
//! A fixed catalog of embedding extractors and classifier heads is loaded
//! lazily into a shared [`ModelRegistry`]. Per request, the two embedding
//! providers run at most once and feed the [`CLASSIFIERS`] table.

pub mod catalog;
pub mod classifier;
pub mod embedding;
pub mod features;
pub mod metadata;
pub mod onnx;
pub mod pooling;
pub mod registry;
pub mod tagger;
pub mod traits;

pub use catalog::{EmbeddingSource, ModelId};
pub use classifier::{Classifier, ClassifierKind, CLASSIFIERS};
pub use embedding::{Embedding, EmbeddingCache};
pub use features::MEL_SAMPLE_RATE;
pub use metadata::{load_metadata, ModelMetadata};
pub use onnx::{OnnxLoader, OnnxModel};
pub use pooling::UnnamedClasses;
pub use registry::{LoadState, ModelDescriptor, ModelRegistry};
pub use tagger::{ClassifierRun, TagOptions, Tagger};
pub use traits::{InferenceModel, ModelLoader};
