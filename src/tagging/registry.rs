//! Process-wide model registry
//!
//! Built once at startup and shared by reference with every request. Each
//! catalog entry is initialised at most once, even under concurrent first
//! access: the slot is a [`OnceLock`], so racing callers block until the
//! winner finishes and then all observe the same fully-built state. After
//! that, lookups are plain reads.
//!
//! A load that fails is cached as failed for the lifetime of the registry and
//! logged once. Nothing in here returns an error to the caller.

use super::catalog::ModelId;
use super::metadata::load_metadata;
use super::onnx::OnnxLoader;
use super::traits::{InferenceModel, ModelLoader};
use crate::error::ModelUnavailable;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

/// Result of the one load attempt for a model
#[derive(Clone)]
pub enum ModelSlot {
    Loaded(LoadedModel),
    Failed(ModelUnavailable),
}

/// A successfully loaded model and its labels
#[derive(Clone)]
pub struct LoadedModel {
    pub model: Arc<dyn InferenceModel>,
    /// Ordered class names; empty when the sidecar is absent or unreadable
    pub labels: Vec<String>,
    pub artifact: PathBuf,
}

/// Load state of a catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    Unloaded,
    Loaded,
    Failed,
}

/// Snapshot of one catalog entry, for status reporting
#[derive(Debug, Clone, Serialize)]
pub struct ModelDescriptor {
    pub name: &'static str,
    pub artifact: PathBuf,
    pub label_count: usize,
    pub state: LoadState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Lazily loaded catalog of inference models
pub struct ModelRegistry {
    model_dir: PathBuf,
    loader: Box<dyn ModelLoader>,
    slots: Vec<OnceLock<ModelSlot>>,
}

impl ModelRegistry {
    /// Registry over `model_dir` using a custom loader
    pub fn new(model_dir: PathBuf, loader: impl ModelLoader + 'static) -> Self {
        log::info!("Model registry initialized with model_dir={:?}", model_dir);
        Self {
            model_dir,
            loader: Box::new(loader),
            slots: ModelId::ALL.iter().map(|_| OnceLock::new()).collect(),
        }
    }

    /// Registry over `model_dir` loading ONNX artifacts
    pub fn onnx(model_dir: PathBuf) -> Self {
        Self::new(model_dir, OnnxLoader::new())
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    /// Load every catalog entry that has not been attempted yet
    ///
    /// Idempotent; repeated or concurrent calls after the first attempt are
    /// no-ops.
    pub fn ensure_loaded(&self) {
        for id in ModelId::ALL {
            self.slot(id);
        }
    }

    /// The slot for `id`, loading it on first use
    pub fn slot(&self, id: ModelId) -> &ModelSlot {
        self.slots[id.index()].get_or_init(|| self.load(id))
    }

    /// Inference handle, or `None` when the model is unavailable
    pub fn model(&self, id: ModelId) -> Option<Arc<dyn InferenceModel>> {
        match self.slot(id) {
            ModelSlot::Loaded(loaded) => Some(Arc::clone(&loaded.model)),
            ModelSlot::Failed(_) => None,
        }
    }

    /// Cached label list, empty when unavailable
    pub fn metadata(&self, id: ModelId) -> &[String] {
        match self.slot(id) {
            ModelSlot::Loaded(loaded) => &loaded.labels,
            ModelSlot::Failed(_) => &[],
        }
    }

    /// Why `id` is unavailable, if it is
    pub fn unavailable_reason(&self, id: ModelId) -> Option<&ModelUnavailable> {
        match self.slot(id) {
            ModelSlot::Loaded(_) => None,
            ModelSlot::Failed(reason) => Some(reason),
        }
    }

    /// Current state of every catalog entry, without triggering loads
    pub fn descriptors(&self) -> Vec<ModelDescriptor> {
        ModelId::ALL
            .iter()
            .map(|&id| match self.slots[id.index()].get() {
                None => ModelDescriptor {
                    name: id.name(),
                    artifact: self.artifact_path(id.name()),
                    label_count: 0,
                    state: LoadState::Unloaded,
                    error: None,
                },
                Some(ModelSlot::Loaded(loaded)) => ModelDescriptor {
                    name: id.name(),
                    artifact: loaded.artifact.clone(),
                    label_count: loaded.labels.len(),
                    state: LoadState::Loaded,
                    error: None,
                },
                Some(ModelSlot::Failed(reason)) => ModelDescriptor {
                    name: id.name(),
                    artifact: self.artifact_path(id.name()),
                    label_count: 0,
                    state: LoadState::Failed,
                    error: Some(reason.to_string()),
                },
            })
            .collect()
    }

    fn artifact_path(&self, stem: &str) -> PathBuf {
        self.model_dir.join(format!("{}.onnx", stem))
    }

    fn load(&self, id: ModelId) -> ModelSlot {
        let Some(artifact) = id
            .artifact_stems()
            .iter()
            .map(|stem| self.artifact_path(stem))
            .find(|path| path.exists())
        else {
            let expected = self.artifact_path(id.name());
            log::warn!("Model not found: {:?}", expected);
            return ModelSlot::Failed(ModelUnavailable::Missing(expected));
        };

        if artifact.file_stem().and_then(|s| s.to_str()) != Some(id.name()) {
            log::info!("Using {:?} as artifact for {}", artifact, id);
        }

        let model = match self.loader.load(id, &artifact) {
            Ok(model) => model,
            Err(e) => {
                log::error!("Failed to load model {}: {:#}", id, e);
                return ModelSlot::Failed(ModelUnavailable::LoadFailed {
                    path: artifact,
                    reason: format!("{:#}", e),
                });
            }
        };

        let labels = if id.has_labels() {
            self.load_labels(id)
        } else {
            Vec::new()
        };

        log::debug!("Loaded model: {} ({} classes)", id, labels.len());
        ModelSlot::Loaded(LoadedModel {
            model,
            labels,
            artifact,
        })
    }

    fn load_labels(&self, id: ModelId) -> Vec<String> {
        let json_path = self.model_dir.join(format!("{}.json", id.name()));
        if !json_path.exists() {
            log::warn!("Model metadata not found: {:?}", json_path);
            return Vec::new();
        }

        match load_metadata(&json_path) {
            Ok(meta) => meta.classes,
            Err(e) => {
                log::warn!("Unreadable model metadata {:?}: {}", json_path, e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InferenceError;
    use anyhow::Result;
    use ndarray::{Array2, ArrayViewD};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct ZeroModel;

    impl InferenceModel for ZeroModel {
        fn run(&self, input: ArrayViewD<'_, f32>) -> Result<Array2<f32>, InferenceError> {
            Ok(Array2::zeros((input.shape()[0], 2)))
        }
    }

    /// Counts load attempts per model
    #[derive(Clone, Default)]
    struct CountingLoader {
        attempts: Arc<Vec<AtomicUsize>>,
        artifacts: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl CountingLoader {
        fn new() -> Self {
            Self {
                attempts: Arc::new(ModelId::ALL.iter().map(|_| AtomicUsize::new(0)).collect()),
                artifacts: Arc::default(),
            }
        }

        fn attempts(&self, id: ModelId) -> usize {
            self.attempts[id.index()].load(Ordering::SeqCst)
        }
    }

    impl ModelLoader for CountingLoader {
        fn load(&self, id: ModelId, artifact: &Path) -> Result<Arc<dyn InferenceModel>> {
            self.attempts[id.index()].fetch_add(1, Ordering::SeqCst);
            self.artifacts.lock().unwrap().push(artifact.to_path_buf());
            // Widen the race window
            std::thread::sleep(std::time::Duration::from_millis(5));
            if std::fs::read(artifact)? == b"corrupt" {
                anyhow::bail!("invalid graph");
            }
            Ok(Arc::new(ZeroModel))
        }
    }

    fn write_model(dir: &Path, stem: &str, classes: Option<&str>) {
        std::fs::write(dir.join(format!("{}.onnx", stem)), b"onnx").unwrap();
        if let Some(classes) = classes {
            std::fs::write(
                dir.join(format!("{}.json", stem)),
                format!(r#"{{"classes": {}}}"#, classes),
            )
            .unwrap();
        }
    }

    #[test]
    fn test_missing_artifact_is_cached_as_failed() {
        let dir = TempDir::new().unwrap();
        let loader = CountingLoader::new();
        let registry = ModelRegistry::new(dir.path().to_path_buf(), loader.clone());

        registry.ensure_loaded();
        registry.ensure_loaded();

        assert!(registry.model(ModelId::Genre).is_none());
        assert!(registry.metadata(ModelId::Genre).is_empty());
        assert!(matches!(
            registry.unavailable_reason(ModelId::Genre),
            Some(ModelUnavailable::Missing(_))
        ));
        assert_eq!(loader.attempts(ModelId::Genre), 0);
    }

    #[test]
    fn test_loads_model_and_labels() {
        let dir = TempDir::new().unwrap();
        write_model(dir.path(), "mtg_jamendo_genre-discogs-effnet-1", Some(r#"["rock", "jazz"]"#));

        let registry = ModelRegistry::new(dir.path().to_path_buf(), CountingLoader::new());
        assert!(registry.model(ModelId::Genre).is_some());
        assert_eq!(registry.metadata(ModelId::Genre), ["rock", "jazz"]);
    }

    #[test]
    fn test_missing_sidecar_keeps_model_without_labels() {
        let dir = TempDir::new().unwrap();
        write_model(dir.path(), "danceability-discogs-effnet-1", None);

        let registry = ModelRegistry::new(dir.path().to_path_buf(), CountingLoader::new());
        assert!(registry.model(ModelId::Danceability).is_some());
        assert!(registry.metadata(ModelId::Danceability).is_empty());
    }

    #[test]
    fn test_invalid_artifact_is_failed_not_raised() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("msd-musicnn-1.onnx"), b"corrupt").unwrap();

        let loader = CountingLoader::new();
        let registry = ModelRegistry::new(dir.path().to_path_buf(), loader.clone());
        registry.ensure_loaded();
        registry.ensure_loaded();

        assert!(registry.model(ModelId::GeneralTags).is_none());
        assert!(matches!(
            registry.unavailable_reason(ModelId::GeneralTags),
            Some(ModelUnavailable::LoadFailed { .. })
        ));
        assert_eq!(loader.attempts(ModelId::GeneralTags), 1);
    }

    #[test]
    fn test_effnet_falls_back_to_genre_artifact() {
        let dir = TempDir::new().unwrap();
        write_model(dir.path(), "mtg_jamendo_genre-discogs-effnet-1", None);

        let loader = CountingLoader::new();
        let registry = ModelRegistry::new(dir.path().to_path_buf(), loader.clone());
        assert!(registry.model(ModelId::EffnetEmbedding).is_some());

        let artifacts = loader.artifacts.lock().unwrap();
        assert!(artifacts[0].ends_with("mtg_jamendo_genre-discogs-effnet-1.onnx"));
    }

    #[test]
    fn test_concurrent_first_access_loads_once() {
        let dir = TempDir::new().unwrap();
        for id in ModelId::ALL {
            write_model(dir.path(), id.name(), Some(r#"["a", "b"]"#));
        }

        let loader = CountingLoader::new();
        let registry = ModelRegistry::new(dir.path().to_path_buf(), loader.clone());

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    registry.ensure_loaded();
                    assert!(registry.model(ModelId::MoodTheme).is_some());
                });
            }
        });

        for id in ModelId::ALL {
            assert_eq!(loader.attempts(id), 1, "{} loaded more than once", id);
        }
    }

    #[test]
    fn test_descriptors_report_states() {
        let dir = TempDir::new().unwrap();
        write_model(dir.path(), "voice_instrumental-discogs-effnet-1", Some(r#"["instrumental", "voice"]"#));

        let registry = ModelRegistry::new(dir.path().to_path_buf(), CountingLoader::new());
        let before = registry.descriptors();
        assert!(before.iter().all(|d| d.state == LoadState::Unloaded));

        registry.ensure_loaded();
        let after = registry.descriptors();
        let voice = after
            .iter()
            .find(|d| d.name == "voice_instrumental-discogs-effnet-1")
            .unwrap();
        assert_eq!(voice.state, LoadState::Loaded);
        assert_eq!(voice.label_count, 2);

        let genre = after
            .iter()
            .find(|d| d.name == "mtg_jamendo_genre-discogs-effnet-1")
            .unwrap();
        assert_eq!(genre.state, LoadState::Failed);
        assert!(genre.error.is_some());
    }
}
