//! Per-request embedding cache
//!
//! The mel spectrogram and each provider's embeddings are computed at most
//! once per request, on first demand, and shared by every classifier that
//! consumes them. A provider that is missing or fails yields `None` for the
//! rest of the request.

use super::catalog::EmbeddingSource;
use super::features::{compute_mel_spectrogram, extract_patches};
use super::registry::ModelRegistry;
use crate::audio::DecodedAudio;
use ndarray::Array2;
use std::cell::OnceCell;

/// Embedding frames produced by one provider, `[patches, dims]`
#[derive(Debug, Clone)]
pub struct Embedding {
    pub source: EmbeddingSource,
    pub frames: Array2<f32>,
}

/// Lazily computed embeddings for one request's audio
///
/// The audio must already be at the rate the embedding models expect.
pub struct EmbeddingCache<'a> {
    registry: &'a ModelRegistry,
    audio: &'a DecodedAudio,
    mel: OnceCell<Option<Array2<f32>>>,
    embeddings: [OnceCell<Option<Embedding>>; 2],
}

impl<'a> EmbeddingCache<'a> {
    pub fn new(registry: &'a ModelRegistry, audio: &'a DecodedAudio) -> Self {
        Self {
            registry,
            audio,
            mel: OnceCell::new(),
            embeddings: [OnceCell::new(), OnceCell::new()],
        }
    }

    /// Embeddings from `source`, computing them on first call
    pub fn get(&self, source: EmbeddingSource) -> Option<&Embedding> {
        self.embeddings[source.index()]
            .get_or_init(|| self.compute(source))
            .as_ref()
    }

    fn mel(&self) -> Option<&Array2<f32>> {
        self.mel
            .get_or_init(|| {
                let audio = self.audio;
                match compute_mel_spectrogram(audio.samples(), audio.sample_rate()) {
                    Ok(mel) => {
                        log::debug!("Mel spectrogram: {} frames", mel.nrows());
                        Some(mel)
                    }
                    Err(e) => {
                        log::warn!("Mel spectrogram failed: {}", e);
                        None
                    }
                }
            })
            .as_ref()
    }

    fn compute(&self, source: EmbeddingSource) -> Option<Embedding> {
        let model = self.registry.model(source.model())?;
        let mel = self.mel()?;

        let patches = extract_patches(mel.view(), source.patch_frames(), source.patch_hop());
        log::debug!(
            "Running {} embeddings on {} patches",
            source.name(),
            patches.dim().0
        );

        match model.run(patches.view().into_dyn()) {
            Ok(frames) => Some(Embedding { source, frames }),
            Err(e) => {
                log::warn!("Embedding extraction failed ({}): {}", source.name(), e);
                None
            }
        }
    }
}
