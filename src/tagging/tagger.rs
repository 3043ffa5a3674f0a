//! Runs the classifier table against one request's audio

use super::catalog::ModelId;
use super::classifier::{Classifier, CLASSIFIERS};
use super::embedding::EmbeddingCache;
use super::registry::ModelRegistry;
use crate::audio::DecodedAudio;
use crate::error::{ModelUnavailable, TagFailure};
use crate::model::{ClassificationOutcome, TagField};
use serde::{Deserialize, Serialize};

/// Per-category tagging switches
///
/// General tags always run when tagging is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagOptions {
    pub genres: bool,
    pub moods: bool,
    pub instruments: bool,
    pub vocals: bool,
    pub danceability: bool,
    pub emotion: bool,
}

impl Default for TagOptions {
    fn default() -> Self {
        Self {
            genres: true,
            moods: true,
            instruments: true,
            vocals: true,
            danceability: true,
            emotion: true,
        }
    }
}

impl TagOptions {
    pub fn enables(&self, field: TagField) -> bool {
        match field {
            TagField::TopTags => true,
            TagField::Genres => self.genres,
            TagField::Moods => self.moods,
            TagField::Instruments => self.instruments,
            TagField::Vocals => self.vocals,
            TagField::Danceability => self.danceability,
            TagField::Emotion => self.emotion,
        }
    }
}

/// Outcome of one classifier for one request
#[derive(Debug)]
pub struct ClassifierRun {
    pub model: ModelId,
    pub field: TagField,
    pub outcome: Result<ClassificationOutcome, TagFailure>,
}

/// Classifier driver over a shared registry
pub struct Tagger<'r> {
    registry: &'r ModelRegistry,
}

impl<'r> Tagger<'r> {
    pub fn new(registry: &'r ModelRegistry) -> Self {
        Self { registry }
    }

    /// Run every enabled classifier
    ///
    /// `audio` must already be at the tagging sample rate. Embeddings are
    /// computed once and shared; each classifier's failure is confined to its
    /// own [`ClassifierRun`].
    pub fn classify(
        &self,
        audio: &DecodedAudio,
        top_n: usize,
        options: &TagOptions,
    ) -> Vec<ClassifierRun> {
        self.registry.ensure_loaded();
        let cache = EmbeddingCache::new(self.registry, audio);

        CLASSIFIERS
            .iter()
            .filter(|c| options.enables(c.field))
            .map(|classifier| ClassifierRun {
                model: classifier.model,
                field: classifier.field,
                outcome: self.run_one(classifier, &cache, top_n),
            })
            .collect()
    }

    fn run_one(
        &self,
        classifier: &Classifier,
        cache: &EmbeddingCache<'_>,
        top_n: usize,
    ) -> Result<ClassificationOutcome, TagFailure> {
        let model = match self.registry.model(classifier.model) {
            Some(model) => model,
            None => {
                let reason = self
                    .registry
                    .unavailable_reason(classifier.model)
                    .cloned()
                    .unwrap_or_else(|| {
                        ModelUnavailable::Missing(self.registry.model_dir().to_path_buf())
                    });
                return Err(reason.into());
            }
        };

        let embedding = cache
            .get(classifier.source)
            .ok_or(ModelUnavailable::ProviderUnavailable(classifier.source.name()))?;

        log::debug!("Running classifier {}", classifier.model);
        let labels = self.registry.metadata(classifier.model);
        Ok(classifier.run(model.as_ref(), labels, embedding, top_n)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_enable_everything() {
        let options = TagOptions::default();
        for c in CLASSIFIERS.iter() {
            assert!(options.enables(c.field));
        }
    }

    #[test]
    fn test_top_tags_cannot_be_disabled() {
        let options = TagOptions {
            genres: false,
            moods: false,
            instruments: false,
            vocals: false,
            danceability: false,
            emotion: false,
        };
        assert!(options.enables(TagField::TopTags));
        assert!(!options.enables(TagField::Vocals));
    }

    #[test]
    fn test_partial_options_deserialize_with_defaults() {
        let options: TagOptions = serde_json::from_str(r#"{"moods": false}"#).unwrap();
        assert!(!options.moods);
        assert!(options.genres);
        assert!(options.emotion);
    }
}
