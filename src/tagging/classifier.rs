//! Classifier table
//!
//! Each classifier reads one embedding provider, runs one head model and
//! writes one [`TagField`].

use super::catalog::{EmbeddingSource, ModelId};
use super::embedding::Embedding;
use super::pooling::{binary_outcome, ranked_outcome, score_pair_outcome, UnnamedClasses};
use super::traits::InferenceModel;
use crate::error::ClassificationFailure;
use crate::model::{ClassificationOutcome, TagField};

/// How a head's activations are read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierKind {
    RankedLabels { unnamed: UnnamedClasses },
    BinaryDecision,
    ScorePair,
}

/// One head model and where its output goes
#[derive(Debug, Clone, Copy)]
pub struct Classifier {
    pub model: ModelId,
    pub source: EmbeddingSource,
    pub kind: ClassifierKind,
    pub field: TagField,
}

/// All classifiers, in the order they run
pub const CLASSIFIERS: [Classifier; 7] = [
    Classifier {
        model: ModelId::GeneralTags,
        source: EmbeddingSource::Musicnn,
        kind: ClassifierKind::RankedLabels {
            unnamed: UnnamedClasses::Synthesize,
        },
        field: TagField::TopTags,
    },
    Classifier {
        model: ModelId::Genre,
        source: EmbeddingSource::Effnet,
        kind: ClassifierKind::RankedLabels {
            unnamed: UnnamedClasses::Drop,
        },
        field: TagField::Genres,
    },
    Classifier {
        model: ModelId::MoodTheme,
        source: EmbeddingSource::Effnet,
        kind: ClassifierKind::RankedLabels {
            unnamed: UnnamedClasses::Drop,
        },
        field: TagField::Moods,
    },
    Classifier {
        model: ModelId::Instrument,
        source: EmbeddingSource::Effnet,
        kind: ClassifierKind::RankedLabels {
            unnamed: UnnamedClasses::Drop,
        },
        field: TagField::Instruments,
    },
    Classifier {
        model: ModelId::VoiceInstrumental,
        source: EmbeddingSource::Effnet,
        kind: ClassifierKind::BinaryDecision,
        field: TagField::Vocals,
    },
    Classifier {
        model: ModelId::Danceability,
        source: EmbeddingSource::Effnet,
        kind: ClassifierKind::BinaryDecision,
        field: TagField::Danceability,
    },
    Classifier {
        model: ModelId::EmoMusic,
        source: EmbeddingSource::Musicnn,
        kind: ClassifierKind::ScorePair,
        field: TagField::Emotion,
    },
];

impl Classifier {
    /// Run the head on `embedding` and pool its activations
    pub fn run(
        &self,
        model: &dyn InferenceModel,
        labels: &[String],
        embedding: &Embedding,
        top_n: usize,
    ) -> Result<ClassificationOutcome, ClassificationFailure> {
        let activations = model.run(embedding.frames.view().into_dyn())?;

        match self.kind {
            ClassifierKind::RankedLabels { unnamed } => Ok(ranked_outcome(
                activations.view(),
                labels,
                top_n,
                unnamed,
            )),
            ClassifierKind::BinaryDecision => binary_outcome(activations.view(), labels),
            ClassifierKind::ScorePair => score_pair_outcome(activations.view()),
        }
    }
}
