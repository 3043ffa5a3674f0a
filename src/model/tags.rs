//! Classification outcomes and the aggregated tag record

use serde::{Deserialize, Serialize};

/// A ranked label with its pooled activation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagItem {
    /// Class name
    pub name: String,
    /// Pooled activation in [0, 1]
    pub confidence: f32,
}

impl TagItem {
    pub fn new(name: impl Into<String>, confidence: f32) -> Self {
        Self {
            name: name.into(),
            confidence,
        }
    }
}

/// Output of a single classifier
#[derive(Debug, Clone, PartialEq)]
pub enum ClassificationOutcome {
    /// Labels in non-increasing confidence order, each above the confidence floor
    RankedLabels(Vec<TagItem>),

    /// Positive-class decision; `decision == (confidence > 0.5)`
    BinaryDecision { decision: bool, confidence: f32 },

    /// Arousal and valence, each in [0, 1]
    ScorePair { arousal: f32, valence: f32 },
}

/// Field of [`TagResult`] a classifier writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagField {
    TopTags,
    Genres,
    Moods,
    Instruments,
    Vocals,
    Danceability,
    Emotion,
}

/// Aggregated classifier outputs
///
/// Each field is present only when its model was available and ran cleanly.
/// `top_tags` is also left out when no tag cleared the confidence floor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_tags: Option<Vec<TagItem>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moods: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruments: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_vocals: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocal_confidence: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_danceable: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub danceability_confidence: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arousal: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valence: Option<f32>,
}

impl TagResult {
    /// Store a classifier outcome in `field`
    ///
    /// Returns false (and stores nothing) when the outcome shape does not fit
    /// the field.
    pub fn record(&mut self, field: TagField, outcome: ClassificationOutcome) -> bool {
        use ClassificationOutcome::*;

        match (field, outcome) {
            (TagField::TopTags, RankedLabels(items)) => {
                self.top_tags = (!items.is_empty()).then_some(items)
            }
            (TagField::Genres, RankedLabels(items)) => self.genres = Some(names(items)),
            (TagField::Moods, RankedLabels(items)) => self.moods = Some(names(items)),
            (TagField::Instruments, RankedLabels(items)) => {
                self.instruments = Some(names(items))
            }
            (TagField::Vocals, BinaryDecision { decision, confidence }) => {
                self.has_vocals = Some(decision);
                self.vocal_confidence = Some(confidence);
            }
            (TagField::Danceability, BinaryDecision { decision, confidence }) => {
                self.is_danceable = Some(decision);
                self.danceability_confidence = Some(confidence);
            }
            (TagField::Emotion, ScorePair { arousal, valence }) => {
                self.arousal = Some(arousal);
                self.valence = Some(valence);
            }
            _ => return false,
        }
        true
    }

    /// True when no classifier produced anything
    pub fn is_empty(&self) -> bool {
        *self == TagResult::default()
    }
}

fn names(items: Vec<TagItem>) -> Vec<String> {
    items.into_iter().map(|item| item.name).collect()
}
