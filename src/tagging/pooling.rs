//! Turning frame-level activations into a classifier outcome
//!
//! Every classifier's `[frames, classes]` activations are averaged over the
//! frame axis first. The pooled vector is then ranked, thresholded or read as
//! a score pair depending on the classifier kind.

use crate::error::ClassificationFailure;
use crate::model::{ClassificationOutcome, TagItem};
use ndarray::{Array1, ArrayView2, Axis};

/// Ranked labels at or below this confidence are dropped
pub const CONFIDENCE_FLOOR: f32 = 0.1;

/// Binary decisions are positive strictly above this confidence
pub const DECISION_THRESHOLD: f32 = 0.5;

/// Stand-in for a score the regressor does not output
pub const NEUTRAL_SCORE: f32 = 0.5;

/// What to do with a class index past the end of a non-empty label list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnnamedClasses {
    /// Report it as `tag_<index>`
    Synthesize,
    /// Leave it out
    Drop,
}

/// Mean over frames; `None` when there are no frames
pub fn mean_pool(activations: ArrayView2<'_, f32>) -> Option<Array1<f32>> {
    activations.mean_axis(Axis(0))
}

/// Top `top_n` classes by mean activation, keeping only confident ones
///
/// Ranking happens before the confidence filter, so fewer than `top_n` items
/// can come back even when more classes clear the floor further down. A model
/// without any labels yields an empty list.
pub fn ranked_outcome(
    activations: ArrayView2<'_, f32>,
    labels: &[String],
    top_n: usize,
    unnamed: UnnamedClasses,
) -> ClassificationOutcome {
    if labels.is_empty() {
        return ClassificationOutcome::RankedLabels(Vec::new());
    }
    let Some(pooled) = mean_pool(activations) else {
        return ClassificationOutcome::RankedLabels(Vec::new());
    };

    let mut order: Vec<(usize, f32)> = pooled
        .iter()
        .map(|&v| if v.is_nan() { f32::NEG_INFINITY } else { v })
        .enumerate()
        .collect();
    order.sort_by(|a, b| b.1.total_cmp(&a.1));

    let items = order
        .into_iter()
        .take(top_n)
        .filter(|&(_, confidence)| confidence > CONFIDENCE_FLOOR)
        .filter_map(|(index, confidence)| {
            let name = match labels.get(index) {
                Some(label) => label.clone(),
                None => match unnamed {
                    UnnamedClasses::Synthesize => format!("tag_{}", index),
                    UnnamedClasses::Drop => return None,
                },
            };
            Some(TagItem::new(name, confidence))
        })
        .collect();

    ClassificationOutcome::RankedLabels(items)
}

/// Index of the positive class for a binary head
///
/// Labels default to `["negative", "positive"]` when the sidecar is missing.
pub fn positive_index(labels: &[String]) -> usize {
    if labels.len() == 1 {
        0
    } else {
        1
    }
}

/// Positive-class confidence thresholded at [`DECISION_THRESHOLD`]
pub fn binary_outcome(
    activations: ArrayView2<'_, f32>,
    labels: &[String],
) -> Result<ClassificationOutcome, ClassificationFailure> {
    let pooled = mean_pool(activations).ok_or(ClassificationFailure::NoFrames)?;
    let index = positive_index(labels);
    let raw = *pooled.get(index).ok_or(ClassificationFailure::MissingClass {
        index,
        width: pooled.len(),
    })?;

    if !raw.is_finite() {
        return Err(ClassificationFailure::NonFinite { index });
    }

    let confidence = raw.clamp(0.0, 1.0);
    Ok(ClassificationOutcome::BinaryDecision {
        decision: confidence > DECISION_THRESHOLD,
        confidence,
    })
}

/// First two pooled outputs as (arousal, valence), clamped to `[0, 1]`
///
/// A dimension the model does not output becomes [`NEUTRAL_SCORE`]. A NaN or
/// infinite output is a failure.
pub fn score_pair_outcome(
    activations: ArrayView2<'_, f32>,
) -> Result<ClassificationOutcome, ClassificationFailure> {
    let pooled = mean_pool(activations).ok_or(ClassificationFailure::NoFrames)?;
    let score = |index: usize| match pooled.get(index) {
        Some(&v) if !v.is_finite() => Err(ClassificationFailure::NonFinite { index }),
        Some(&v) => Ok(v.clamp(0.0, 1.0)),
        None => Ok(NEUTRAL_SCORE),
    };

    Ok(ClassificationOutcome::ScorePair {
        arousal: score(0)?,
        valence: score(1)?,
    })
}
