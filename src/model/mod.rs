//! Output data model
//!
//! These records are independent of how the estimates were produced and are
//! what the serving layer serializes.

mod key;
mod result;
mod tags;
mod tempo;

pub use key::{normalize_root, to_notation, KeyResult};
pub use result::AnalysisResult;
pub use tags::{ClassificationOutcome, TagField, TagItem, TagResult};
pub use tempo::{TempoResult, MAX_REPORTED_BEATS};
