//! Musical key results and DJ wheel notation

use serde::{Deserialize, Serialize};

/// Flat spellings and their sharp enharmonic equivalents
const ENHARMONIC_SHARPS: [(&str, &str); 5] = [
    ("Db", "C#"),
    ("Eb", "D#"),
    ("Gb", "F#"),
    ("Ab", "G#"),
    ("Bb", "A#"),
];

/// Wheel notation table: (root, scale, code)
///
/// Minor keys are 1A-12A and major keys 1B-12B. Neighbouring numbers are a
/// fifth apart and a major key shares its number with its relative minor.
const WHEEL: [(&str, &str, &str); 24] = [
    ("G#", "minor", "1A"),
    ("D#", "minor", "2A"),
    ("A#", "minor", "3A"),
    ("F", "minor", "4A"),
    ("C", "minor", "5A"),
    ("G", "minor", "6A"),
    ("D", "minor", "7A"),
    ("A", "minor", "8A"),
    ("E", "minor", "9A"),
    ("B", "minor", "10A"),
    ("F#", "minor", "11A"),
    ("C#", "minor", "12A"),
    ("B", "major", "1B"),
    ("F#", "major", "2B"),
    ("C#", "major", "3B"),
    ("G#", "major", "4B"),
    ("D#", "major", "5B"),
    ("A#", "major", "6B"),
    ("F", "major", "7B"),
    ("C", "major", "8B"),
    ("G", "major", "9B"),
    ("D", "major", "10B"),
    ("A", "major", "11B"),
    ("E", "major", "12B"),
];

/// Replace a flat root spelling with its sharp equivalent
///
/// Sharp and natural spellings are returned unchanged.
pub fn normalize_root(root: &str) -> &str {
    let root = root.trim();
    ENHARMONIC_SHARPS
        .iter()
        .find(|(flat, _)| *flat == root)
        .map(|(_, sharp)| *sharp)
        .unwrap_or(root)
}

/// Wheel code for a (root, scale) pair, or `""` when the pair is not in the table
///
/// Expects an already normalized root; scale matching ignores case.
pub fn to_notation(root: &str, scale: &str) -> &'static str {
    WHEEL
        .iter()
        .find(|(r, s, _)| *r == root && s.eq_ignore_ascii_case(scale))
        .map(|(_, _, code)| *code)
        .unwrap_or("")
}

/// Detected key as reported to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyResult {
    /// Display string, e.g. "A minor"
    pub value: String,

    /// "major" or "minor"
    pub scale: String,

    /// Root note using sharp spellings
    pub root: String,

    /// Wheel notation code, empty when unmapped
    pub camelot: String,

    /// Raw estimator strength
    pub confidence: f32,
}

impl KeyResult {
    /// Build a result from a raw key label
    ///
    /// The strength is reported as-is; no re-normalization happens here.
    pub fn from_raw(root: &str, scale: &str, strength: f32) -> Self {
        let root = normalize_root(root).to_string();
        let scale = scale.trim().to_lowercase();
        let camelot = to_notation(&root, &scale).to_string();

        Self {
            value: format!("{} {}", root, scale),
            scale,
            root,
            camelot,
            confidence: strength,
        }
    }
}
