//! Sidecar label metadata

use crate::error::MetadataError;
use serde::Deserialize;
use std::path::Path;

/// Contents of a `<model>.json` sidecar
///
/// Only `classes` is read; other keys in the file are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelMetadata {
    #[serde(default)]
    pub classes: Vec<String>,
}

/// Read a sidecar metadata file
pub fn load_metadata(path: &Path) -> Result<ModelMetadata, MetadataError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_reads_classes_and_ignores_extra_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(
            &path,
            r#"{"name": "genre", "classes": ["rock", "jazz"], "inference": {"sample_rate": 16000}}"#,
        )
        .unwrap();

        let meta = load_metadata(&path).unwrap();
        assert_eq!(meta.classes, vec!["rock", "jazz"]);
    }

    #[test]
    fn test_missing_classes_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, r#"{"name": "genre"}"#).unwrap();
        assert!(load_metadata(&path).unwrap().classes.is_empty());
    }

    #[test]
    fn test_invalid_json_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(load_metadata(&path), Err(MetadataError::Parse(_))));
    }

    #[test]
    fn test_missing_file_fails() {
        assert!(matches!(
            load_metadata(Path::new("/nonexistent/model.json")),
            Err(MetadataError::Io(_))
        ));
    }
}
