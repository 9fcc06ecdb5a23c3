use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

use crate::models::RawCollection;

/// Hard errors for the raw-records input boundary. Anything softer (missing
/// stages, malformed stage keys) is the normalizer's problem, not a parse
/// failure.
#[derive(Debug, Error)]
pub enum RecordsError {
    #[error("failed to read records file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("records payload is not a file-record mapping")]
    Shape(#[source] serde_json::Error),
}

/// Parse a saved raw-records snapshot from a JSON file.
pub fn parse_records_file(path: &Path) -> Result<RawCollection, RecordsError> {
    let content = std::fs::read_to_string(path).map_err(|source| RecordsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_records_json(&content)
}

/// Parse a raw-records JSON document. A `null` document is an empty
/// collection; anything that is not a file-record mapping is a hard error.
pub fn parse_records_json(json: &str) -> Result<RawCollection, RecordsError> {
    let collection: Option<RawCollection> =
        serde_json::from_str(json).map_err(RecordsError::Shape)?;
    Ok(collection.unwrap_or_default())
}

/// Read an image file and encode it as the base64 payload the backend's
/// upload endpoint expects.
pub fn encode_image_file(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read image file: {:?}", path))?;
    Ok(STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_parse_records_json() {
        let json = r#"{
            "f1": {
                "stage:1": {"employee_id": "E1"},
                "stage:6": [{"stage": 6, "stage_name": "Send Email"}]
            }
        }"#;

        let collection = parse_records_json(json).unwrap();

        assert_eq!(collection.len(), 1);
        assert_eq!(collection["f1"].len(), 2);
    }

    #[test]
    fn test_null_document_is_empty_collection() {
        let collection = parse_records_json("null").unwrap();

        assert!(collection.is_empty());
    }

    #[test]
    fn test_non_mapping_document_is_hard_error() {
        let err = parse_records_json(r#"[{"stage:1": {}}]"#).unwrap_err();

        assert!(matches!(err, RecordsError::Shape(_)));
    }

    #[test]
    fn test_parse_records_file_missing() {
        let err = parse_records_file(Path::new("/nonexistent/records.json")).unwrap_err();

        assert!(matches!(err, RecordsError::Io { .. }));
    }

    #[test]
    fn test_encode_image_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xFF, 0xD8, 0xFF, 0xE0]).unwrap();

        let encoded = encode_image_file(file.path()).unwrap();

        assert_eq!(encoded, STANDARD.encode([0xFF, 0xD8, 0xFF, 0xE0]));
    }
}
