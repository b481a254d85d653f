//! Website dataset loader.
//!
//! The dataset is a JSON array of `{ "page": ..., "text": ..., "url": ... }`
//! records. Loading is strict: a missing or mistyped field in any record
//! fails the whole load with the record's position, since the assistant
//! cannot start on a partial knowledge base.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::errors::{RagError, Result};

/// One page of the website. Immutable after loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub page: String,
    pub content: String,
    pub url: String,
}

/// Row shape of the dataset file.
#[derive(Deserialize)]
struct Row {
    page: String,
    text: String,
    url: String,
}

/// Reads and validates the dataset file.
///
/// # Errors
/// - [`RagError::Io`] if the file cannot be read.
/// - [`RagError::Parse`] if it is not JSON.
/// - [`RagError::Dataset`] if the top level is not an array or a record
///   violates the schema.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Vec<Document>> {
    let path = path.as_ref();
    info!(path = %path.display(), "reading website dataset");

    let raw = fs::read_to_string(path)?;
    let docs = parse_dataset(&raw)?;

    debug!(documents = docs.len(), "dataset loaded");
    Ok(docs)
}

/// Parses dataset JSON already in memory.
///
/// # Errors
/// Same as [`load_dataset`] minus I/O.
pub fn parse_dataset(raw: &str) -> Result<Vec<Document>> {
    let value: Value = serde_json::from_str(raw)?;
    let Value::Array(items) = value else {
        return Err(RagError::Dataset(
            "expected a JSON array of {page, text, url} records".into(),
        ));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let row: Row = serde_json::from_value(item)
                .map_err(|e| RagError::Dataset(format!("record {i}: {e}")))?;
            Ok(Document {
                page: row.page,
                content: row.text,
                url: row.url,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn parses_records_and_renames_text() {
        let raw = r#"[
            {"page": "home", "text": "Welcome", "url": "https://example.com/"},
            {"page": "about", "text": "Who we are", "url": "https://example.com/about", "lang": "en"}
        ]"#;
        let docs = parse_dataset(raw).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].content, "Welcome");
        assert_eq!(docs[1].page, "about");
    }

    #[test]
    fn missing_field_names_the_record() {
        let raw = r#"[{"page": "a", "text": "t", "url": "u"}, {"page": "b", "url": "u"}]"#;
        let err = parse_dataset(raw).unwrap_err();
        match err {
            RagError::Dataset(msg) => {
                assert!(msg.starts_with("record 1:"), "{msg}");
                assert!(msg.contains("text"), "{msg}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn wrong_type_is_a_schema_error() {
        let raw = r#"[{"page": 3, "text": "t", "url": "u"}]"#;
        assert!(matches!(parse_dataset(raw), Err(RagError::Dataset(_))));
    }

    #[test]
    fn top_level_must_be_array() {
        assert!(matches!(
            parse_dataset(r#"{"page": "a"}"#),
            Err(RagError::Dataset(_))
        ));
        assert!(matches!(parse_dataset("not json"), Err(RagError::Parse(_))));
    }

    #[test]
    fn load_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(
            f,
            r#"[{{"page": "contact", "text": "Write to us", "url": "https://example.com/contact"}}]"#
        )
        .unwrap();
        let docs = load_dataset(f.path()).unwrap();
        assert_eq!(docs[0].page, "contact");
    }

    #[test]
    fn bundled_sample_is_valid() {
        let docs = parse_dataset(include_str!("../../data/website_data.json")).unwrap();
        assert!(docs.iter().any(|d| d.page == "services"));
        assert!(docs.iter().all(|d| !d.content.is_empty()));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_dataset(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, RagError::Io(_)));
    }
}
