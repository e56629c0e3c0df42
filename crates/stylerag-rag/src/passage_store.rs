//! Passage store: identifier -> passage text and structure

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use stylerag_core::{Error, Passage, Result, SourceFields, optional_whole_number};

/// A value in the persisted mapping: either bare text or a section record
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredPassage {
    Text(String),
    Record(SectionRecord),
}

#[derive(Deserialize)]
struct SectionRecord {
    #[serde(alias = "contents")]
    text: String,
    #[serde(default, alias = "n_tokens", deserialize_with = "optional_whole_number")]
    token_count: Option<usize>,
    #[serde(flatten)]
    source: SourceFields,
}

/// Rough token estimate for passages stored without a count (~4 chars per token)
pub(crate) fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Read-only mapping from passage identifier to passage, loaded once at startup
#[derive(Debug, Clone, Default)]
pub struct PassageStore {
    passages: HashMap<String, Passage>,
}

impl PassageStore {
    /// Build a store from already constructed passages
    pub fn from_passages(passages: impl IntoIterator<Item = Passage>) -> Self {
        Self {
            passages: passages.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }

    /// Parse a JSON object mapping ids to either text or section records
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let stored: HashMap<String, StoredPassage> = serde_json::from_str(raw)
            .map_err(|e| Error::PassageStore(format!("Invalid passage mapping: {}", e)))?;

        let passages = stored.into_iter().map(|(id, value)| match value {
            StoredPassage::Text(text) => Passage {
                token_count: estimate_tokens(&text),
                id,
                text,
                source: SourceFields::default(),
            },
            StoredPassage::Record(record) => Passage {
                token_count: record
                    .token_count
                    .unwrap_or_else(|| estimate_tokens(&record.text)),
                id,
                text: record.text,
                source: record.source,
            },
        });

        Ok(Self::from_passages(passages))
    }

    /// Load the mapping file persisted next to the index
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::PassageStore(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let store = Self::from_json_str(&raw)?;
        tracing::info!(path = %path.display(), passages = store.len(), "loaded passage store");
        Ok(store)
    }

    pub fn get(&self, id: &str) -> Option<&Passage> {
        self.passages.get(id)
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_plain_and_record_values() {
        let raw = r#"{
            "pep8-1": "Use 4 spaces per indentation level.",
            "cpp-2": {
                "document": "cppguide",
                "chapter": "Naming",
                "section": "Type Names",
                "link": "https://google.github.io/styleguide/cppguide.html#Type_Names",
                "contents": "Type names start with a capital letter.",
                "n_tokens": 9
            }
        }"#;

        let store = PassageStore::from_json_str(raw).unwrap();
        assert_eq!(store.len(), 2);

        let plain = store.get("pep8-1").unwrap();
        assert_eq!(plain.text, "Use 4 spaces per indentation level.");
        assert_eq!(plain.token_count, 9);
        assert!(plain.source.is_empty());

        let record = store.get("cpp-2").unwrap();
        assert_eq!(record.text, "Type names start with a capital letter.");
        assert_eq!(record.token_count, 9);
        assert_eq!(record.source.chapter.as_deref(), Some("Naming"));
    }

    #[test]
    fn test_token_counts_must_be_whole() {
        let whole = r#"{"a": {"contents": "Indent with four spaces.", "n_tokens": 6.0}}"#;
        assert_eq!(PassageStore::from_json_str(whole).unwrap().get("a").unwrap().token_count, 6);

        let fractional = r#"{"a": {"contents": "Indent with four spaces.", "n_tokens": 6.5}}"#;
        assert!(matches!(
            PassageStore::from_json_str(fractional),
            Err(Error::PassageStore(_))
        ));

        let negative = r#"{"a": {"contents": "Indent with four spaces.", "n_tokens": -1}}"#;
        assert!(PassageStore::from_json_str(negative).is_err());
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"a": "first passage", "b": "second passage"}}"#).unwrap();

        let store = PassageStore::load(file.path()).unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.get("c").is_none());
    }

    #[test]
    fn test_invalid_mapping() {
        assert!(matches!(
            PassageStore::from_json_str("[1, 2, 3]"),
            Err(Error::PassageStore(_))
        ));
        assert!(matches!(
            PassageStore::load("/nonexistent/mapping.json"),
            Err(Error::PassageStore(_))
        ));
    }
}
