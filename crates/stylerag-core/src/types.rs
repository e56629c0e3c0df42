//! Data model shared across the stylerag crates

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Structural location of a passage inside the style guide corpus.
///
/// Not every passage carries the full hierarchy, so each field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl SourceFields {
    /// True when none of the structural fields are present
    pub fn is_empty(&self) -> bool {
        self.document.is_none()
            && self.chapter.is_none()
            && self.section.is_none()
            && self.link.is_none()
    }

    /// Fill every missing field from `other`
    pub fn or(&self, other: &SourceFields) -> SourceFields {
        SourceFields {
            document: self.document.clone().or_else(|| other.document.clone()),
            chapter: self.chapter.clone().or_else(|| other.chapter.clone()),
            section: self.section.clone().or_else(|| other.section.clone()),
            link: self.link.clone().or_else(|| other.link.clone()),
        }
    }
}

/// A passage of the pre-indexed corpus, loaded once and never mutated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub id: String,
    pub text: String,
    pub token_count: usize,
    #[serde(flatten)]
    pub source: SourceFields,
}

/// Metadata the vector index stores next to each vector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchMetadata {
    #[serde(alias = "n_tokens", deserialize_with = "whole_number")]
    pub token_count: usize,
    #[serde(flatten)]
    pub source: SourceFields,
}

/// Deserialize a token count that may arrive as a float (`123.0`).
///
/// Vector stores commonly hand numeric metadata back as floats. Negative or
/// fractional values are rejected.
pub fn whole_number<'de, D>(deserializer: D) -> std::result::Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    to_whole(f64::deserialize(deserializer)?)
}

/// Like [`whole_number`], for counts that may be absent
pub fn optional_whole_number<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer)?.map(to_whole).transpose()
}

fn to_whole<E: serde::de::Error>(value: f64) -> std::result::Result<usize, E> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
        return Err(E::custom(format!(
            "expected a non-negative whole number, got {}",
            value
        )));
    }
    Ok(value as usize)
}

/// One ranked hit returned by a vector index query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchMatch {
    pub id: String,
    pub score: f32,
    pub metadata: MatchMetadata,
}

/// Reference from an answer back to the passage that grounded it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Citation {
    pub document: Option<String>,
    pub chapter: Option<String>,
    pub section: Option<String>,
    pub link: Option<String>,
}

impl Citation {
    /// Build a citation from the match metadata, falling back to the passage
    /// record for missing fields. Returns `None` when neither carries any
    /// structural information.
    pub fn resolve(primary: &SourceFields, fallback: &SourceFields) -> Option<Self> {
        let fields = primary.or(fallback);
        if fields.is_empty() {
            return None;
        }
        Some(Self {
            document: fields.document,
            chapter: fields.chapter,
            section: fields.section,
            link: fields.link,
        })
    }
}

impl fmt::Display for Citation {
    /// Renders `{document} > {chapter} > [{section}]({link})`, leaving out the
    /// parts that are missing.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::with_capacity(3);
        if let Some(document) = &self.document {
            parts.push(document.clone());
        }
        if let Some(chapter) = &self.chapter {
            parts.push(chapter.clone());
        }
        match (&self.section, &self.link) {
            (Some(section), Some(link)) => parts.push(format!("[{}]({})", section, link)),
            (Some(section), None) => parts.push(section.clone()),
            (None, Some(link)) => parts.push(format!("[{}]({})", link, link)),
            (None, None) => {}
        }
        write!(f, "{}", parts.join(" > "))
    }
}

/// Generated answer plus the citations that grounded it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub citations: Vec<Citation>,
}

impl Answer {
    /// The "no answer available" result
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Shape of the vector index, read once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub dimension: usize,
    pub vector_count: u64,
}

/// Read-only facts about the running pipeline, for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub index_name: String,
    pub vector_count: u64,
    pub dimension: usize,
    pub embedding_model: String,
    pub generation_model: String,
}
