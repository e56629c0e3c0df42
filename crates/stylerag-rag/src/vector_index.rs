//! In-memory vector index

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::Path;

use stylerag_core::{Error, IndexStats, MatchMetadata, Result, SearchMatch, VectorIndex};

/// A stored vector with the metadata returned alongside it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: MatchMetadata,
}

/// Exact cosine-similarity index held in memory.
///
/// Filled once (from a snapshot or by `insert`) and only read afterwards.
pub struct InMemoryIndex {
    name: String,
    dimension: usize,
    entries: Vec<IndexEntry>,
}

impl InMemoryIndex {
    /// Create an empty index for vectors of `dimension` components
    pub fn new(name: impl Into<String>, dimension: usize) -> Self {
        Self {
            name: name.into(),
            dimension,
            entries: Vec::new(),
        }
    }

    /// Add a vector, rejecting ones of the wrong dimensionality
    pub fn insert(&mut self, entry: IndexEntry) -> Result<()> {
        if entry.values.len() != self.dimension {
            return Err(Error::Search(format!(
                "Vector {} has {} dimensions, index expects {}",
                entry.id,
                entry.values.len(),
                self.dimension
            )));
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Build an index from a JSON array of `{id, values, metadata}` records
    pub fn from_json_str(name: impl Into<String>, raw: &str) -> Result<Self> {
        let entries: Vec<IndexEntry> = serde_json::from_str(raw)
            .map_err(|e| Error::Search(format!("Invalid index snapshot: {}", e)))?;

        let dimension = entries
            .first()
            .map(|e| e.values.len())
            .filter(|d| *d > 0)
            .ok_or_else(|| Error::Search("Index snapshot has no vectors".to_string()))?;

        let mut index = Self::new(name, dimension);
        for entry in entries {
            index.insert(entry)?;
        }
        Ok(index)
    }

    /// Load a snapshot file; the index is named after the file stem
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Search(format!("Cannot read {}: {}", path.display(), e)))?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "local".to_string());

        let index = Self::from_json_str(name, &raw)?;
        tracing::info!(path = %path.display(), vectors = index.len(), "loaded index snapshot");
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot_product / (norm_a * norm_b)
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<SearchMatch>> {
        if vector.len() != self.dimension {
            return Err(Error::Search(format!(
                "Query vector has {} dimensions, index expects {}",
                vector.len(),
                self.dimension
            )));
        }

        let mut results: Vec<SearchMatch> = self
            .entries
            .iter()
            .map(|entry| SearchMatch {
                id: entry.id.clone(),
                score: Self::cosine_similarity(vector, &entry.values),
                metadata: entry.metadata.clone(),
            })
            .collect();

        // Ties break on id so repeated queries rank identically.
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        results.truncate(top_k);

        Ok(results)
    }

    async fn describe_stats(&self) -> Result<IndexStats> {
        Ok(IndexStats {
            dimension: self.dimension,
            vector_count: self.entries.len() as u64,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use stylerag_core::SourceFields;

    fn entry(id: &str, values: Vec<f32>) -> IndexEntry {
        IndexEntry {
            id: id.to_string(),
            values,
            metadata: MatchMetadata {
                token_count: 10,
                source: SourceFields::default(),
            },
        }
    }

    #[tokio::test]
    async fn test_query_ranks_by_cosine_similarity() {
        let mut index = InMemoryIndex::new("local", 2);
        index.insert(entry("east", vec![1.0, 0.0])).unwrap();
        index.insert(entry("north", vec![0.0, 1.0])).unwrap();
        index.insert(entry("northeast", vec![1.0, 1.0])).unwrap();

        let results = index.query(&[1.0, 0.1], 2).await.unwrap();
        let ids: Vec<&str> = results.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["east", "northeast"]);
        assert!(results[0].score >= results[1].score);

        let stats = index.describe_stats().await.unwrap();
        assert_eq!(stats, IndexStats { dimension: 2, vector_count: 3 });
    }

    #[tokio::test]
    async fn test_dimension_checks() {
        let mut index = InMemoryIndex::new("local", 2);
        assert!(index.insert(entry("bad", vec![1.0])).is_err());
        assert!(matches!(index.query(&[1.0, 0.0, 0.0], 5).await, Err(Error::Search(_))));
    }

    #[tokio::test]
    async fn test_load_snapshot() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[
                {{"id": "a", "values": [0.5, 0.5], "metadata": {{"n_tokens": 12.0, "document": "pep8"}}}},
                {{"id": "b", "values": [0.1, 0.9], "metadata": {{"token_count": 30}}}}
            ]"#
        )
        .unwrap();

        let index = InMemoryIndex::load(file.path()).unwrap();
        assert_eq!(index.len(), 2);

        let results = index.query(&[0.5, 0.5], 1).await.unwrap();
        assert_eq!(results[0].id, "a");
        assert_eq!(results[0].metadata.token_count, 12);
    }

    #[test]
    fn test_empty_snapshot_is_rejected() {
        assert!(InMemoryIndex::from_json_str("local", "[]").is_err());
    }
}
