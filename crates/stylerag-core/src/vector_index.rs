//! Vector index trait

use async_trait::async_trait;

use crate::{IndexStats, Result, SearchMatch};

/// Trait for nearest-neighbour indexes (Pinecone, in-memory, ...)
///
/// The index and its metadata are built elsewhere; this side only reads.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Return the `top_k` nearest passages, ranked by descending similarity,
    /// with their metadata attached.
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<SearchMatch>>;

    /// Describe dimensionality and vector count
    async fn describe_stats(&self) -> Result<IndexStats>;

    /// Name of the index, for diagnostics
    fn name(&self) -> &str;
}
