//! Embedding client trait

use async_trait::async_trait;

use crate::Result;

/// Collapse newlines to single spaces before embedding.
///
/// Newlines degrade embedding quality for the ada model family, so every
/// `EmbeddingClient` implementation runs its input through this first.
pub fn normalize_input(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

/// Trait for services that turn free text into a fixed-length vector
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Embed `text` after normalizing it with [`normalize_input`]
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Get the embedding model identifier
    fn embedding_model(&self) -> &str;
}
