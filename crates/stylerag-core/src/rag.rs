//! Question answering engine trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Answer, Diagnostics, Result, SearchMatch};

/// What a question produced: the answer and the matches that grounded it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QaResponse {
    pub answer: Answer,
    pub matches: Vec<SearchMatch>,
}

/// Trait for retrieval-augmented question answering
///
/// Implementations run embedding, search, context assembly and generation
/// strictly in sequence. Embedding and search failures abort the request;
/// generation failures degrade to an empty answer.
#[async_trait]
pub trait QaEngine: Send + Sync {
    /// Read index statistics and prepare the engine. Called once at startup.
    async fn initialize(&mut self) -> Result<()>;

    /// Answer a question end to end
    async fn answer(&self, question: &str) -> Result<QaResponse>;

    /// Read-only facts for display
    fn diagnostics(&self) -> Option<Diagnostics>;

    /// Check if the engine is ready
    fn is_ready(&self) -> bool;
}
