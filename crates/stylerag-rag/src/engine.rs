//! Question answering pipeline

use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use stylerag_core::{
    Diagnostics, EmbeddingClient, Error, IndexStats, LLMProvider, PipelineConfig, QaEngine,
    QaResponse, Result, VectorIndex,
};

use crate::context::ContextAssembler;
use crate::generator::AnswerGenerator;
use crate::passage_store::PassageStore;

/// Where a request is in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    Embedding,
    Searching,
    Assembling,
    Generating,
    Done,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Idle => "IDLE",
            PipelineStage::Embedding => "EMBEDDING",
            PipelineStage::Searching => "SEARCHING",
            PipelineStage::Assembling => "ASSEMBLING",
            PipelineStage::Generating => "GENERATING",
            PipelineStage::Done => "DONE",
            PipelineStage::Failed => "FAILED",
        };
        write!(f, "{}", name)
    }
}

/// Retrieval-augmented QA over a pre-built index and passage store.
///
/// Clients and the passage store are created once at startup and only read
/// afterwards. Stages run strictly one after another; nothing is retried.
pub struct QaPipeline<E: EmbeddingClient, V: VectorIndex, L: LLMProvider> {
    embedder: Arc<E>,
    index: Arc<V>,
    passages: Arc<PassageStore>,
    assembler: ContextAssembler,
    generator: AnswerGenerator<L>,
    config: PipelineConfig,
    stats: Option<IndexStats>,
}

impl<E: EmbeddingClient, V: VectorIndex, L: LLMProvider> QaPipeline<E, V, L> {
    /// Create a new pipeline; call `initialize` before answering
    pub fn new(
        embedder: Arc<E>,
        index: Arc<V>,
        passages: Arc<PassageStore>,
        llm: L,
        config: PipelineConfig,
    ) -> Self {
        let generator = AnswerGenerator::new(llm).with_timeout(config.request_timeout);
        Self {
            embedder,
            index,
            passages,
            assembler: ContextAssembler::from_config(&config),
            generator,
            config,
            stats: None,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn index(&self) -> &V {
        &self.index
    }

    /// Index statistics cached by `initialize`
    pub fn index_stats(&self) -> Option<IndexStats> {
        self.stats
    }

    fn enter(&self, stage: PipelineStage) {
        tracing::debug!(stage = %stage, "pipeline stage");
    }

    fn fail(&self, stage: PipelineStage, err: Error) -> Error {
        tracing::warn!(stage = %stage, error = %err, "request failed, pipeline is {}", PipelineStage::Failed);
        err
    }

    async fn run_embedding(&self, question: &str) -> Result<Vec<f32>> {
        let vector = with_deadline(
            self.config.request_timeout,
            "Embedding request",
            self.embedder.embed(question),
        )
        .await
        .map_err(Error::into_embedding)?;

        if let Some(stats) = self.stats {
            if vector.len() != stats.dimension {
                return Err(Error::Embedding(format!(
                    "Embedding has {} dimensions but the index expects {}",
                    vector.len(),
                    stats.dimension
                )));
            }
        }

        Ok(vector)
    }
}

/// Run `future` under a deadline, mapping expiry to `Error::Timeout`
async fn with_deadline<T>(
    deadline: Duration,
    what: &str,
    future: impl Future<Output = Result<T>>,
) -> Result<T> {
    match timeout(deadline, future).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout(format!("{} exceeded {:?}", what, deadline))),
    }
}

#[async_trait]
impl<E, V, L> QaEngine for QaPipeline<E, V, L>
where
    E: EmbeddingClient + 'static,
    V: VectorIndex + 'static,
    L: LLMProvider + 'static,
{
    async fn initialize(&mut self) -> Result<()> {
        let stats = with_deadline(
            self.config.request_timeout,
            "Index stats request",
            self.index.describe_stats(),
        )
        .await
        .map_err(Error::into_search)?;

        tracing::info!(
            index = %self.index.name(),
            dimension = stats.dimension,
            vectors = stats.vector_count,
            passages = self.passages.len(),
            "QA pipeline ready"
        );

        self.stats = Some(stats);
        Ok(())
    }

    async fn answer(&self, question: &str) -> Result<QaResponse> {
        if !self.is_ready() {
            return Err(Error::Other("QA pipeline not initialized".to_string()));
        }

        self.enter(PipelineStage::Idle);
        if question.trim().is_empty() {
            return Err(Error::InvalidInput("Question is empty".to_string()));
        }

        self.enter(PipelineStage::Embedding);
        let vector = self
            .run_embedding(question)
            .await
            .map_err(|e| self.fail(PipelineStage::Embedding, e))?;

        self.enter(PipelineStage::Searching);
        let matches = with_deadline(
            self.config.request_timeout,
            "Index query",
            self.index.query(&vector, self.config.top_k),
        )
        .await
        .map_err(|e| self.fail(PipelineStage::Searching, e.into_search()))?;

        self.enter(PipelineStage::Assembling);
        let context = self
            .assembler
            .assemble(&matches, &self.passages, self.config.max_context_tokens);
        if context.is_empty() {
            tracing::info!(matches = matches.len(), "no passage fit the budget, answering ungrounded");
        }
        tracing::debug!(context = %context.text, "assembled context");

        self.enter(PipelineStage::Generating);
        let answer = self.generator.generate(question, &context, &self.passages).await;

        self.enter(PipelineStage::Done);
        Ok(QaResponse {
            answer,
            matches: context.included,
        })
    }

    fn diagnostics(&self) -> Option<Diagnostics> {
        self.stats.map(|stats| Diagnostics {
            index_name: self.index.name().to_string(),
            vector_count: stats.vector_count,
            dimension: stats.dimension,
            embedding_model: self.embedder.embedding_model().to_string(),
            generation_model: self.generator.model_id().to_string(),
        })
    }

    fn is_ready(&self) -> bool {
        self.stats.is_some()
    }
}
