//! Retrieval-augmented question answering for stylerag
//!
//! This crate provides the passage store, the budget-constrained context
//! assembler, the answer generator and the pipeline that composes them with
//! an embedding client and a vector index.

mod context;
mod engine;
mod generator;
mod passage_store;
mod vector_index;

#[cfg(test)]
mod tests;

pub use context::{AssembledContext, ContextAssembler};
pub use engine::{PipelineStage, QaPipeline};
pub use generator::{AnswerGenerator, SYSTEM_INSTRUCTION};
pub use passage_store::PassageStore;
pub use vector_index::{IndexEntry, InMemoryIndex};

// Re-export core types for convenience
pub use stylerag_core::{
    Answer, Citation, Diagnostics, EmbeddingClient, Error, IndexStats, LLMProvider,
    PipelineConfig, QaEngine, QaResponse, Result, SearchMatch, VectorIndex,
};
