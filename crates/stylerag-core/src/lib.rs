//! Core traits and types for stylerag
//!
//! This crate defines the capability-facing interfaces of the question answering
//! pipeline: embedding clients, vector indexes, LLM providers and the QA engine
//! itself, together with the shared data model. Provider crates implement the
//! traits; the RAG crate composes them.

pub mod config;
pub mod embedding;
pub mod error;
pub mod llm;
pub mod rag;
pub mod types;
pub mod vector_index;


pub use config::PipelineConfig;
pub use embedding::{EmbeddingClient, normalize_input};
pub use error::{Error, Result};
pub use llm::{GenerationConfig, GenerationResult, LLMProvider};
pub use rag::{QaEngine, QaResponse};
pub use types::*;
pub use vector_index::VectorIndex;
