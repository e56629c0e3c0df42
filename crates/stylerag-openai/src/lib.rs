//! OpenAI integration for stylerag
//!
//! This crate provides the OpenAI implementation of the `EmbeddingClient` and
//! `LLMProvider` traits. Any server speaking the OpenAI REST dialect works by
//! pointing `OPENAI_BASE_URL` at it.

mod client;
mod config;


pub use client::OpenAiClient;
pub use config::OpenAiConfig;

// Re-export core types for convenience
pub use stylerag_core::{
    EmbeddingClient, GenerationConfig, GenerationResult, LLMProvider, Error, Result,
};
