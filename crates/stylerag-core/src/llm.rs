//! LLM provider trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::Result;

/// Configuration for a chat completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub model_id: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model_id: "gpt-3.5-turbo".to_string(),
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Result of a text generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub text: String,
    pub model_id: String,
    pub tokens_used: Option<u32>,
}

/// Trait for generative model providers
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Run one completion with a system instruction and a user message
    async fn complete(
        &self,
        system_instruction: &str,
        user_message: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult>;

    /// Get the generation model identifier
    fn model_id(&self) -> &str;
}
