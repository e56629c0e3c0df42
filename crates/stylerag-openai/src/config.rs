//! OpenAI configuration

use serde::{Deserialize, Serialize};
use std::env;
use stylerag_core::{Error, Result};

/// Configuration for the OpenAI client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub embedding_model: String,
    pub chat_model: String,
}

impl OpenAiConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";
    pub const DEFAULT_EMBEDDING_MODEL: &'static str = "text-embedding-ada-002";
    pub const DEFAULT_CHAT_MODEL: &'static str = "gpt-3.5-turbo";

    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_key = env::var("OPENAI_API_KEY").map_err(|_| {
            Error::Configuration("OPENAI_API_KEY environment variable not found".to_string())
        })?;

        let base_url = env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_string());

        let embedding_model = env::var("OPENAI_EMBEDDING_MODEL")
            .unwrap_or_else(|_| Self::DEFAULT_EMBEDDING_MODEL.to_string());

        let chat_model = env::var("OPENAI_CHAT_MODEL")
            .unwrap_or_else(|_| Self::DEFAULT_CHAT_MODEL.to_string());

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            embedding_model,
            chat_model,
        })
    }

    /// Create configuration with explicit values
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            embedding_model: Self::DEFAULT_EMBEDDING_MODEL.to_string(),
            chat_model: Self::DEFAULT_CHAT_MODEL.to_string(),
        }
    }
}
