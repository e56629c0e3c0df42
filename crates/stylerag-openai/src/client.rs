//! OpenAI client implementation

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::timeout;

use stylerag_core::{
    EmbeddingClient, Error, GenerationConfig, GenerationResult, LLMProvider, Result,
    normalize_input,
};

use crate::config::OpenAiConfig;

/// OpenAI client serving both embeddings and chat completions
pub struct OpenAiClient {
    config: OpenAiConfig,
    client: Client,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: Vec<String>,
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

impl OpenAiClient {
    /// Create a new OpenAI client from configuration
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Create a new OpenAI client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = OpenAiConfig::from_env()?;
        Self::new(config)
    }

    /// Set the chat model used for generation
    pub fn with_chat_model(mut self, model_id: impl Into<String>) -> Self {
        self.config.chat_model = model_id.into();
        self
    }

    /// Set the embedding model
    pub fn with_embedding_model(mut self, model_id: impl Into<String>) -> Self {
        self.config.embedding_model = model_id.into();
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Build the JSON body for an embedding request; newlines in the input become spaces
    pub(crate) fn embedding_request_body(&self, text: &str) -> Result<serde_json::Value> {
        let request = EmbeddingRequest {
            input: vec![normalize_input(text)],
            model: &self.config.embedding_model,
        };

        Ok(serde_json::to_value(&request)?)
    }

    /// Build the JSON body for a chat completion
    pub(crate) fn chat_request_body(
        &self,
        system_instruction: &str,
        user_message: &str,
        config: &GenerationConfig,
    ) -> Result<serde_json::Value> {
        let request = ChatRequest {
            model: &config.model_id,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_instruction,
                },
                ChatMessage {
                    role: "user",
                    content: user_message,
                },
            ],
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
        };

        Ok(serde_json::to_value(&request)?)
    }

    /// Turn a non-success response into the right error kind
    async fn check_status(response: Response, on_failure: fn(String) -> Error) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::Authentication(format!(
                "OpenAI rejected credentials ({}): {}",
                status, error_text
            )));
        }

        Err(on_failure(format!(
            "OpenAI API request failed with status {}: {}",
            status, error_text
        )))
    }

    async fn perform_completion(
        &self,
        system_instruction: &str,
        user_message: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        let body = self.chat_request_body(system_instruction, user_message, config)?;
        tracing::debug!(model = %config.model_id, "requesting chat completion");

        let response = self
            .client
            .post(self.endpoint("chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let response = Self::check_status(response, Error::Generation).await?;

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::Generation("Completion contained no choices".to_string()))?;

        Ok(GenerationResult {
            text: text.trim().to_string(),
            model_id: config.model_id.clone(),
            tokens_used: parsed.usage.map(|u| u.total_tokens),
        })
    }
}

/// Pull the single embedding out of an `/embeddings` response body
pub(crate) fn parse_embedding_response(body: &str) -> Result<Vec<f32>> {
    let parsed: EmbeddingResponse = serde_json::from_str(body)?;
    let vector = parsed
        .data
        .into_iter()
        .next()
        .map(|d| d.embedding)
        .ok_or_else(|| Error::Embedding("Embedding response contained no data".to_string()))?;

    if vector.is_empty() {
        return Err(Error::Embedding("Embedding vector is empty".to_string()));
    }

    Ok(vector)
}

#[async_trait]
impl EmbeddingClient for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let body = self.embedding_request_body(text)?;
        tracing::debug!(model = %self.config.embedding_model, "requesting embedding");

        let response = self
            .client
            .post(self.endpoint("embeddings"))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let response = Self::check_status(response, Error::Embedding).await?;

        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        parse_embedding_response(&body)
    }

    fn embedding_model(&self) -> &str {
        &self.config.embedding_model
    }
}

#[async_trait]
impl LLMProvider for OpenAiClient {
    async fn complete(
        &self,
        system_instruction: &str,
        user_message: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        let completion = self.perform_completion(system_instruction, user_message, config);

        match timeout(config.timeout, completion).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout("Chat completion timed out".to_string())),
        }
    }

    fn model_id(&self) -> &str {
        &self.config.chat_model
    }
}
