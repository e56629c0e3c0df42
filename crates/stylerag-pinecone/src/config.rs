//! Pinecone configuration

use serde::{Deserialize, Serialize};
use std::env;
use stylerag_core::{Error, Result};

/// Configuration for the Pinecone index client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PineconeConfig {
    pub api_key: String,
    /// Deployment environment, e.g. `us-west1-gcp`. Used to resolve the host.
    pub environment: Option<String>,
    pub index_name: String,
    /// Explicit data-plane host; skips host resolution when set
    pub host: Option<String>,
}

impl PineconeConfig {
    pub const DEFAULT_INDEX: &'static str = "codestyle-semantic-search";

    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_key = env::var("PINECONE_API_KEY").map_err(|_| {
            Error::Configuration("PINECONE_API_KEY environment variable not found".to_string())
        })?;

        let environment = env::var("PINECONE_ENV").ok().filter(|v| !v.trim().is_empty());
        let host = env::var("PINECONE_HOST").ok().filter(|v| !v.trim().is_empty());

        if environment.is_none() && host.is_none() {
            return Err(Error::Configuration(
                "PINECONE_ENV or PINECONE_HOST environment variable not found".to_string(),
            ));
        }

        let index_name =
            env::var("PINECONE_INDEX").unwrap_or_else(|_| Self::DEFAULT_INDEX.to_string());

        Ok(Self {
            api_key,
            environment,
            index_name,
            host,
        })
    }

    /// Create configuration with explicit values
    pub fn new(api_key: String, environment: String) -> Self {
        Self {
            api_key,
            environment: Some(environment),
            index_name: Self::DEFAULT_INDEX.to_string(),
            host: None,
        }
    }

    /// Use a specific index
    pub fn with_index(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = index_name.into();
        self
    }

    /// Use an explicit data-plane host
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }
}
