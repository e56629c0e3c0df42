//! Pinecone index client implementation

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

use stylerag_core::{
    Error, IndexStats, MatchMetadata, Result, SearchMatch, VectorIndex,
};

use crate::config::PineconeConfig;

/// Pinecone data-plane client bound to a single index
pub struct PineconeIndex {
    config: PineconeConfig,
    host: Url,
    client: Client,
}

#[derive(Deserialize)]
struct WhoAmIResponse {
    project_name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
    namespace: &'a str,
}

#[derive(Deserialize)]
struct QueryMatch {
    id: String,
    score: f32,
    metadata: Option<MatchMetadata>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NamespaceSummary {
    #[serde(default)]
    vector_count: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    dimension: usize,
    #[serde(default)]
    namespaces: HashMap<String, NamespaceSummary>,
    #[serde(default)]
    total_vector_count: u64,
}

impl PineconeIndex {
    /// Resolve the index host and build a client for it
    pub async fn connect(config: PineconeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        let host = match &config.host {
            Some(host) => normalize_host(host)?,
            None => {
                let environment = config.environment.as_deref().ok_or_else(|| {
                    Error::Configuration(
                        "Pinecone environment is required to resolve the index host".to_string(),
                    )
                })?;
                let project = Self::whoami(&client, &config.api_key, environment).await?;
                normalize_host(&legacy_host(&config.index_name, &project, environment))?
            }
        };

        tracing::info!(index = %config.index_name, host = %host, "connected to Pinecone index");

        Ok(Self {
            config,
            host,
            client,
        })
    }

    /// Look up the project name that prefixes legacy index hosts
    async fn whoami(client: &Client, api_key: &str, environment: &str) -> Result<String> {
        let url = format!("https://controller.{}.pinecone.io/actions/whoami", environment);

        let response = client
            .get(&url)
            .header("Api-Key", api_key)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let response = check_status(response).await?;
        let who: WhoAmIResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        Ok(who.project_name)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.host
            .join(path)
            .map_err(|e| Error::Configuration(format!("Invalid Pinecone endpoint {}: {}", path, e)))
    }

    /// The resolved data-plane host
    pub fn host(&self) -> &Url {
        &self.host
    }
}

/// Host of a legacy (pod-based) index: `{index}-{project}.svc.{environment}.pinecone.io`
pub(crate) fn legacy_host(index_name: &str, project: &str, environment: &str) -> String {
    format!("https://{}-{}.svc.{}.pinecone.io", index_name, project, environment)
}

/// Accept bare hostnames as well as full URLs
pub(crate) fn normalize_host(raw: &str) -> Result<Url> {
    let trimmed = raw.trim().trim_end_matches('/');
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    Url::parse(&with_scheme)
        .map_err(|e| Error::Configuration(format!("Invalid Pinecone host {}: {}", raw, e)))
}

async fn check_status(response: Response) -> Result<Response> {
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
            "Pinecone rejected credentials ({}): {}",
            status, error_text
        )));
    }

    Err(Error::Search(format!(
        "Pinecone request failed with status {}: {}",
        status, error_text
    )))
}

/// Decode a `/query` response, keeping Pinecone's ranking
pub(crate) fn parse_query_response(body: &str) -> Result<Vec<SearchMatch>> {
    let parsed: QueryResponse = serde_json::from_str(body)
        .map_err(|e| Error::Search(format!("Malformed query response: {}", e)))?;

    parsed
        .matches
        .into_iter()
        .map(|m| {
            let metadata = m.metadata.ok_or_else(|| {
                Error::Search(format!("Match {} was returned without metadata", m.id))
            })?;
            Ok(SearchMatch {
                id: m.id,
                score: m.score,
                metadata,
            })
        })
        .collect()
}

/// Decode a `/describe_index_stats` response.
///
/// The vector count is that of the default namespace, falling back to the
/// index total when the default namespace is absent.
pub(crate) fn parse_stats_response(body: &str) -> Result<IndexStats> {
    let parsed: StatsResponse = serde_json::from_str(body)
        .map_err(|e| Error::Search(format!("Malformed stats response: {}", e)))?;

    if parsed.dimension == 0 {
        return Err(Error::Search("Index reports zero dimensionality".to_string()));
    }

    let vector_count = parsed
        .namespaces
        .get("")
        .map(|ns| ns.vector_count)
        .unwrap_or(parsed.total_vector_count);

    Ok(IndexStats {
        dimension: parsed.dimension,
        vector_count,
    })
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<SearchMatch>> {
        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
            include_values: false,
            namespace: "",
        };

        let response = self
            .client
            .post(self.endpoint("query")?)
            .header("Api-Key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let body = check_status(response)
            .await?
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let matches = parse_query_response(&body)?;
        tracing::debug!(index = %self.config.index_name, hits = matches.len(), "query complete");
        Ok(matches)
    }

    async fn describe_stats(&self) -> Result<IndexStats> {
        let response = self
            .client
            .post(self.endpoint("describe_index_stats")?)
            .header("Api-Key", &self.config.api_key)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let body = check_status(response)
            .await?
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        parse_stats_response(&body)
    }

    fn name(&self) -> &str {
        &self.config.index_name
    }
}
