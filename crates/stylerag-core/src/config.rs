//! Pipeline configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::{Error, Result};

/// Tunables for retrieval and context assembly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of nearest passages requested from the index
    pub top_k: usize,
    /// Token budget for the assembled context
    pub max_context_tokens: usize,
    /// Separator and formatting cost charged per included passage
    pub token_overhead: usize,
    /// Stop scanning once the remaining headroom falls below this
    pub early_stop_slack: usize,
    /// Placed between passages in the assembled context
    pub separator: String,
    /// Deadline for each external call
    pub request_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            max_context_tokens: 3550,
            token_overhead: 4,
            early_stop_slack: 200,
            separator: "\n\n###\n\n".to_string(),
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl PipelineConfig {
    /// Apply `STYLERAG_*` environment overrides on top of `self`
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Some(top_k) = parse_var("STYLERAG_TOP_K")? {
            self.top_k = top_k;
        }
        if let Some(max_tokens) = parse_var("STYLERAG_MAX_CONTEXT_TOKENS")? {
            self.max_context_tokens = max_tokens;
        }
        if let Some(secs) = parse_var::<u64>("STYLERAG_REQUEST_TIMEOUT_SECS")? {
            self.request_timeout = Duration::from_secs(secs);
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(Error::Configuration("top_k must be at least 1".to_string()));
        }
        if self.request_timeout.is_zero() {
            return Err(Error::Configuration(
                "request_timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::Configuration(format!("{} is not a valid value: {}", name, raw))),
        Err(_) => Ok(None),
    }
}
