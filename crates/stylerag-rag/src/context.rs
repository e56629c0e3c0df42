//! Budget-constrained context assembly

use serde::Serialize;

use stylerag_core::{PipelineConfig, SearchMatch};

use crate::passage_store::PassageStore;

/// Prompt context built from the highest ranked passages that fit the budget
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssembledContext {
    /// Committed passage texts joined by the separator
    pub text: String,
    /// Matches whose passages were committed, in rank order
    pub included: Vec<SearchMatch>,
    /// Sum of `token_count + overhead` over the committed passages
    pub token_weight: usize,
    /// How many matches were looked at before the scan ended
    pub evaluated: usize,
    /// Whether the scan ended on the slack threshold rather than exhaustion
    pub stopped_early: bool,
}

impl AssembledContext {
    /// An empty context means the answer will be ungrounded. Not an error.
    pub fn is_empty(&self) -> bool {
        self.included.is_empty()
    }
}

/// Greedy, rank-ordered selection of passages under a token budget.
///
/// Each match costs its token count plus a fixed overhead. A match is
/// committed only while the running total stays strictly below the budget.
/// When a match does not fit and less than `early_stop_slack` tokens of
/// headroom remain, scanning stops even if a later, smaller match would fit.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextAssembler {
    token_overhead: usize,
    early_stop_slack: usize,
    separator: String,
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

impl ContextAssembler {
    pub fn new(token_overhead: usize, early_stop_slack: usize, separator: impl Into<String>) -> Self {
        Self {
            token_overhead,
            early_stop_slack,
            separator: separator.into(),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.token_overhead, config.early_stop_slack, config.separator.clone())
    }

    /// Select passages for `matches` (ranked by descending similarity) until
    /// the budget `max_length` is used up or the early-stop rule fires.
    pub fn assemble(
        &self,
        matches: &[SearchMatch],
        passages: &PassageStore,
        max_length: usize,
    ) -> AssembledContext {
        let mut cur_len = 0usize;
        let mut texts: Vec<&str> = Vec::new();
        let mut included = Vec::new();
        let mut evaluated = 0;
        let mut stopped_early = false;

        for hit in matches {
            evaluated += 1;

            let Some(passage) = passages.get(&hit.id) else {
                tracing::warn!(id = %hit.id, "match has no passage in the store, skipping");
                continue;
            };

            let weight = hit.metadata.token_count.saturating_add(self.token_overhead);
            // Tentative add; leaving cur_len untouched is the rollback.
            let tentative = cur_len.saturating_add(weight);

            if tentative < max_length {
                cur_len = tentative;
                texts.push(passage.text.as_str());
                included.push(hit.clone());
                continue;
            }

            if max_length.saturating_sub(cur_len) < self.early_stop_slack {
                stopped_early = true;
                break;
            }
        }

        tracing::debug!(
            committed = included.len(),
            evaluated,
            token_weight = cur_len,
            max_length,
            stopped_early,
            "context assembled"
        );

        AssembledContext {
            text: texts.join(self.separator.as_str()),
            included,
            token_weight: cur_len,
            evaluated,
            stopped_early,
        }
    }
}
