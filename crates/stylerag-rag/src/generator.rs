//! Answer generation over an assembled context

use std::collections::HashSet;
use std::time::Duration;
use tokio::time::timeout;

use stylerag_core::{
    Answer, Citation, Error, GenerationConfig, LLMProvider, Result, SourceFields,
};

use crate::context::AssembledContext;
use crate::passage_store::PassageStore;

/// Policy given to the model as its system message
pub const SYSTEM_INSTRUCTION: &str = "You are a helpful codestyle assistant. When answering question, use following format: 1. Describe style requirements in one or two sentences, 2. Give a few examples that follow described styleguides, 3. Provide descriptions that you were able to find that clarify why such style was chosen";

/// Wraps an `LLMProvider` with the style-assistant policy.
///
/// Generation never fails from the caller's point of view: provider errors
/// and timeouts are logged and turned into an empty `Answer`.
pub struct AnswerGenerator<L: LLMProvider> {
    llm: L,
    system_instruction: String,
    config: GenerationConfig,
}

impl<L: LLMProvider> AnswerGenerator<L> {
    /// Create a generator using the provider's own model
    pub fn new(llm: L) -> Self {
        let config = GenerationConfig {
            model_id: llm.model_id().to_string(),
            ..Default::default()
        };
        Self {
            llm,
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            config,
        }
    }

    /// Deadline for a single completion
    pub fn with_timeout(mut self, deadline: Duration) -> Self {
        self.config.timeout = deadline;
        self
    }

    pub fn model_id(&self) -> &str {
        &self.config.model_id
    }

    /// The user message: retrieved context first, then the question.
    /// Without context the question goes out alone.
    pub fn build_user_message(question: &str, context: &AssembledContext) -> String {
        if context.is_empty() {
            return question.to_string();
        }
        format!("Context:\n{}\n\n---\n\nQuestion: {}", context.text, question)
    }

    /// Citations for every committed passage, in rank order, without duplicates
    pub fn citations(context: &AssembledContext, passages: &PassageStore) -> Vec<Citation> {
        let mut seen = HashSet::new();
        let empty = SourceFields::default();

        context
            .included
            .iter()
            .filter_map(|hit| {
                let fallback = passages.get(&hit.id).map_or(&empty, |p| &p.source);
                Citation::resolve(&hit.metadata.source, fallback)
            })
            .filter(|citation| seen.insert(citation.clone()))
            .collect()
    }

    /// Generate an answer, surfacing failures as `Error::Generation`
    pub async fn try_generate(
        &self,
        question: &str,
        context: &AssembledContext,
        passages: &PassageStore,
    ) -> Result<Answer> {
        let user_message = Self::build_user_message(question, context);
        let completion = self
            .llm
            .complete(&self.system_instruction, &user_message, &self.config);

        let result = match timeout(self.config.timeout, completion).await {
            Ok(result) => result.map_err(Error::into_generation)?,
            Err(_) => return Err(Error::Generation("Generation timed out".to_string())),
        };

        if result.text.trim().is_empty() {
            return Ok(Answer::empty());
        }

        Ok(Answer {
            text: result.text,
            citations: Self::citations(context, passages),
        })
    }

    /// Generate an answer; any failure degrades to an empty answer
    pub async fn generate(
        &self,
        question: &str,
        context: &AssembledContext,
        passages: &PassageStore,
    ) -> Answer {
        match self.try_generate(question, context, passages).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(error = %e, model = %self.config.model_id, "generation failed, returning empty answer");
                Answer::empty()
            }
        }
    }
}
