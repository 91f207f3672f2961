//! Semantic reranked search followed by one grounded chat completion.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use super::SearchStrategy;
use crate::agent::prompt::GROUNDED_ANSWER_PROMPT;
use crate::agent::provider::LlmProvider;
use crate::agent::tools::render_hits;
use crate::error::AgentError;
use crate::search::{SearchBackend, SearchRequest};

/// Documents retrieved as context.
pub const TOP: usize = 5;
/// Returned without a chat call when the search matched nothing.
pub const NO_DOCUMENTS: &str =
    "No relevant documents found in the search index to answer your question.";

/// Handles any index whose name contains `semantic` (case-insensitive).
pub struct SemanticSearchStrategy {
    provider: Arc<dyn LlmProvider>,
    search: Arc<dyn SearchBackend>,
    semantic_configuration: String,
    system_prompt: String,
}

impl SemanticSearchStrategy {
    /// Creates the strategy with the built-in grounded-answer instruction.
    #[must_use]
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        search: Arc<dyn SearchBackend>,
        semantic_configuration: &str,
    ) -> Self {
        Self {
            provider,
            search,
            semantic_configuration: semantic_configuration.to_string(),
            system_prompt: GROUNDED_ANSWER_PROMPT.to_string(),
        }
    }

    /// Replaces the grounded-answer instruction.
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    fn missing_configuration_message(&self) -> String {
        format!(
            "Error: Semantic search failed. Please ensure the index has a semantic configuration named '{}'.",
            self.semantic_configuration
        )
    }
}

#[async_trait]
impl SearchStrategy for SemanticSearchStrategy {
    fn strategy_type(&self) -> &'static str {
        "semantic"
    }

    fn can_handle(&self, index_name: &str) -> bool {
        index_name.to_lowercase().contains("semantic")
    }

    async fn execute_search_and_chat(
        &self,
        index_name: &str,
        user_prompt: &str,
    ) -> Result<String, AgentError> {
        let request = SearchRequest::text(user_prompt, TOP).semantic(&self.semantic_configuration);

        let results = match self.search.search(index_name, &request).await {
            Ok(results) => results,
            Err(e) if e.is_missing_semantic_configuration() => {
                error!(index = index_name, error = %e, "semantic configuration error");
                return Ok(self.missing_configuration_message());
            }
            Err(e) => {
                error!(index = index_name, error = %e, "semantic search failed");
                return Err(e.into());
            }
        };

        let context = render_hits(&results.hits, false, None);
        if context.trim().is_empty() {
            return Ok(NO_DOCUMENTS.to_string());
        }
        debug!(index = index_name, documents = results.hits.len(), "answering from context");

        let full_prompt = format!("Context:\n{context}\n\nQuestion:\n{user_prompt}");
        self.provider
            .complete(&self.system_prompt, &full_prompt)
            .await
            .inspect_err(|e| error!(index = index_name, error = %e, "grounded answer failed"))
    }
}
