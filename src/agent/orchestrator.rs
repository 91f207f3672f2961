//! Agentic search service.
//!
//! Binds a chat provider to one tool composition and exposes the
//! conversation entry point. Failures inside the loop are logged and turned
//! into a user-facing message; callers never see an `Err`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::agentic_loop::{LoopSettings, Termination, ToolTrace, agentic_loop};
use super::config::AgentConfig;
use super::message::{ChatMessage, Role, system_message};
use super::prompt::PromptSet;
use super::provider::LlmProvider;
use super::tool::ToolRegistry;
use crate::embedding::EmbeddingGenerator;
use crate::search::SearchBackend;

/// Response when the model finishes without text.
pub const NO_CONTENT: &str = "No response content.";
/// Response when the loop fails.
pub const GENERIC_FAILURE: &str = "An error occurred while processing your request.";

/// Default turn cap.
const DEFAULT_MAX_TOOL_ITERATIONS: usize = 10;

/// Externally visible outcome of one [`AgenticSearchService::chat`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgenticChatResult {
    /// Final response text, or an explanation of why the loop ended.
    pub response: String,
    /// Tool names requested, in invocation order (duplicates kept).
    pub tools_used: Vec<String>,
    /// `[tool] query` descriptions for the tools that ran.
    pub tool_queries: Vec<String>,
}

impl AgenticChatResult {
    fn new(response: impl Into<String>, trace: ToolTrace) -> Self {
        Self {
            response: response.into(),
            tools_used: trace.tools_used,
            tool_queries: trace.tool_queries,
        }
    }
}

/// Multi-turn, tool-calling question answering over a search index.
pub struct AgenticSearchService {
    provider: Arc<dyn LlmProvider>,
    registry: ToolRegistry,
    model: String,
    system_prompt: String,
    max_tool_iterations: usize,
}

impl AgenticSearchService {
    /// Creates a service over an explicit tool registry.
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, registry: ToolRegistry) -> Self {
        let model = provider.default_model().to_string();
        Self {
            provider,
            registry,
            model,
            system_prompt: PromptSet::defaults().agent,
            max_tool_iterations: DEFAULT_MAX_TOOL_ITERATIONS,
        }
    }

    /// Standard composition: keyword search, lookup, stats.
    #[must_use]
    pub fn standard(
        provider: Arc<dyn LlmProvider>,
        search: Arc<dyn SearchBackend>,
        config: &AgentConfig,
    ) -> Self {
        let registry = ToolRegistry::standard(search, &config.semantic_configuration);
        Self::new(provider, registry).configured(config)
    }

    /// Hybrid composition: vector + keyword search, lookup, stats.
    #[must_use]
    pub fn hybrid(
        provider: Arc<dyn LlmProvider>,
        search: Arc<dyn SearchBackend>,
        embeddings: Arc<EmbeddingGenerator>,
        config: &AgentConfig,
    ) -> Self {
        let registry =
            ToolRegistry::hybrid(search, embeddings, &config.semantic_configuration);
        Self::new(provider, registry).configured(config)
    }

    fn configured(self, config: &AgentConfig) -> Self {
        let prompts = PromptSet::load(config.prompt_dir.as_deref());
        self.with_model(&config.chat_model)
            .with_system_prompt(prompts.agent)
            .with_max_tool_iterations(config.max_tool_iterations)
    }

    /// Overrides the model / deployment name.
    #[must_use]
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Overrides the system prompt inserted into new conversations.
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Overrides the turn cap. Zero is raised to one.
    #[must_use]
    pub fn with_max_tool_iterations(mut self, n: usize) -> Self {
        self.max_tool_iterations = n.max(1);
        self
    }

    /// Tool registry bound to this service.
    #[must_use]
    pub const fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Answers the latest user message in `history`.
    ///
    /// Inserts the system prompt at the front when the history has none,
    /// then runs the tool-calling loop. The history is extended in place with
    /// every assistant and tool message, so the caller can resupply it on
    /// the next call.
    #[allow(clippy::future_not_send)]
    pub async fn chat(&self, index_name: &str, history: &mut Vec<ChatMessage>) -> AgenticChatResult {
        if !history.iter().any(|m| m.role == Role::System) {
            history.insert(0, system_message(&self.system_prompt));
        }

        let settings = LoopSettings {
            index_name,
            model: &self.model,
            max_turns: self.max_tool_iterations,
        };
        let mut trace = ToolTrace::default();

        info!(
            index = index_name,
            provider = self.provider.name(),
            tools = ?self.registry.names(),
            "starting agentic chat"
        );

        match agentic_loop(
            self.provider.as_ref(),
            &self.registry,
            history,
            settings,
            &mut trace,
        )
        .await
        {
            Ok(Termination::FinalAnswer(text)) => AgenticChatResult::new(text, trace),
            Ok(Termination::NoContent) => AgenticChatResult::new(NO_CONTENT, trace),
            Ok(Termination::UnexpectedFinish(reason)) => {
                AgenticChatResult::new(format!("Unexpected finish reason: {reason}"), trace)
            }
            Ok(Termination::TurnLimit(turns)) => AgenticChatResult::new(
                format!(
                    "Stopped after {turns} tool-calling turns without a final answer. \
                     Try a more specific question."
                ),
                trace,
            ),
            Err(e) => {
                error!(index = index_name, error = %e, "agentic chat failed");
                AgenticChatResult::new(GENERIC_FAILURE, trace)
            }
        }
    }
}

impl std::fmt::Debug for AgenticSearchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgenticSearchService")
            .field("provider", &self.provider.name())
            .field("registry", &self.registry)
            .field("model", &self.model)
            .field("max_tool_iterations", &self.max_tool_iterations)
            .finish_non_exhaustive()
    }
}
