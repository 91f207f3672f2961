//! Pluggable LLM provider trait.
//!
//! Implementations translate provider-agnostic [`ChatRequest`]/[`ChatResponse`]
//! into provider-specific SDK calls. This keeps the orchestrator and the
//! strategies decoupled from any particular LLM vendor.

use async_trait::async_trait;

use super::message::{ChatRequest, ChatResponse, system_message, user_message};
use crate::error::AgentError;

/// Trait for LLM provider backends.
///
/// Implementations handle the transport layer (HTTP, SDK calls) for a
/// specific provider while presenting a uniform interface.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g., `"openai"`, `"azure"`).
    fn name(&self) -> &'static str;

    /// Model or deployment used when a caller does not name one.
    fn default_model(&self) -> &str;

    /// Executes a chat completion request.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on API failures, timeouts, or parse errors.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError>;

    /// One-shot completion: a system instruction plus one user message, no tools.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on API failures.
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, AgentError> {
        let request = ChatRequest {
            model: self.default_model().to_string(),
            messages: vec![system_message(system_prompt), user_message(user_prompt)],
            temperature: None,
            max_tokens: None,
            tools: Vec::new(),
        };
        Ok(self.chat(&request).await?.content)
    }
}
