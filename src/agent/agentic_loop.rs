//! Agentic tool-calling loop.
//!
//! Drives the LLM ↔ tool execution round-trip: sends the conversation to the
//! model, executes any tool calls in the response, appends results, and
//! repeats until the model produces a final answer, reports a finish
//! condition the loop does not understand, or the turn limit is reached.
//!
//! History is borrowed exclusively for the duration of the loop and mutated
//! in place, so everything appended before a failure remains visible to the
//! caller.

use tracing::{debug, info};

use super::message::{
    ChatMessage, ChatRequest, ChatTurnOutcome, assistant_message, assistant_tool_calls_message,
    tool_message,
};
use super::provider::LlmProvider;
use super::tool::ToolRegistry;
use crate::error::AgentError;

/// Tool message sent back when the model names a tool this registry lacks.
pub const TOOL_NOT_FOUND: &str = "Tool not found.";

/// How one run of the loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The model answered with non-empty text.
    FinalAnswer(String),
    /// The model finished without any text.
    NoContent,
    /// The model stopped for a reason other than `stop` or `tool_calls`.
    UnexpectedFinish(String),
    /// The model was still requesting tools after `max_turns` turns.
    TurnLimit(usize),
}

/// Tools dispatched so far, in request order.
///
/// Kept outside the loop's return value so partial progress survives an
/// error exit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolTrace {
    /// Every tool name the model requested, including unknown ones.
    pub tools_used: Vec<String>,
    /// `[name] description` for each tool that actually ran.
    pub tool_queries: Vec<String>,
}

/// Static inputs of one loop run.
#[derive(Debug, Clone, Copy)]
pub struct LoopSettings<'a> {
    /// Index the tools run against.
    pub index_name: &'a str,
    /// Model or deployment name.
    pub model: &'a str,
    /// Maximum model turns before giving up.
    pub max_turns: usize,
}

/// Runs the agentic loop: model → tool calls → tool results → model → …
///
/// Tool calls within one turn execute sequentially in the order the model
/// listed them. A failing tool never ends the loop; its error text becomes
/// the tool message.
///
/// # Errors
///
/// Propagates provider errors. The trace and history keep whatever was
/// recorded before the failure.
#[allow(clippy::future_not_send)]
pub async fn agentic_loop(
    provider: &dyn LlmProvider,
    registry: &ToolRegistry,
    history: &mut Vec<ChatMessage>,
    settings: LoopSettings<'_>,
    trace: &mut ToolTrace,
) -> Result<Termination, AgentError> {
    let tools = registry.definitions();

    for turn in 0..settings.max_turns {
        let request = ChatRequest {
            model: settings.model.to_string(),
            messages: history.clone(),
            temperature: None,
            max_tokens: None,
            tools: tools.clone(),
        };
        let response = provider.chat(&request).await?;

        let calls = match response.outcome() {
            ChatTurnOutcome::FinalAnswer(content) if content.trim().is_empty() => {
                debug!(turn, "model finished without content");
                return Ok(Termination::NoContent);
            }
            ChatTurnOutcome::FinalAnswer(content) => {
                debug!(turn, "agentic loop completed with final text response");
                history.push(assistant_message(&content));
                return Ok(Termination::FinalAnswer(content));
            }
            ChatTurnOutcome::Unrecognized(reason) => {
                debug!(turn, reason, "unexpected finish reason");
                return Ok(Termination::UnexpectedFinish(reason));
            }
            ChatTurnOutcome::ToolCallsRequested(calls) => calls,
        };

        debug!(turn, tool_count = calls.len(), "executing tool calls");
        history.push(assistant_tool_calls_message(calls.clone()));

        for call in &calls {
            trace.tools_used.push(call.name.clone());

            let Some(tool) = registry.get(&call.name) else {
                debug!(tool = call.name, call_id = call.id, "requested tool not registered");
                history.push(tool_message(&call.id, TOOL_NOT_FOUND));
                continue;
            };

            info!(tool = call.name, arguments = call.arguments, "executing tool");
            let result = tool.execute(&call.arguments, settings.index_name).await;
            debug!(
                tool = call.name,
                call_id = call.id,
                is_error = result.is_error,
                "tool execution complete"
            );

            trace
                .tool_queries
                .push(format!("[{}] {}", call.name, result.query_description));
            history.push(tool_message(&call.id, &result.content));
        }
    }

    debug!(max_turns = settings.max_turns, "turn limit reached");
    Ok(Termination::TurnLimit(settings.max_turns))
}
