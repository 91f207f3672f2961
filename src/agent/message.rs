//! Provider-agnostic message types for LLM communication.
//!
//! These types decouple the orchestrator from any specific LLM SDK, so the
//! same loop runs against `OpenAI`, Azure `OpenAI`, or a test double.

use serde::{Deserialize, Serialize};

use super::tool::{ToolCall, ToolDefinition};

/// Role of a chat message participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions.
    System,
    /// User input.
    User,
    /// Assistant response.
    Assistant,
    /// Tool result.
    Tool,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender.
    pub role: Role,
    /// Message content. Empty for assistant messages that only carry tool calls.
    #[serde(default)]
    pub content: String,
    /// Tool calls requested by the assistant (only for `Role::Assistant`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Tool call ID this message responds to (only for `Role::Tool`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// A chat completion request (provider-agnostic).
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Model identifier or Azure deployment name.
    pub model: String,
    /// Ordered conversation messages.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature (0.0–2.0).
    pub temperature: Option<f32>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
    /// Tool definitions available to the model.
    pub tools: Vec<ToolDefinition>,
}

/// Token usage statistics from a completion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens consumed by the prompt.
    pub prompt_tokens: u32,
    /// Tokens generated in the completion.
    pub completion_tokens: u32,
    /// Total tokens used.
    pub total_tokens: u32,
}

/// A chat completion response (provider-agnostic).
#[derive(Debug, Clone, Default)]
pub struct ChatResponse {
    /// Generated text content.
    pub content: String,
    /// Token usage statistics.
    pub usage: TokenUsage,
    /// Tool calls requested by the model.
    pub tool_calls: Vec<ToolCall>,
    /// Finish reason from the model (`"stop"`, `"tool_calls"`, `"length"`, ...).
    pub finish_reason: Option<String>,
}

/// What the model asked for on one turn.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatTurnOutcome {
    /// The model finished; the text may be empty.
    FinalAnswer(String),
    /// The model wants these tools executed before it continues.
    ToolCallsRequested(Vec<ToolCall>),
    /// Any other finish condition (length cap, content filter, ...).
    Unrecognized(String),
}

impl ChatResponse {
    /// Classifies this response for the orchestrator loop.
    ///
    /// A response that carries tool calls is treated as a tool request even
    /// when the backend omits the finish reason.
    #[must_use]
    pub fn outcome(self) -> ChatTurnOutcome {
        match self.finish_reason.as_deref() {
            Some("tool_calls") => ChatTurnOutcome::ToolCallsRequested(self.tool_calls),
            _ if !self.tool_calls.is_empty() => {
                ChatTurnOutcome::ToolCallsRequested(self.tool_calls)
            }
            Some("stop") => ChatTurnOutcome::FinalAnswer(self.content),
            Some(other) => ChatTurnOutcome::Unrecognized(other.to_string()),
            None => ChatTurnOutcome::Unrecognized("none".to_string()),
        }
    }
}

/// Creates a system message.
#[must_use]
pub fn system_message(content: &str) -> ChatMessage {
    ChatMessage {
        role: Role::System,
        content: content.to_string(),
        tool_calls: Vec::new(),
        tool_call_id: None,
    }
}

/// Creates a user message.
#[must_use]
pub fn user_message(content: &str) -> ChatMessage {
    ChatMessage {
        role: Role::User,
        content: content.to_string(),
        tool_calls: Vec::new(),
        tool_call_id: None,
    }
}

/// Creates an assistant message with text content.
#[must_use]
pub fn assistant_message(content: &str) -> ChatMessage {
    ChatMessage {
        role: Role::Assistant,
        content: content.to_string(),
        tool_calls: Vec::new(),
        tool_call_id: None,
    }
}

/// Creates an assistant message with tool calls (no text content).
#[must_use]
pub const fn assistant_tool_calls_message(tool_calls: Vec<ToolCall>) -> ChatMessage {
    ChatMessage {
        role: Role::Assistant,
        content: String::new(),
        tool_calls,
        tool_call_id: None,
    }
}

/// Creates a tool result message.
#[must_use]
pub fn tool_message(tool_call_id: &str, content: &str) -> ChatMessage {
    ChatMessage {
        role: Role::Tool,
        content: content.to_string(),
        tool_calls: Vec::new(),
        tool_call_id: Some(tool_call_id.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(id: &str) -> ToolCall {
        ToolCall {
            id: id.to_string(),
            name: "search_index".to_string(),
            arguments: r#"{"query":"pumps"}"#.to_string(),
        }
    }

    #[test]
    fn test_system_message() {
        let msg = system_message("You are helpful.");
        assert_eq!(msg.role, Role::System);
        assert_eq!(msg.content, "You are helpful.");
        assert!(msg.tool_calls.is_empty());
        assert!(msg.tool_call_id.is_none());
    }

    #[test]
    fn test_tool_message() {
        let msg = tool_message("call_123", "result data");
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.content, "result data");
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_123"));
    }

    #[test]
    fn test_assistant_tool_calls_message() {
        let msg = assistant_tool_calls_message(vec![call("call_1")]);
        assert_eq!(msg.role, Role::Assistant);
        assert!(msg.content.is_empty());
        assert_eq!(msg.tool_calls.len(), 1);
        assert_eq!(msg.tool_calls[0].name, "search_index");
    }

    #[test]
    fn test_outcome_stop_is_final_answer() {
        let response = ChatResponse {
            content: "42".to_string(),
            finish_reason: Some("stop".to_string()),
            ..ChatResponse::default()
        };
        assert_eq!(
            response.outcome(),
            ChatTurnOutcome::FinalAnswer("42".to_string())
        );
    }

    #[test]
    fn test_outcome_tool_calls() {
        let response = ChatResponse {
            tool_calls: vec![call("a"), call("b")],
            finish_reason: Some("tool_calls".to_string()),
            ..ChatResponse::default()
        };
        match response.outcome() {
            ChatTurnOutcome::ToolCallsRequested(calls) => assert_eq!(calls.len(), 2),
            other => unreachable!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_outcome_tool_calls_without_finish_reason() {
        let response = ChatResponse {
            tool_calls: vec![call("a")],
            ..ChatResponse::default()
        };
        assert!(matches!(
            response.outcome(),
            ChatTurnOutcome::ToolCallsRequested(_)
        ));
    }

    #[test]
    fn test_outcome_length_is_unrecognized() {
        let response = ChatResponse {
            content: "partial".to_string(),
            finish_reason: Some("length".to_string()),
            ..ChatResponse::default()
        };
        assert_eq!(
            response.outcome(),
            ChatTurnOutcome::Unrecognized("length".to_string())
        );
    }

    #[test]
    fn test_chat_message_serialization() {
        let msg = user_message("test");
        let json = serde_json::to_string(&msg).unwrap_or_default();
        assert!(json.contains("\"user\""));
        assert!(json.contains("\"test\""));
        // tool_calls and tool_call_id should be omitted when empty/None
        assert!(!json.contains("tool_calls"));
        assert!(!json.contains("tool_call_id"));
    }

    #[test]
    fn test_history_round_trips_through_json() {
        let history = vec![
            system_message("sys"),
            user_message("q"),
            assistant_tool_calls_message(vec![call("call_9")]),
            tool_message("call_9", "out"),
            assistant_message("answer"),
        ];
        let json = serde_json::to_string(&history).unwrap_or_default();
        let parsed: Vec<ChatMessage> = serde_json::from_str(&json).unwrap_or_default();
        assert_eq!(parsed, history);
    }
}
