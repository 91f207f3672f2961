//! Agentic question answering over a search index.
//!
//! An LLM decides, turn by turn, whether to call a retrieval tool before it
//! answers. Uses a pluggable provider abstraction backed by `OpenAI` or
//! Azure `OpenAI`.
//!
//! # Architecture
//!
//! ```text
//! history → AgenticSearchService::chat
//!   ├── insert system prompt if absent
//!   └── agentic_loop (bounded by max_tool_iterations)
//!       ├── LlmProvider::chat(history, tool schemas)
//!       ├── FinalAnswer        → append, return
//!       ├── ToolCallsRequested → ToolRegistry::get(name).execute(args, index)
//!       │                         (sequential, results appended as tool messages)
//!       └── Unrecognized       → return explanation
//! ```

pub mod agentic_loop;
pub mod client;
pub mod config;
pub mod message;
pub mod orchestrator;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod tool;
pub mod tools;

// Re-export key types
pub use client::{create_embedding_generator, create_provider, create_search_backend};
pub use config::AgentConfig;
pub use message::{ChatMessage, ChatRequest, ChatResponse, ChatTurnOutcome, Role, TokenUsage};
pub use orchestrator::{AgenticChatResult, AgenticSearchService};
pub use prompt::PromptSet;
pub use provider::LlmProvider;
pub use tool::{AgenticTool, ToolCall, ToolDefinition, ToolRegistry, ToolResult, ToolSet};
