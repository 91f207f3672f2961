//! # agentic-search
//!
//! Agentic question answering over Azure AI Search indexes.
//!
//! An LLM decides, turn by turn, whether to call a retrieval tool (keyword
//! or hybrid search, document lookup, facet statistics) before it answers.
//! A second, single-shot path picks a search strategy from the index name
//! and answers from one round of retrieved context.
//!
//! ## Modules
//!
//! - [`agent`]: message types, tool contract and registry, retrieval tools,
//!   the tool-calling loop, and the chat provider
//! - [`search`]: search backend trait and the Azure AI Search REST client
//! - [`embedding`]: embedding backend with rate-limit retry
//! - [`strategy`]: index-name based strategy selection
//! - [`cli`]: command-line interface
//! - [`error`]: error types

pub mod agent;
pub mod cli;
pub mod embedding;
pub mod error;
pub mod search;
pub mod strategy;

pub use agent::{AgentConfig, AgenticChatResult, AgenticSearchService, ChatMessage, LlmProvider};
pub use error::{AgentError, EmbeddingError, SearchError};
pub use strategy::{SearchStrategy, StrategyFactory};
