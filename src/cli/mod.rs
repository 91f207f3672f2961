//! CLI layer for agentic-search.
//!
//! Provides the command-line interface using clap, with commands for the
//! agentic chat, the single-shot strategy path, and prompt scaffolding.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands, PromptCommands};
