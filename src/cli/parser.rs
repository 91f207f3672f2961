//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// agentic-search: ask questions of an Azure AI Search index through an
/// LLM that calls retrieval tools.
///
/// Backends are configured through environment variables
/// (`AZURE_OPENAI_ENDPOINT`, `AZURE_OPENAI_API_KEY`, `AZURE_SEARCH_ENDPOINT`,
/// `AZURE_SEARCH_API_KEY`, ...).
#[derive(Parser, Debug)]
#[command(name = "agentic-search")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// Directory containing prompt overrides (agent.md, grounded.md).
    #[arg(long, global = true, env = "AGENTIC_SEARCH_PROMPT_DIR")]
    pub prompt_dir: Option<PathBuf>,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask a question through the tool-calling agent.
    ///
    /// The model may search the index, fetch documents by id, and read facet
    /// counts before it answers.
    #[command(after_help = r#"Examples:
  agentic-search chat --index assets "Which pumps are in Region 1?"
  agentic-search chat --index assets-hybrid --hybrid "compact separators"
  agentic-search chat --index assets --history conv.json "and in Region 2?"
  agentic-search --format json chat --index assets "count by region" | jq '.toolsUsed'
"#)]
    Chat {
        /// Index to query.
        #[arg(short, long)]
        index: String,

        /// Use the hybrid (vector + keyword) search tool.
        #[arg(long)]
        hybrid: bool,

        /// JSON file holding the conversation; read before and written after.
        #[arg(long)]
        history: Option<PathBuf>,

        /// Maximum tool-calling turns before giving up.
        #[arg(long)]
        max_turns: Option<usize>,

        /// The question.
        question: String,
    },

    /// Single-shot answer: one semantic search, one grounded completion.
    ///
    /// The strategy is chosen from the index name; only names containing
    /// "semantic" are supported.
    #[command(after_help = r#"Examples:
  agentic-search ask --index products-semantic "Which shoe is best for trails?"
"#)]
    Ask {
        /// Index to query.
        #[arg(short, long)]
        index: String,

        /// The question.
        question: String,
    },

    /// Print the tool schemas advertised to the model.
    Tools {
        /// Show the hybrid composition instead of the standard one.
        #[arg(long)]
        hybrid: bool,
    },

    /// Prompt template operations.
    #[command(subcommand)]
    Prompts(PromptCommands),
}

/// Prompt template subcommands.
#[derive(Subcommand, Debug)]
pub enum PromptCommands {
    /// Write the default prompt templates to a directory.
    #[command(after_help = r#"Examples:
  agentic-search prompts init                  # ~/.config/agentic-search/prompts
  agentic-search prompts init --dir ./prompts  # Custom directory
  agentic-search prompts init --force          # Overwrite existing files
"#)]
    Init {
        /// Target directory (defaults to the prompt directory in use).
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Overwrite existing files.
        #[arg(short, long)]
        force: bool,
    },
}
