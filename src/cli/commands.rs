//! Command implementations.
//!
//! Each command returns its rendered output; `main` prints it. Async
//! backends are driven from a per-command tokio runtime.

use std::fmt::Write as FmtWrite;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};

use crate::agent::client::{create_embedding_generator, create_provider, create_search_backend};
use crate::agent::config::AgentConfig;
use crate::agent::message::{ChatMessage, user_message};
use crate::agent::orchestrator::{AgenticChatResult, AgenticSearchService};
use crate::agent::prompt::PromptSet;
use crate::agent::tool::ToolSet;
use crate::cli::output::OutputFormat;
use crate::cli::parser::{Cli, Commands, PromptCommands};
use crate::strategy::{SemanticSearchStrategy, StrategyFactory};

/// Parameters for the `chat` command.
struct ChatParams<'a> {
    index: &'a str,
    hybrid: bool,
    history: Option<&'a Path>,
    max_turns: Option<usize>,
    question: &'a str,
    verbose: bool,
}

/// Executes the parsed command.
///
/// # Errors
///
/// Returns an error if configuration is incomplete, a backend cannot be
/// created, or a file cannot be read or written.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);
    let prompt_dir = cli.prompt_dir.as_deref();

    match &cli.command {
        Commands::Chat {
            index,
            hybrid,
            history,
            max_turns,
            question,
        } => {
            let params = ChatParams {
                index,
                hybrid: *hybrid,
                history: history.as_deref(),
                max_turns: *max_turns,
                question,
                verbose: cli.verbose,
            };
            cmd_chat(&params, prompt_dir, format)
        }
        Commands::Ask { index, question } => cmd_ask(index, question, prompt_dir, format),
        Commands::Tools { hybrid } => Ok(cmd_tools(*hybrid, format)),
        Commands::Prompts(PromptCommands::Init { dir, force }) => {
            cmd_init_prompts(dir.as_deref().or(prompt_dir), *force, format)
        }
    }
}

fn load_config(prompt_dir: Option<&Path>, max_turns: Option<usize>) -> Result<AgentConfig> {
    let mut builder = AgentConfig::builder();
    if let Some(dir) = prompt_dir {
        builder = builder.prompt_dir(dir);
    }
    if let Some(n) = max_turns {
        builder = builder.max_tool_iterations(n);
    }
    builder
        .from_env()
        .build()
        .context("Agent configuration error")
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("Failed to create async runtime")
}

/// Reads a saved conversation; a missing file is an empty conversation.
fn load_history(path: &Path) -> Result<Vec<ChatMessage>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read history file {}", path.display()))?;
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&raw)
        .with_context(|| format!("Invalid history file {}", path.display()))
}

fn save_history(path: &Path, history: &[ChatMessage]) -> Result<()> {
    let json = serde_json::to_string_pretty(history).context("Failed to serialize history")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write history file {}", path.display()))
}

fn cmd_chat(params: &ChatParams<'_>, prompt_dir: Option<&Path>, format: OutputFormat) -> Result<String> {
    let config = load_config(prompt_dir, params.max_turns)?;

    let mut history = match params.history {
        Some(path) => load_history(path)?,
        None => Vec::new(),
    };
    history.push(user_message(params.question));

    let provider = create_provider(&config).context("Provider creation failed")?;
    let search = create_search_backend(&config).context("Search client creation failed")?;
    let service = if params.hybrid {
        let embeddings =
            create_embedding_generator(&config).context("Embedding client creation failed")?;
        AgenticSearchService::hybrid(provider, search, embeddings, &config)
    } else {
        AgenticSearchService::standard(provider, search, &config)
    };

    let result = runtime()?.block_on(service.chat(params.index, &mut history));

    if let Some(path) = params.history {
        save_history(path, &history)?;
    }

    Ok(format_chat_result(&result, params.verbose, format))
}

fn format_chat_result(result: &AgenticChatResult, verbose: bool, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => format.to_json(result),
        OutputFormat::Text => {
            let mut output = result.response.clone();
            output.push('\n');
            if !result.tools_used.is_empty() {
                let _ = write!(
                    output,
                    "\n---\nTools used: {}\n",
                    result.tools_used.join(", ")
                );
                if verbose {
                    for query in &result.tool_queries {
                        let _ = writeln!(output, "{query}");
                    }
                }
            }
            output
        }
    }
}

fn cmd_ask(
    index: &str,
    question: &str,
    prompt_dir: Option<&Path>,
    format: OutputFormat,
) -> Result<String> {
    let config = load_config(prompt_dir, None)?;
    let prompts = PromptSet::load(config.prompt_dir.as_deref());

    let provider = create_provider(&config).context("Provider creation failed")?;
    let search = create_search_backend(&config).context("Search client creation failed")?;
    let semantic =
        SemanticSearchStrategy::new(provider, search, &config.semantic_configuration)
            .with_system_prompt(prompts.grounded);
    let factory = StrategyFactory::new(vec![Arc::new(semantic)]);

    let strategy = factory.get_strategy(index)?;
    let answer = runtime()?
        .block_on(strategy.execute_search_and_chat(index, question))
        .map_err(|e| anyhow!("Search failed: {e}"))?;

    Ok(match format {
        OutputFormat::Text => format!("{answer}\n"),
        OutputFormat::Json => format.to_json(&serde_json::json!({
            "index": index,
            "strategy": strategy.strategy_type(),
            "response": answer,
        })),
    })
}

fn cmd_tools(hybrid: bool, format: OutputFormat) -> String {
    let set = if hybrid {
        ToolSet::hybrid()
    } else {
        ToolSet::standard()
    };

    match format {
        OutputFormat::Json => format.to_json(&set.definitions()),
        OutputFormat::Text => {
            let mut output = String::new();
            for definition in set.definitions() {
                let _ = writeln!(output, "{}\n  {}", definition.name, definition.description);
                if let Some(properties) = definition.parameters["properties"].as_object() {
                    for (name, schema) in properties {
                        let _ = writeln!(
                            output,
                            "    {name}: {}",
                            schema["description"].as_str().unwrap_or("")
                        );
                    }
                }
            }
            output
        }
    }
}

fn cmd_init_prompts(dir: Option<&Path>, force: bool, format: OutputFormat) -> Result<String> {
    let target_dir = dir
        .map(PathBuf::from)
        .or_else(PromptSet::default_dir)
        .ok_or_else(|| anyhow!("Could not determine home directory for default prompt path"))?;

    let written = PromptSet::write_defaults(&target_dir, force)
        .context("Failed to write prompt templates")?;

    match format {
        OutputFormat::Text => {
            if written.is_empty() {
                return Ok(format!(
                    "All prompt templates already exist in: {}\n",
                    target_dir.display()
                ));
            }
            let mut output = format!(
                "Wrote {} prompt template(s) to: {}\n",
                written.len(),
                target_dir.display()
            );
            for path in &written {
                let _ = writeln!(
                    output,
                    "  {}",
                    path.file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or("unknown")
                );
            }
            output.push_str("\nEdit these files to customize the system prompts.\n");
            Ok(output)
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "directory": target_dir.to_string_lossy(),
                "written": written.iter().map(|p| p.to_string_lossy().into_owned()).collect::<Vec<_>>(),
                "count": written.len()
            });
            Ok(format.to_json(&json))
        }
    }
}
