//! System prompts for the tool-calling agent and the grounded-answer path.
//!
//! Prompts can be overridden per file from a prompt directory; anything
//! missing falls back to the compiled-in defaults below.

use std::path::{Path, PathBuf};

/// System prompt for the tool-calling agent.
pub const AGENT_SYSTEM_PROMPT: &str = r"You are a helpful AI assistant capable of using tools to search Azure AI Search indexes.
Your goal is to answer the user's questions accurately using the provided tools.

- If the user asks a question that requires searching for documents, use the 'search_index' tool.
- If the user asks for specific details about a known document ID, use the 'get_document' tool.
- If the user asks about the number of documents, regions, or categories, use the 'get_index_stats' tool.
- Always base your answers on the tool outputs. Do not invent facts.
- If the tool output is empty, state that no information was found.
";

/// System prompt for single-shot answers over retrieved context.
pub const GROUNDED_ANSWER_PROMPT: &str = r"You are a helpful AI assistant.
Use the provided context to answer the user's question.
If the answer is not in the context, say you don't know.
Do not invent facts.";

/// Default prompt directory under the user's home.
const DEFAULT_PROMPT_DIR: &str = ".config/agentic-search/prompts";

/// Filename for the agent prompt template.
const AGENT_FILENAME: &str = "agent.md";
/// Filename for the grounded-answer prompt template.
const GROUNDED_FILENAME: &str = "grounded.md";

/// Environment variable naming the prompt directory.
pub const PROMPT_DIR_ENV: &str = "AGENTIC_SEARCH_PROMPT_DIR";

/// The prompts used by the agent and the strategy path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSet {
    /// System prompt inserted at the head of every agent conversation.
    pub agent: String,
    /// System instruction for the single-shot grounded answer.
    pub grounded: String,
}

impl PromptSet {
    /// Loads prompts from the given directory, falling back to compiled-in defaults.
    ///
    /// Resolution order for `prompt_dir`:
    /// 1. Explicit `prompt_dir` argument
    /// 2. `AGENTIC_SEARCH_PROMPT_DIR` environment variable
    /// 3. `~/.config/agentic-search/prompts/`
    ///
    /// Each file is loaded independently; a missing file uses its default.
    #[must_use]
    pub fn load(prompt_dir: Option<&Path>) -> Self {
        let resolved_dir = prompt_dir
            .map(PathBuf::from)
            .or_else(|| std::env::var(PROMPT_DIR_ENV).ok().map(PathBuf::from))
            .or_else(Self::default_dir);

        let load_file = |filename: &str, default: &str| -> String {
            resolved_dir
                .as_ref()
                .map(|dir| dir.join(filename))
                .and_then(|path| std::fs::read_to_string(&path).ok())
                .filter(|content| !content.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            agent: load_file(AGENT_FILENAME, AGENT_SYSTEM_PROMPT),
            grounded: load_file(GROUNDED_FILENAME, GROUNDED_ANSWER_PROMPT),
        }
    }

    /// Returns compiled-in defaults without checking the filesystem.
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            agent: AGENT_SYSTEM_PROMPT.to_string(),
            grounded: GROUNDED_ANSWER_PROMPT.to_string(),
        }
    }

    /// Writes the compiled-in default prompts to the given directory.
    ///
    /// Creates the directory if it does not exist. Existing files are only
    /// replaced when `overwrite` is set.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if directory creation or file writing fails.
    pub fn write_defaults(dir: &Path, overwrite: bool) -> std::io::Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;

        let templates = [
            (AGENT_FILENAME, AGENT_SYSTEM_PROMPT),
            (GROUNDED_FILENAME, GROUNDED_ANSWER_PROMPT),
        ];

        let mut written = Vec::new();
        for (filename, content) in &templates {
            let path = dir.join(filename);
            if overwrite || !path.exists() {
                std::fs::write(&path, content)?;
                written.push(path);
            }
        }

        Ok(written)
    }

    /// Returns the default prompt directory under the user's home.
    ///
    /// Returns `None` if the home directory cannot be determined.
    #[must_use]
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(DEFAULT_PROMPT_DIR))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_not_empty() {
        assert!(!AGENT_SYSTEM_PROMPT.is_empty());
        assert!(!GROUNDED_ANSWER_PROMPT.is_empty());
    }

    #[test]
    fn test_agent_prompt_names_every_tool() {
        for tool in ["search_index", "get_document", "get_index_stats"] {
            assert!(AGENT_SYSTEM_PROMPT.contains(tool), "missing {tool}");
        }
    }

    #[test]
    fn test_load_from_empty_dir_uses_defaults() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
        assert_eq!(PromptSet::load(Some(dir.path())), PromptSet::defaults());
    }

    #[test]
    fn test_load_overrides_per_file() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
        std::fs::write(dir.path().join(AGENT_FILENAME), "custom agent")
            .unwrap_or_else(|e| panic!("write: {e}"));

        let prompts = PromptSet::load(Some(dir.path()));
        assert_eq!(prompts.agent, "custom agent");
        assert_eq!(prompts.grounded, GROUNDED_ANSWER_PROMPT);
    }

    #[test]
    fn test_write_defaults_skips_existing() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
        std::fs::write(dir.path().join(AGENT_FILENAME), "keep me")
            .unwrap_or_else(|e| panic!("write: {e}"));

        let written = PromptSet::write_defaults(dir.path(), false)
            .unwrap_or_else(|e| panic!("write_defaults: {e}"));

        assert_eq!(written, vec![dir.path().join(GROUNDED_FILENAME)]);
        let agent = std::fs::read_to_string(dir.path().join(AGENT_FILENAME))
            .unwrap_or_else(|e| panic!("read: {e}"));
        assert_eq!(agent, "keep me");
    }

    #[test]
    fn test_write_defaults_overwrite() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
        std::fs::write(dir.path().join(AGENT_FILENAME), "old")
            .unwrap_or_else(|e| panic!("write: {e}"));

        let written = PromptSet::write_defaults(dir.path(), true)
            .unwrap_or_else(|e| panic!("write_defaults: {e}"));

        assert_eq!(written.len(), 2);
        assert_eq!(PromptSet::load(Some(dir.path())), PromptSet::defaults());
    }
}
