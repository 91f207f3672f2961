//! Retrieval tools exposed to the model.
//!
//! Every tool parses its own arguments and renders its own output. Failures
//! are returned as [`ToolResult::error`](super::tool::ToolResult::error)
//! text, never as `Err`.

pub mod hybrid;
pub mod lookup;
pub mod search;
pub mod stats;

pub use hybrid::HybridSearchTool;
pub use lookup::LookupTool;
pub use search::SearchTool;
pub use stats::StatsTool;

use std::fmt::Write;

use serde::de::DeserializeOwned;

use crate::search::{Document, SearchHit};

/// Maximum raw byte length of tool argument JSON from the LLM.
const MAX_TOOL_ARGS_LEN: usize = 100_000;

/// Output when a search matched nothing.
pub const NO_RESULTS: &str = "No results found.";

/// Parses model-supplied arguments, mapping failures to model-readable text.
///
/// An empty argument string is treated as `{}`.
fn parse_arguments<T: DeserializeOwned>(tool: &str, arguments: &str) -> Result<T, String> {
    if arguments.len() > MAX_TOOL_ARGS_LEN {
        return Err(format!(
            "Invalid arguments for {tool}: payload too large ({} bytes, max {MAX_TOOL_ARGS_LEN})",
            arguments.len()
        ));
    }
    let arguments = if arguments.trim().is_empty() {
        "{}"
    } else {
        arguments
    };
    serde_json::from_str(arguments).map_err(|e| format!("Invalid arguments for {tool}: {e}"))
}

/// Renders a field value without JSON quoting for plain strings.
fn render_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Appends one `--- Document ---` block of `key: value` lines.
fn render_document(out: &mut String, document: &Document, skip_field: Option<&str>) {
    for (key, value) in document {
        if skip_field == Some(key.as_str()) {
            continue;
        }
        let _ = writeln!(out, "{key}: {}", render_value(value));
    }
}

/// Flattens hits into the text block handed to the model.
///
/// With `with_scores`, each block starts with the relevance score and, when
/// present, the reranker score. `skip_field` is omitted from every document.
pub(crate) fn render_hits(hits: &[SearchHit], with_scores: bool, skip_field: Option<&str>) -> String {
    let mut out = String::new();
    for hit in hits {
        out.push_str("--- Document ---\n");
        if with_scores {
            if let Some(score) = hit.score {
                let _ = writeln!(out, "Score: {score}");
            }
            if let Some(reranker) = hit.reranker_score {
                let _ = writeln!(out, "Reranker Score: {reranker}");
            }
        }
        render_document(&mut out, &hit.document, skip_field);
        out.push('\n');
    }
    out
}
