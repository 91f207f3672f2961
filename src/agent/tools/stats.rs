//! Facet statistics tool (`get_index_stats`).

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::parse_arguments;
use crate::agent::tool::{AgenticTool, ToolDefinition, ToolResult};
use crate::search::{SearchBackend, SearchRequest};

/// Tool name.
pub const NAME: &str = "get_index_stats";
/// Facet used when the model does not name one.
pub const DEFAULT_FACET: &str = "region";
/// Distinct values requested per facet.
pub const FACET_COUNT: usize = 1000;

/// Counts documents per distinct value of a field.
pub struct StatsTool {
    search: Arc<dyn SearchBackend>,
}

#[derive(Deserialize)]
struct Args {
    #[serde(default)]
    facet: Option<String>,
}

impl StatsTool {
    /// Creates the tool.
    #[must_use]
    pub fn new(search: Arc<dyn SearchBackend>) -> Self {
        Self { search }
    }

    /// Schema advertised to the model.
    #[must_use]
    pub fn schema() -> ToolDefinition {
        ToolDefinition {
            name: NAME.to_string(),
            description: "Gets statistics about the index, including counts of documents by \
                          region or asset type."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "facet": {
                        "type": "string",
                        "description": "The field to facet by (e.g., 'region', 'assettypes'). Defaults to 'region'."
                    }
                }
            }),
        }
    }
}

#[async_trait]
impl AgenticTool for StatsTool {
    fn name(&self) -> &'static str {
        NAME
    }

    fn definition(&self) -> ToolDefinition {
        Self::schema()
    }

    async fn execute(&self, arguments: &str, index_name: &str) -> ToolResult {
        let args: Args = match parse_arguments(NAME, arguments) {
            Ok(args) => args,
            Err(message) => return ToolResult::error(message, String::new()),
        };
        let facet = args.facet.unwrap_or_else(|| DEFAULT_FACET.to_string());

        let request = SearchRequest::text("*", 0).facet(format!("{facet},count:{FACET_COUNT}"));
        let description = request.describe();

        match self.search.search(index_name, &request).await {
            Ok(results) => match results.facets.get(&facet) {
                Some(values) => match serde_json::to_string(values) {
                    Ok(json) => ToolResult::ok(json, description),
                    Err(e) => ToolResult::error(format!("Error getting stats: {e}"), description),
                },
                None => ToolResult::ok(format!("No facets found for field '{facet}'."), description),
            },
            Err(e) => ToolResult::error(format!("Error getting stats: {e}"), description),
        }
    }
}
