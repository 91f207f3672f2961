//! Point lookup tool (`get_document`).

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::parse_arguments;
use crate::agent::tool::{AgenticTool, ToolDefinition, ToolResult};
use crate::error::SearchError;
use crate::search::SearchBackend;

/// Tool name.
pub const NAME: &str = "get_document";
/// Output when the key does not exist.
pub const NOT_FOUND: &str = "Document not found.";

/// Fetches one document by its key.
pub struct LookupTool {
    search: Arc<dyn SearchBackend>,
}

#[derive(Deserialize)]
struct Args {
    id: String,
}

impl LookupTool {
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
            description: "Retrieves a specific document by its ID.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "id": {
                        "type": "string",
                        "description": "The unique identifier of the document (e.g., 'doc-001')."
                    }
                },
                "required": ["id"]
            }),
        }
    }

    fn describe(index_name: &str, id: &str) -> String {
        let query = json!({
            "operation": "GET",
            "path": format!("/indexes/{index_name}/docs/{id}"),
            "key": id,
        });
        serde_json::to_string_pretty(&query).unwrap_or_default()
    }
}

#[async_trait]
impl AgenticTool for LookupTool {
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
        let description = Self::describe(index_name, &args.id);

        match self.search.get_document(index_name, &args.id).await {
            Ok(document) => match serde_json::to_string(&document) {
                Ok(json) => ToolResult::ok(json, description),
                Err(e) => ToolResult::error(format!("Error retrieving document: {e}"), description),
            },
            Err(SearchError::NotFound { .. }) => ToolResult::error(NOT_FOUND, description),
            Err(e) => ToolResult::error(format!("Error retrieving document: {e}"), description),
        }
    }
}
