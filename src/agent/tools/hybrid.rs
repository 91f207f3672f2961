//! Hybrid search tool (`search_index`, hybrid composition).
//!
//! Vectorizes the query text, then issues one query that combines the
//! vector clause with the keyword text and semantic reranking. The tool
//! keeps the keyword tool's name so the model sees the same interface.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{NO_RESULTS, parse_arguments, render_hits};
use crate::agent::tool::{AgenticTool, ToolDefinition, ToolResult};
use crate::embedding::EmbeddingGenerator;
use crate::search::{SearchBackend, SearchRequest, VectorQuery};

/// Same name as the keyword tool.
pub const NAME: &str = super::search::NAME;
/// Nearest neighbours retrieved by the vector clause.
pub const NEIGHBORS: usize = 50;
/// Documents returned after fusion and reranking.
pub const TOP: usize = 5;
/// Vector field searched, never rendered back to the model.
pub const VECTOR_FIELD: &str = "descriptionVector";
/// Fields returned per document.
pub const SELECT_FIELDS: &[&str] = &["id", "name", "description", "assettypes", "region", "tags"];

/// Vector + keyword search with reranking.
pub struct HybridSearchTool {
    search: Arc<dyn SearchBackend>,
    embeddings: Arc<EmbeddingGenerator>,
    semantic_configuration: String,
}

#[derive(Deserialize)]
struct Args {
    query: String,
}

impl HybridSearchTool {
    /// Creates the tool.
    #[must_use]
    pub fn new(
        search: Arc<dyn SearchBackend>,
        embeddings: Arc<EmbeddingGenerator>,
        semantic_configuration: &str,
    ) -> Self {
        Self {
            search,
            embeddings,
            semantic_configuration: semantic_configuration.to_string(),
        }
    }

    /// Schema advertised to the model.
    #[must_use]
    pub fn schema() -> ToolDefinition {
        ToolDefinition {
            name: NAME.to_string(),
            description: "Searches the Azure AI Search index using Hybrid Search (Keyword + \
                          Vector). Use this to find assets based on descriptions, features, or \
                          concepts."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query string (e.g., 'compact separator for high pressure', 'pump vibration issues')."
                    }
                },
                "required": ["query"]
            }),
        }
    }

    fn request(&self, query: &str, vector: Vec<f32>) -> SearchRequest {
        SearchRequest::text(query, TOP)
            .vector(VectorQuery::new(vector, VECTOR_FIELD, NEIGHBORS))
            .semantic(&self.semantic_configuration)
            .select(SELECT_FIELDS)
    }
}

#[async_trait]
impl AgenticTool for HybridSearchTool {
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

        let description = self
            .request(&args.query, Vec::new())
            .describe_with_dimensions(self.embeddings.dimensions());

        let vector = match self.embeddings.generate(&args.query).await {
            Ok(vector) => vector,
            Err(e) => {
                return ToolResult::error(
                    format!("Error executing hybrid search: {e}"),
                    description,
                );
            }
        };

        let request = self.request(&args.query, vector);
        match self.search.search(index_name, &request).await {
            Ok(results) if results.hits.is_empty() => ToolResult::ok(NO_RESULTS, description),
            Ok(results) => ToolResult::ok(
                render_hits(&results.hits, true, Some(VECTOR_FIELD)),
                description,
            ),
            Err(e) => ToolResult::error(format!("Error executing hybrid search: {e}"), description),
        }
    }
}
