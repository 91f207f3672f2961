//! Keyword search tool (`search_index`, standard composition).

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{NO_RESULTS, parse_arguments, render_hits};
use crate::agent::tool::{AgenticTool, ToolDefinition, ToolResult};
use crate::search::{SearchBackend, SearchRequest};

/// Tool name shared with [`HybridSearchTool`](super::HybridSearchTool).
pub const NAME: &str = "search_index";
/// Documents returned per query.
pub const TOP: usize = 5;

/// Semantic-ranked text search over the caller's index.
pub struct SearchTool {
    search: Arc<dyn SearchBackend>,
    semantic_configuration: String,
}

#[derive(Deserialize)]
struct Args {
    query: String,
}

impl SearchTool {
    /// Creates the tool over `search`, reranking with `semantic_configuration`.
    #[must_use]
    pub fn new(search: Arc<dyn SearchBackend>, semantic_configuration: &str) -> Self {
        Self {
            search,
            semantic_configuration: semantic_configuration.to_string(),
        }
    }

    /// Schema advertised to the model.
    #[must_use]
    pub fn schema() -> ToolDefinition {
        ToolDefinition {
            name: NAME.to_string(),
            description: "Searches the Azure AI Search index for relevant documents using \
                          semantic search."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query string (e.g., 'battery maintenance', 'compressor failure')."
                    }
                },
                "required": ["query"]
            }),
        }
    }
}

#[async_trait]
impl AgenticTool for SearchTool {
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

        let request = SearchRequest::text(&args.query, TOP).semantic(&self.semantic_configuration);
        let description = request.describe();

        match self.search.search(index_name, &request).await {
            Ok(results) if results.hits.is_empty() => ToolResult::ok(NO_RESULTS, description),
            Ok(results) => ToolResult::ok(render_hits(&results.hits, false, None), description),
            Err(e) => ToolResult::error(format!("Error executing search: {e}"), description),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchHit;
    use crate::search::testing::{MockSearchBackend, document};

    #[tokio::test]
    async fn test_search_renders_documents() {
        let backend = Arc::new(MockSearchBackend::with_hits(vec![SearchHit {
            score: Some(3.2),
            reranker_score: Some(2.1),
            document: document(&[("id", json!("asset-7")), ("name", json!("Compressor"))]),
        }]));
        let tool = SearchTool::new(backend.clone(), "default");

        let result = tool.execute(r#"{"query":"compressor"}"#, "assets-semantic").await;

        assert!(!result.is_error);
        assert_eq!(result.content, "--- Document ---\nid: asset-7\nname: Compressor\n\n");
        let recorded = backend.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].0, "assets-semantic");
        assert_eq!(recorded[0].1.top, 5);
        assert_eq!(recorded[0].1.semantic_configuration.as_deref(), Some("default"));
    }

    #[tokio::test]
    async fn test_search_no_results() {
        let tool = SearchTool::new(Arc::new(MockSearchBackend::default()), "default");
        let result = tool.execute(r#"{"query":"nothing"}"#, "idx").await;
        assert_eq!(result.content, "No results found.");
        assert!(!result.is_error);
    }

    #[tokio::test]
    async fn test_search_backend_error_is_soft() {
        let tool = SearchTool::new(Arc::new(MockSearchBackend::failing(503, "busy")), "default");
        let result = tool.execute(r#"{"query":"pumps"}"#, "idx").await;
        assert!(result.is_error);
        assert!(result.content.starts_with("Error executing search:"));
        assert!(result.content.contains("busy"));
        assert!(result.query_description.contains("\"search\": \"pumps\""));
    }

    #[tokio::test]
    async fn test_search_bad_arguments_are_soft() {
        let backend = Arc::new(MockSearchBackend::default());
        let tool = SearchTool::new(backend.clone(), "default");
        let result = tool.execute("not json", "idx").await;
        assert!(result.is_error);
        assert!(result.content.starts_with("Invalid arguments for search_index"));
        assert!(backend.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_query_description_independent_of_results() {
        let empty = SearchTool::new(Arc::new(MockSearchBackend::default()), "default");
        let failing = SearchTool::new(Arc::new(MockSearchBackend::failing(500, "x")), "default");
        let a = empty.execute(r#"{"query":"q"}"#, "idx").await;
        let b = failing.execute(r#"{"query":"q"}"#, "idx").await;
        assert_eq!(a.query_description, b.query_description);
        assert!(a.query_description.contains("\"top\": 5"));
        assert!(a.query_description.contains("\"queryType\": \"semantic\""));
    }
}
