//! Tool contract, tool sets, and per-service tool registries.
//!
//! A tool is a named, schema-described function the model may request.
//! [`ToolSet`] exposes the static schemas (no backends needed), while
//! [`ToolRegistry`] holds live tool instances bound to a search backend and
//! is what the orchestrator dispatches against.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::tools::{HybridSearchTool, LookupTool, SearchTool, StatsTool};
use crate::embedding::EmbeddingGenerator;
use crate::search::SearchBackend;

/// A tool definition that can be sent to an LLM for function-calling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (the key the registry dispatches on).
    pub name: String,
    /// Human-readable description of what the tool does.
    pub description: String,
    /// JSON Schema object describing the tool's parameters.
    pub parameters: serde_json::Value,
}

/// A tool call requested by the LLM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this call (assigned by the provider).
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// JSON-encoded arguments for the tool.
    pub arguments: String,
}

/// The result of executing a tool.
///
/// Failures are carried as text so they flow back into the conversation
/// instead of aborting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Text handed back to the model.
    pub content: String,
    /// Rendering of the query the tool issued. Not sent to the model.
    pub query_description: String,
    /// Whether `content` describes a failure.
    pub is_error: bool,
}

impl ToolResult {
    /// Successful result.
    #[must_use]
    pub fn ok(content: impl Into<String>, query_description: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            query_description: query_description.into(),
            is_error: false,
        }
    }

    /// Failed result whose content explains the failure to the model.
    #[must_use]
    pub fn error(content: impl Into<String>, query_description: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            query_description: query_description.into(),
            is_error: true,
        }
    }
}

/// Contract implemented by every retrieval tool.
///
/// `execute` never fails: bad arguments and backend errors are reported
/// through [`ToolResult::error`].
#[async_trait]
pub trait AgenticTool: Send + Sync {
    /// Name the model uses to invoke this tool.
    fn name(&self) -> &'static str;

    /// Schema advertised to the chat backend.
    fn definition(&self) -> ToolDefinition;

    /// Runs the tool against `index_name` with the model-supplied JSON arguments.
    async fn execute(&self, arguments: &str, index_name: &str) -> ToolResult;
}

/// A set of tool schemas for one composition.
///
/// - Standard: `search_index` (keyword/semantic), `get_document`, `get_index_stats`
/// - Hybrid: `search_index` (vector + keyword), `get_document`, `get_index_stats`
#[derive(Debug, Clone, Default)]
pub struct ToolSet {
    definitions: Vec<ToolDefinition>,
}

impl ToolSet {
    /// Returns the tool definitions in this set.
    #[must_use]
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Returns `true` if this set contains no tools.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Returns the number of tools in this set.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Schemas of the standard composition.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            definitions: vec![
                SearchTool::schema(),
                LookupTool::schema(),
                StatsTool::schema(),
            ],
        }
    }

    /// Schemas of the hybrid composition.
    #[must_use]
    pub fn hybrid() -> Self {
        Self {
            definitions: vec![
                HybridSearchTool::schema(),
                LookupTool::schema(),
                StatsTool::schema(),
            ],
        }
    }
}

/// Ordered, name-keyed collection of live tools bound to one service.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn AgenticTool>>,
}

impl ToolRegistry {
    /// Builds a registry from tools in advertisement order.
    ///
    /// Names are unique within a registry: a later tool reusing an earlier
    /// tool's name is dropped.
    #[must_use]
    pub fn new(tools: Vec<Arc<dyn AgenticTool>>) -> Self {
        let mut registry = Self::default();
        for tool in tools {
            registry.register(tool);
        }
        registry
    }

    /// Adds a tool unless one with the same name is already registered.
    pub fn register(&mut self, tool: Arc<dyn AgenticTool>) {
        if self.get(tool.name()).is_some() {
            warn!(tool = tool.name(), "duplicate tool name ignored");
            return;
        }
        self.tools.push(tool);
    }

    /// Standard composition: keyword search, lookup, stats.
    #[must_use]
    pub fn standard(search: Arc<dyn SearchBackend>, semantic_configuration: &str) -> Self {
        Self::new(vec![
            Arc::new(SearchTool::new(Arc::clone(&search), semantic_configuration)),
            Arc::new(LookupTool::new(Arc::clone(&search))),
            Arc::new(StatsTool::new(search)),
        ])
    }

    /// Hybrid composition: vector + keyword search, lookup, stats.
    #[must_use]
    pub fn hybrid(
        search: Arc<dyn SearchBackend>,
        embeddings: Arc<EmbeddingGenerator>,
        semantic_configuration: &str,
    ) -> Self {
        Self::new(vec![
            Arc::new(HybridSearchTool::new(
                Arc::clone(&search),
                embeddings,
                semantic_configuration,
            )),
            Arc::new(LookupTool::new(Arc::clone(&search))),
            Arc::new(StatsTool::new(search)),
        ])
    }

    /// Looks up a tool by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn AgenticTool> {
        self.tools
            .iter()
            .find(|tool| tool.name() == name)
            .map(|tool| &**tool)
    }

    /// Schemas of every registered tool, in registration order.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|tool| tool.definition()).collect()
    }

    /// Names of every registered tool, in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|tool| tool.name()).collect()
    }

    /// Returns the number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns `true` if no tools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::testing::MockSearchBackend;

    struct Named(&'static str, &'static str);

    #[async_trait]
    impl AgenticTool for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        fn definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: self.0.to_string(),
                description: self.1.to_string(),
                parameters: serde_json::json!({"type": "object", "properties": {}}),
            }
        }

        async fn execute(&self, _arguments: &str, _index_name: &str) -> ToolResult {
            ToolResult::ok(self.1, "")
        }
    }

    #[test]
    fn test_toolset_standard_and_hybrid_share_names() {
        let standard = ToolSet::standard();
        let hybrid = ToolSet::hybrid();
        assert_eq!(standard.len(), 3);
        assert_eq!(hybrid.len(), 3);
        let names = |ts: &ToolSet| -> Vec<String> {
            ts.definitions().iter().map(|d| d.name.clone()).collect()
        };
        assert_eq!(names(&standard), names(&hybrid));
        assert_ne!(
            standard.definitions()[0].description,
            hybrid.definitions()[0].description
        );
    }

    #[test]
    fn test_all_definitions_have_valid_schemas() {
        for def in ToolSet::standard()
            .definitions()
            .iter()
            .chain(ToolSet::hybrid().definitions())
        {
            assert!(!def.name.is_empty());
            assert!(!def.description.is_empty());
            assert_eq!(def.parameters["type"], "object");
        }
    }

    #[test]
    fn test_registry_standard_composition() {
        let registry = ToolRegistry::standard(Arc::new(MockSearchBackend::default()), "default");
        assert_eq!(
            registry.names(),
            vec!["search_index", "get_document", "get_index_stats"]
        );
        assert_eq!(registry.definitions(), ToolSet::standard().definitions());
    }

    #[test]
    fn test_registry_duplicate_names_keep_first() {
        let registry = ToolRegistry::new(vec![
            Arc::new(Named("search_index", "first")),
            Arc::new(Named("search_index", "second")),
            Arc::new(Named("get_document", "lookup")),
        ]);
        assert_eq!(registry.len(), 2);
        let tool = registry.get("search_index");
        assert_eq!(
            tool.map(|t| t.definition().description),
            Some("first".to_string())
        );
    }

    #[test]
    fn test_registry_missing_tool() {
        let registry = ToolRegistry::default();
        assert!(registry.is_empty());
        assert!(registry.get("search_index").is_none());
    }

    #[test]
    fn test_tool_result_constructors() {
        let ok = ToolResult::ok("out", "desc");
        assert!(!ok.is_error);
        let err = ToolResult::error("boom", "desc");
        assert!(err.is_error);
        assert_eq!(err.content, "boom");
    }
}
