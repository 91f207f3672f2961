//! Search backend abstraction.
//!
//! The tools and the semantic strategy talk to the search service through
//! [`SearchBackend`]. [`SearchRequest`] mirrors the Azure AI Search query
//! body so the same value is both sent over the wire and rendered into the
//! human-readable query descriptions shown alongside answers.

pub mod azure;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SearchError;

pub use azure::AzureSearchClient;

/// A document as returned by the search service: field name to value.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Query type understood by the search service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    /// Plain lexical (BM25) ranking.
    Simple,
    /// Lexical retrieval with semantic reranking.
    Semantic,
}

/// A k-nearest-neighbour vector clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorQuery {
    /// Always `"vector"` for pre-computed embeddings.
    pub kind: String,
    /// Query embedding.
    pub vector: Vec<f32>,
    /// Vector field(s) to search, comma-separated.
    pub fields: String,
    /// Number of nearest neighbours to retrieve before fusion.
    pub k: usize,
}

impl VectorQuery {
    /// Builds a vector clause over `field` retrieving `k` neighbours.
    #[must_use]
    pub fn new(vector: Vec<f32>, field: &str, k: usize) -> Self {
        Self {
            kind: "vector".to_string(),
            vector,
            fields: field.to_string(),
            k,
        }
    }
}

/// Body of a search query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Search text; `"*"` matches everything.
    pub search: String,
    /// Ranking mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_type: Option<QueryType>,
    /// Semantic configuration used for reranking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_configuration: Option<String>,
    /// Maximum number of documents to return.
    pub top: usize,
    /// Comma-separated list of fields to return.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select: Option<String>,
    /// Vector clauses for hybrid retrieval.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vector_queries: Vec<VectorQuery>,
    /// Facet expressions such as `"region,count:1000"`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub facets: Vec<String>,
}

impl SearchRequest {
    /// Text query returning the top `top` documents.
    #[must_use]
    pub fn text(search: &str, top: usize) -> Self {
        Self {
            search: search.to_string(),
            query_type: None,
            semantic_configuration: None,
            top,
            select: None,
            vector_queries: Vec::new(),
            facets: Vec::new(),
        }
    }

    /// Enables semantic reranking with the named configuration.
    #[must_use]
    pub fn semantic(mut self, configuration: &str) -> Self {
        self.query_type = Some(QueryType::Semantic);
        self.semantic_configuration = Some(configuration.to_string());
        self
    }

    /// Restricts the returned fields.
    #[must_use]
    pub fn select(mut self, fields: &[&str]) -> Self {
        self.select = Some(fields.join(", "));
        self
    }

    /// Adds a vector clause.
    #[must_use]
    pub fn vector(mut self, query: VectorQuery) -> Self {
        self.vector_queries.push(query);
        self
    }

    /// Adds a facet expression.
    #[must_use]
    pub fn facet(mut self, expression: String) -> Self {
        self.facets.push(expression);
        self
    }

    /// Pretty JSON rendering of this query with embeddings replaced by a
    /// `[...N dimensions...]` placeholder, N being each vector's length.
    #[must_use]
    pub fn describe(&self) -> String {
        self.render(None)
    }

    /// Like [`describe`](Self::describe) but with a fixed N, so a query can
    /// be described before its embedding exists.
    #[must_use]
    pub fn describe_with_dimensions(&self, dimensions: usize) -> String {
        self.render(Some(dimensions))
    }

    fn render(&self, dimensions: Option<usize>) -> String {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(queries) = value
            .get_mut("vectorQueries")
            .and_then(serde_json::Value::as_array_mut)
        {
            for (query, original) in queries.iter_mut().zip(&self.vector_queries) {
                let n = dimensions.unwrap_or(original.vector.len());
                query["vector"] = serde_json::Value::String(format!("[...{n} dimensions...]"));
            }
        }
        serde_json::to_string_pretty(&value).unwrap_or_default()
    }
}

/// One matching document with its ranking scores.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchHit {
    /// Relevance score from the primary ranker.
    pub score: Option<f64>,
    /// Semantic reranker score, present only when reranking succeeded.
    pub reranker_score: Option<f64>,
    /// Document fields, without `@search.*` metadata.
    pub document: Document,
}

/// One distinct facet value and the number of documents carrying it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetValue {
    /// The facet value.
    #[serde(default)]
    pub value: serde_json::Value,
    /// Number of matching documents.
    pub count: u64,
}

/// Result of a search query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    /// Matching documents in rank order.
    pub hits: Vec<SearchHit>,
    /// Facet counts keyed by field name.
    pub facets: HashMap<String, Vec<FacetValue>>,
}

/// Operations the core needs from a search service.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Runs a query against `index`.
    async fn search(&self, index: &str, request: &SearchRequest)
    -> Result<SearchResults, SearchError>;

    /// Fetches one document by key.
    ///
    /// Returns [`SearchError::NotFound`] when the key does not exist.
    async fn get_document(&self, index: &str, key: &str) -> Result<Document, SearchError>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_camel_case() {
        let request = SearchRequest::text("pumps", 5)
            .semantic("default")
            .facet("region,count:1000".to_string());
        let json = serde_json::to_value(&request).unwrap_or_default();
        assert_eq!(json["queryType"], "semantic");
        assert_eq!(json["semanticConfiguration"], "default");
        assert_eq!(json["top"], 5);
        assert_eq!(json["facets"][0], "region,count:1000");
        assert!(json.get("vectorQueries").is_none());
        assert!(json.get("select").is_none());
    }

    #[test]
    fn test_describe_hides_vector_values() {
        let request = SearchRequest::text("compact separator", 5)
            .vector(VectorQuery::new(vec![0.25; 1536], "descriptionVector", 50));
        let described = request.describe();
        assert!(described.contains("[...1536 dimensions...]"));
        assert!(described.contains("descriptionVector"));
        assert!(!described.contains("0.25"));
    }

    #[test]
    fn test_describe_with_fixed_dimensions() {
        let request = SearchRequest::text("q", 5)
            .vector(VectorQuery::new(Vec::new(), "descriptionVector", 50));
        assert!(request
            .describe_with_dimensions(1536)
            .contains("[...1536 dimensions...]"));
    }

    #[test]
    fn test_describe_is_deterministic() {
        let a = SearchRequest::text("x", 5).semantic("default");
        let b = SearchRequest::text("x", 5).semantic("default");
        assert_eq!(a.describe(), b.describe());
        assert!(a.describe().starts_with('{'));
    }
}
