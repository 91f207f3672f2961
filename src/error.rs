//! Error types for agentic-search.
//!
//! Each backend gets its own error enum so callers can classify failures
//! (not-found, rate-limited, missing semantic configuration) without string
//! matching. [`AgentError`] is the umbrella type returned by configuration,
//! chat, and strategy operations.

use thiserror::Error;

/// Errors raised by configuration, the chat backend, and strategy selection.
#[derive(Debug, Error)]
pub enum AgentError {
    /// A required configuration value is missing or invalid.
    #[error("configuration error: {message}")]
    Config {
        /// What is wrong with the configuration.
        message: String,
    },

    /// No API key was supplied for the chat/embedding backend.
    #[error("API key missing: set AZURE_OPENAI_API_KEY or OPENAI_API_KEY")]
    ApiKeyMissing,

    /// The configured provider name is not recognized.
    #[error("unsupported provider: {name}")]
    UnsupportedProvider {
        /// Provider name as configured.
        name: String,
    },

    /// A chat completion request failed.
    #[error("chat request failed: {message}")]
    ApiRequest {
        /// Error text from the transport or API.
        message: String,
        /// HTTP status, when known.
        status: Option<u16>,
    },

    /// No registered search strategy accepts the index name.
    #[error(
        "no search strategy found for index '{index_name}'; ensure the index name contains 'semantic' for semantic search"
    )]
    NoStrategy {
        /// The index name that matched no strategy.
        index_name: String,
    },

    /// Search backend failure.
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Embedding backend failure.
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
}

/// Errors raised by the search backend.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The requested document key does not exist in the index.
    #[error("document '{key}' not found")]
    NotFound {
        /// Document key that was looked up.
        key: String,
    },

    /// The search service returned a non-success status.
    #[error("search service returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body.
        message: String,
    },

    /// Transport-level failure.
    #[error("search request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured endpoint cannot be turned into a request URL.
    #[error("invalid search endpoint: {message}")]
    InvalidEndpoint {
        /// Parse failure detail.
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("failed to decode search response: {message}")]
    Decode {
        /// Decode failure detail.
        message: String,
    },
}

impl SearchError {
    /// Returns `true` when the service rejected the query because the index
    /// has no usable semantic configuration.
    #[must_use]
    pub fn is_missing_semantic_configuration(&self) -> bool {
        match self {
            Self::Api { message, .. } => message
                .to_ascii_lowercase()
                .contains("semantic configuration"),
            _ => false,
        }
    }
}

/// Errors raised by the embedding backend.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// The backend throttled the request (HTTP 429).
    #[error("embedding request rate limited: {message}")]
    RateLimited {
        /// Message from the throttled response.
        message: String,
    },

    /// The backend returned a non-success status other than 429.
    #[error("embedding service returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body.
        message: String,
    },

    /// Transport-level failure.
    #[error("embedding request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response contained no embedding.
    #[error("embedding response contained no data")]
    EmptyResponse,

    /// Rate limiting persisted through every retry.
    #[error("embedding request still rate limited after {attempts} attempts: {message}")]
    RetriesExhausted {
        /// Total attempts made.
        attempts: u32,
        /// Message from the final throttled response.
        message: String,
    },
}

impl EmbeddingError {
    /// Returns `true` for failures the retry policy should retry.
    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}
