//! Configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.
//! Missing endpoints, keys, or deployment names are reported by
//! [`AgentConfigBuilder::build`] and are never retried.

use std::path::PathBuf;
use std::time::Duration;

use crate::embedding::{DEFAULT_BASE_DELAY, DEFAULT_DIMENSIONS, DEFAULT_MAX_RETRIES, RetryPolicy};
use crate::error::AgentError;
use crate::search::azure::DEFAULT_API_VERSION as DEFAULT_SEARCH_API_VERSION;

/// Default chat provider.
const DEFAULT_PROVIDER: &str = "azure";
/// Default chat model / deployment.
const DEFAULT_CHAT_MODEL: &str = "gpt-4o";
/// Default embedding model / deployment.
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
/// Default Azure `OpenAI` API version.
const DEFAULT_API_VERSION: &str = "2024-06-01";
/// Default semantic configuration name on search indexes.
const DEFAULT_SEMANTIC_CONFIGURATION: &str = "default";
/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 120;
/// Default maximum tool-calling turns per chat call.
const DEFAULT_MAX_TOOL_ITERATIONS: usize = 10;

/// Configuration for the chat, embedding, and search backends.
#[derive(Clone)]
pub struct AgentConfig {
    /// LLM provider name (`"azure"` or `"openai"`).
    pub provider: String,
    /// API key for the chat and embedding backends.
    pub api_key: String,
    /// Azure `OpenAI` endpoint, or base URL override for `OpenAI`-compatible APIs.
    pub base_url: Option<String>,
    /// Chat model (`OpenAI`) or deployment name (Azure).
    pub chat_model: String,
    /// Embedding model (`OpenAI`) or deployment name (Azure).
    pub embedding_model: String,
    /// Azure `OpenAI` REST API version.
    pub api_version: String,
    /// Embedding vector size.
    pub embedding_dimensions: usize,
    /// Search service endpoint.
    pub search_endpoint: String,
    /// Search service admin or query key.
    pub search_api_key: Option<String>,
    /// Search REST API version.
    pub search_api_version: String,
    /// Semantic configuration used for reranking.
    pub semantic_configuration: String,
    /// Retries after the first throttled embedding attempt.
    pub embedding_max_retries: u32,
    /// Base delay of the embedding backoff schedule.
    pub embedding_base_delay: Duration,
    /// Maximum tool-calling turns before the loop gives up.
    pub max_tool_iterations: usize,
    /// Request timeout for search and embedding calls.
    pub timeout: Duration,
    /// Directory containing prompt override files.
    pub prompt_dir: Option<PathBuf>,
}

impl AgentConfig {
    /// Creates a new builder for `AgentConfig`.
    #[must_use]
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] or [`AgentError::Config`] when
    /// required values are absent.
    pub fn from_env() -> Result<Self, AgentError> {
        Self::builder().from_env().build()
    }

    /// Backoff schedule for the embedding generator.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.embedding_max_retries,
            base_delay: self.embedding_base_delay,
        }
    }

    /// Returns `true` when the Azure `OpenAI` provider is selected.
    #[must_use]
    pub fn is_azure(&self) -> bool {
        self.provider == "azure"
    }
}

impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("chat_model", &self.chat_model)
            .field("embedding_model", &self.embedding_model)
            .field("api_version", &self.api_version)
            .field("embedding_dimensions", &self.embedding_dimensions)
            .field("search_endpoint", &self.search_endpoint)
            .field("search_api_version", &self.search_api_version)
            .field("semantic_configuration", &self.semantic_configuration)
            .field("max_tool_iterations", &self.max_tool_iterations)
            .finish_non_exhaustive()
    }
}

/// Builder for [`AgentConfig`].
#[derive(Debug, Clone, Default)]
pub struct AgentConfigBuilder {
    provider: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    chat_model: Option<String>,
    embedding_model: Option<String>,
    api_version: Option<String>,
    embedding_dimensions: Option<usize>,
    search_endpoint: Option<String>,
    search_api_key: Option<String>,
    search_api_version: Option<String>,
    semantic_configuration: Option<String>,
    embedding_max_retries: Option<u32>,
    embedding_base_delay: Option<Duration>,
    max_tool_iterations: Option<usize>,
    timeout: Option<Duration>,
    prompt_dir: Option<PathBuf>,
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl AgentConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.provider.is_none() {
            self.provider = env("AGENTIC_SEARCH_PROVIDER");
        }
        if self.api_key.is_none() {
            self.api_key = env("AZURE_OPENAI_API_KEY").or_else(|| env("OPENAI_API_KEY"));
        }
        if self.base_url.is_none() {
            self.base_url = env("AZURE_OPENAI_ENDPOINT").or_else(|| env("OPENAI_BASE_URL"));
        }
        if self.chat_model.is_none() {
            self.chat_model = env("AGENTIC_SEARCH_CHAT_MODEL");
        }
        if self.embedding_model.is_none() {
            self.embedding_model = env("AGENTIC_SEARCH_EMBEDDING_MODEL");
        }
        if self.api_version.is_none() {
            self.api_version = env("AZURE_OPENAI_API_VERSION");
        }
        if self.search_endpoint.is_none() {
            self.search_endpoint = env("AZURE_SEARCH_ENDPOINT");
        }
        if self.search_api_key.is_none() {
            self.search_api_key = env("AZURE_SEARCH_API_KEY");
        }
        if self.max_tool_iterations.is_none() {
            self.max_tool_iterations =
                env("AGENTIC_SEARCH_MAX_TOOL_ITERATIONS").and_then(|v| v.parse().ok());
        }
        if self.prompt_dir.is_none() {
            self.prompt_dir = env("AGENTIC_SEARCH_PROMPT_DIR").map(PathBuf::from);
        }
        self
    }

    /// Sets the LLM provider name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the Azure `OpenAI` endpoint or `OpenAI` base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the chat model / deployment.
    #[must_use]
    pub fn chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = Some(model.into());
        self
    }

    /// Sets the embedding model / deployment.
    #[must_use]
    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = Some(model.into());
        self
    }

    /// Sets the Azure `OpenAI` API version.
    #[must_use]
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Sets the embedding dimensionality.
    #[must_use]
    pub const fn embedding_dimensions(mut self, n: usize) -> Self {
        self.embedding_dimensions = Some(n);
        self
    }

    /// Sets the search service endpoint.
    #[must_use]
    pub fn search_endpoint(mut self, url: impl Into<String>) -> Self {
        self.search_endpoint = Some(url.into());
        self
    }

    /// Sets the search service key.
    #[must_use]
    pub fn search_api_key(mut self, key: impl Into<String>) -> Self {
        self.search_api_key = Some(key.into());
        self
    }

    /// Sets the semantic configuration name.
    #[must_use]
    pub fn semantic_configuration(mut self, name: impl Into<String>) -> Self {
        self.semantic_configuration = Some(name.into());
        self
    }

    /// Sets the embedding retry count.
    #[must_use]
    pub const fn embedding_max_retries(mut self, n: u32) -> Self {
        self.embedding_max_retries = Some(n);
        self
    }

    /// Sets the embedding backoff base delay.
    #[must_use]
    pub const fn embedding_base_delay(mut self, delay: Duration) -> Self {
        self.embedding_base_delay = Some(delay);
        self
    }

    /// Sets the maximum tool-calling turns per chat call.
    #[must_use]
    pub const fn max_tool_iterations(mut self, n: usize) -> Self {
        self.max_tool_iterations = Some(n);
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Sets the prompt template directory.
    #[must_use]
    pub fn prompt_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prompt_dir = Some(dir.into());
        self
    }

    /// Builds the [`AgentConfig`].
    ///
    /// # Errors
    ///
    /// - [`AgentError::ApiKeyMissing`] if no API key was set.
    /// - [`AgentError::Config`] if the search endpoint is missing, the Azure
    ///   provider has no endpoint, or a model/deployment name is blank.
    pub fn build(self) -> Result<AgentConfig, AgentError> {
        let api_key = self.api_key.ok_or(AgentError::ApiKeyMissing)?;
        let provider = self
            .provider
            .unwrap_or_else(|| DEFAULT_PROVIDER.to_string());

        let search_endpoint = self.search_endpoint.ok_or_else(|| AgentError::Config {
            message: "search endpoint is missing (set AZURE_SEARCH_ENDPOINT)".to_string(),
        })?;

        if provider == "azure" && self.base_url.is_none() {
            return Err(AgentError::Config {
                message: "Azure OpenAI endpoint is missing (set AZURE_OPENAI_ENDPOINT)".to_string(),
            });
        }

        let chat_model = self
            .chat_model
            .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string());
        if chat_model.trim().is_empty() {
            return Err(AgentError::Config {
                message: "chat deployment name is missing".to_string(),
            });
        }

        let embedding_model = self
            .embedding_model
            .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string());
        if embedding_model.trim().is_empty() {
            return Err(AgentError::Config {
                message: "embedding deployment name is missing".to_string(),
            });
        }

        Ok(AgentConfig {
            provider,
            api_key,
            base_url: self.base_url,
            chat_model,
            embedding_model,
            api_version: self
                .api_version
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            embedding_dimensions: self.embedding_dimensions.unwrap_or(DEFAULT_DIMENSIONS),
            search_endpoint,
            search_api_key: self.search_api_key,
            search_api_version: self
                .search_api_version
                .unwrap_or_else(|| DEFAULT_SEARCH_API_VERSION.to_string()),
            semantic_configuration: self
                .semantic_configuration
                .unwrap_or_else(|| DEFAULT_SEMANTIC_CONFIGURATION.to_string()),
            embedding_max_retries: self.embedding_max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            embedding_base_delay: self.embedding_base_delay.unwrap_or(DEFAULT_BASE_DELAY),
            max_tool_iterations: self
                .max_tool_iterations
                .unwrap_or(DEFAULT_MAX_TOOL_ITERATIONS),
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            prompt_dir: self.prompt_dir,
        })
    }
}
