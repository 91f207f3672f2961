//! Query embeddings with rate-limit aware retries.
//!
//! [`EmbeddingGenerator`] wraps an [`EmbeddingBackend`] and retries only
//! throttled requests, with exponential backoff taken from an injected
//! [`RetryPolicy`]. Every other failure is returned on first occurrence.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::error::{AgentError, EmbeddingError};

/// Default number of retries after the first throttled attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default base delay; retry `n` waits `base * 2^n`.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);
/// Default embedding dimensionality.
pub const DEFAULT_DIMENSIONS: usize = 1536;

/// Backoff schedule for throttled embedding requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    /// Base of the exponential schedule.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Delay after the `attempt`-th failed attempt (1-based): `base * 2^attempt`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2_u32.saturating_pow(attempt))
    }
}

/// Something that turns text into a vector.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Embeds `text`. Throttling must be reported as [`EmbeddingError::RateLimited`].
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Generates query embeddings, retrying on rate limits.
pub struct EmbeddingGenerator {
    backend: Arc<dyn EmbeddingBackend>,
    policy: RetryPolicy,
    dimensions: usize,
}

impl EmbeddingGenerator {
    /// Creates a generator over `backend` producing `dimensions`-sized vectors.
    #[must_use]
    pub fn new(backend: Arc<dyn EmbeddingBackend>, policy: RetryPolicy, dimensions: usize) -> Self {
        Self {
            backend,
            policy,
            dimensions,
        }
    }

    /// Vector size produced by the backend.
    #[must_use]
    pub const fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Embeds `text`.
    ///
    /// Blank input returns an empty vector without calling the backend.
    ///
    /// # Errors
    ///
    /// [`EmbeddingError::RetriesExhausted`] when every attempt was throttled;
    /// any non-throttling failure is returned unchanged.
    pub async fn generate(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.backend.embed(text).await {
                Ok(vector) => return Ok(vector),
                Err(e) if e.is_rate_limited() && attempt <= self.policy.max_retries => {
                    let delay = self.policy.delay_for(attempt);
                    warn!(
                        attempt,
                        max_retries = self.policy.max_retries,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "embedding rate limited; retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(EmbeddingError::RateLimited { message }) => {
                    error!(attempts = attempt, "embedding rate limit persisted");
                    return Err(EmbeddingError::RetriesExhausted {
                        attempts: attempt,
                        message,
                    });
                }
                Err(e) => {
                    error!(error = %e, "embedding generation failed");
                    return Err(e);
                }
            }
        }
    }
}

impl std::fmt::Debug for EmbeddingGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingGenerator")
            .field("policy", &self.policy)
            .field("dimensions", &self.dimensions)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// HTTP backend
// ---------------------------------------------------------------------------

/// How requests are authenticated and addressed.
#[derive(Debug, Clone)]
enum Flavor {
    /// Azure `OpenAI`: deployment in the URL, `api-key` header.
    Azure { api_key: String },
    /// `OpenAI`-compatible: model in the body, bearer token.
    OpenAi { api_key: String, model: String },
}

#[derive(Serialize)]
struct EmbeddingRequestBody<'a> {
    input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    dimensions: usize,
}

#[derive(Deserialize)]
struct EmbeddingResponseBody {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Embedding backend for `OpenAI` and Azure `OpenAI` REST endpoints.
pub struct OpenAiEmbeddings {
    http: reqwest::Client,
    url: Url,
    flavor: Flavor,
    dimensions: usize,
}

impl OpenAiEmbeddings {
    /// Azure `OpenAI`: `{endpoint}/openai/deployments/{deployment}/embeddings`.
    pub fn azure(
        endpoint: &str,
        deployment: &str,
        api_version: &str,
        api_key: &str,
        dimensions: usize,
        timeout: Duration,
    ) -> Result<Self, AgentError> {
        let mut url = parse_base(endpoint)?;
        extend_path(&mut url, &["openai", "deployments", deployment, "embeddings"])?;
        url.query_pairs_mut().append_pair("api-version", api_version);
        Self::build(
            url,
            Flavor::Azure {
                api_key: api_key.to_string(),
            },
            dimensions,
            timeout,
        )
    }

    /// `OpenAI`-compatible: `{base_url}/embeddings`.
    pub fn openai(
        base_url: &str,
        model: &str,
        api_key: &str,
        dimensions: usize,
        timeout: Duration,
    ) -> Result<Self, AgentError> {
        let mut url = parse_base(base_url)?;
        extend_path(&mut url, &["embeddings"])?;
        Self::build(
            url,
            Flavor::OpenAi {
                api_key: api_key.to_string(),
                model: model.to_string(),
            },
            dimensions,
            timeout,
        )
    }

    fn build(
        url: Url,
        flavor: Flavor,
        dimensions: usize,
        timeout: Duration,
    ) -> Result<Self, AgentError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AgentError::Config {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            http,
            url,
            flavor,
            dimensions,
        })
    }

    /// Request URL (exposed for diagnostics).
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }
}

fn parse_base(endpoint: &str) -> Result<Url, AgentError> {
    Url::parse(endpoint).map_err(|e| AgentError::Config {
        message: format!("invalid endpoint '{endpoint}': {e}"),
    })
}

fn extend_path(url: &mut Url, segments: &[&str]) -> Result<(), AgentError> {
    let display = url.to_string();
    url.path_segments_mut()
        .map_err(|()| AgentError::Config {
            message: format!("endpoint '{display}' cannot be used as a base URL"),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(())
}

impl std::fmt::Debug for OpenAiEmbeddings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiEmbeddings")
            .field("url", &self.url.as_str())
            .field("dimensions", &self.dimensions)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl EmbeddingBackend for OpenAiEmbeddings {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let (builder, model) = match &self.flavor {
            Flavor::Azure { api_key } => (
                self.http.post(self.url.clone()).header("api-key", api_key),
                None,
            ),
            Flavor::OpenAi { api_key, model } => (
                self.http.post(self.url.clone()).bearer_auth(api_key),
                Some(model.as_str()),
            ),
        };

        let body = EmbeddingRequestBody {
            input: text,
            model,
            dimensions: self.dimensions,
        };
        let response = builder.json(&body).send().await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let message = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::RateLimited { message });
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: EmbeddingResponseBody = response.json().await?;
        body.data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or(EmbeddingError::EmptyResponse)
    }
}
