//! Backend factories.
//!
//! Maps [`AgentConfig`] onto concrete chat, search, and embedding backends.

use std::sync::Arc;

use crate::agent::config::AgentConfig;
use crate::agent::provider::LlmProvider;
use crate::agent::providers::OpenAiProvider;
use crate::embedding::{EmbeddingGenerator, OpenAiEmbeddings};
use crate::error::AgentError;
use crate::search::azure::AzureSearchClient;

/// Base URL used for `OpenAI` embeddings when none is configured.
const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Creates an [`LlmProvider`] based on the configured provider name.
///
/// # Supported Providers
///
/// - `"azure"` (default): Azure `OpenAI` deployment via `async-openai`
/// - `"openai"`: `OpenAI`-compatible APIs via `async-openai`
///
/// # Errors
///
/// Returns [`AgentError::UnsupportedProvider`] for unknown provider names.
pub fn create_provider(config: &AgentConfig) -> Result<Arc<dyn LlmProvider>, AgentError> {
    match config.provider.as_str() {
        "azure" => Ok(Arc::new(OpenAiProvider::azure(config)?)),
        "openai" => Ok(Arc::new(OpenAiProvider::openai(config))),
        other => Err(AgentError::UnsupportedProvider {
            name: other.to_string(),
        }),
    }
}

/// Creates the search backend client.
///
/// # Errors
///
/// Returns [`AgentError::Search`] if the endpoint is not a valid base URL.
pub fn create_search_backend(config: &AgentConfig) -> Result<Arc<AzureSearchClient>, AgentError> {
    let client = AzureSearchClient::new(
        &config.search_endpoint,
        config.search_api_key.clone(),
        &config.search_api_version,
        config.timeout,
    )?;
    Ok(Arc::new(client))
}

/// Creates the retrying embedding generator for the hybrid composition.
///
/// # Errors
///
/// Returns [`AgentError::Config`] for an invalid endpoint or
/// [`AgentError::UnsupportedProvider`] for unknown provider names.
pub fn create_embedding_generator(
    config: &AgentConfig,
) -> Result<Arc<EmbeddingGenerator>, AgentError> {
    let backend = match config.provider.as_str() {
        "azure" => {
            let endpoint = config.base_url.as_deref().ok_or_else(|| AgentError::Config {
                message: "Azure OpenAI endpoint is missing".to_string(),
            })?;
            OpenAiEmbeddings::azure(
                endpoint,
                &config.embedding_model,
                &config.api_version,
                &config.api_key,
                config.embedding_dimensions,
                config.timeout,
            )?
        }
        "openai" => OpenAiEmbeddings::openai(
            config.base_url.as_deref().unwrap_or(OPENAI_DEFAULT_BASE_URL),
            &config.embedding_model,
            &config.api_key,
            config.embedding_dimensions,
            config.timeout,
        )?,
        other => {
            return Err(AgentError::UnsupportedProvider {
                name: other.to_string(),
            });
        }
    };

    Ok(Arc::new(EmbeddingGenerator::new(
        Arc::new(backend),
        config.retry_policy(),
        config.embedding_dimensions,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder(provider: &str) -> crate::agent::config::AgentConfigBuilder {
        AgentConfig::builder()
            .provider(provider)
            .api_key("test")
            .base_url("https://aoai.example.com")
            .search_endpoint("https://search.example.com")
    }

    #[test]
    fn test_create_azure_provider() {
        let config = builder("azure").build().unwrap_or_else(|_| unreachable!());
        let provider = create_provider(&config).unwrap_or_else(|_| unreachable!());
        assert_eq!(provider.name(), "azure");
    }

    #[test]
    fn test_create_openai_provider() {
        let config = builder("openai").build().unwrap_or_else(|_| unreachable!());
        let provider = create_provider(&config).unwrap_or_else(|_| unreachable!());
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_create_unknown_provider() {
        let config = builder("unknown").build().unwrap_or_else(|_| unreachable!());
        assert!(matches!(
            create_provider(&config),
            Err(AgentError::UnsupportedProvider { .. })
        ));
        assert!(create_embedding_generator(&config).is_err());
    }

    #[test]
    fn test_create_search_backend_rejects_bad_endpoint() {
        let config = builder("azure")
            .search_endpoint("not a url")
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert!(matches!(
            create_search_backend(&config),
            Err(AgentError::Search(_))
        ));
    }

    #[test]
    fn test_create_embedding_generator_dimensions() {
        let config = builder("azure")
            .embedding_dimensions(3072)
            .build()
            .unwrap_or_else(|_| unreachable!());
        let generator = create_embedding_generator(&config).unwrap_or_else(|_| unreachable!());
        assert_eq!(generator.dimensions(), 3072);
    }
}
