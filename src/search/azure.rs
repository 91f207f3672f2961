//! Azure AI Search REST client.
//!
//! Implements [`SearchBackend`] with two endpoints:
//! `POST /indexes/{index}/docs/search` and `GET /indexes/{index}/docs/{key}`.
//! Authentication uses the `api-key` header.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use super::{Document, FacetValue, SearchBackend, SearchHit, SearchRequest, SearchResults};
use crate::error::SearchError;

/// Default REST API version.
pub const DEFAULT_API_VERSION: &str = "2024-07-01";

const SCORE_FIELD: &str = "@search.score";
const RERANKER_SCORE_FIELD: &str = "@search.rerankerScore";
const METADATA_PREFIX: &str = "@search.";
const ODATA_PREFIX: &str = "@odata.";

/// Client for one Azure AI Search service.
pub struct AzureSearchClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: Option<String>,
    api_version: String,
}

#[derive(Deserialize)]
struct SearchResponseBody {
    #[serde(default)]
    value: Vec<Document>,
    #[serde(rename = "@search.facets", default)]
    facets: HashMap<String, Vec<FacetValue>>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl AzureSearchClient {
    /// Creates a client for `endpoint` (e.g. `https://myservice.search.windows.net`).
    pub fn new(
        endpoint: &str,
        api_key: Option<String>,
        api_version: &str,
        timeout: Duration,
    ) -> Result<Self, SearchError> {
        let endpoint = Url::parse(endpoint).map_err(|e| SearchError::InvalidEndpoint {
            message: format!("{endpoint}: {e}"),
        })?;
        if endpoint.cannot_be_a_base() {
            return Err(SearchError::InvalidEndpoint {
                message: format!("{endpoint} cannot be used as a base URL"),
            });
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint,
            api_key,
            api_version: api_version.to_string(),
        })
    }

    /// Builds `{endpoint}/indexes/{index}/docs/{tail...}?api-version=...`.
    fn url(&self, index: &str, tail: &[&str]) -> Result<Url, SearchError> {
        let mut url = self.endpoint.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| SearchError::InvalidEndpoint {
                    message: self.endpoint.to_string(),
                })?;
            segments.pop_if_empty().extend(["indexes", index, "docs"]);
            segments.extend(tail);
        }
        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version);
        Ok(url)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.header("api-key", key),
            None => builder,
        }
    }

    /// Turns a non-success response into [`SearchError::Api`], preferring the
    /// service's `error.message` over the raw body.
    async fn api_error(response: reqwest::Response) -> SearchError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error.message)
            .unwrap_or(body);
        SearchError::Api { status, message }
    }
}

/// Splits `@search.*` metadata off a raw result document.
fn into_hit(mut raw: Document) -> SearchHit {
    let score = raw.get(SCORE_FIELD).and_then(serde_json::Value::as_f64);
    let reranker_score = raw
        .get(RERANKER_SCORE_FIELD)
        .and_then(serde_json::Value::as_f64);
    raw.retain(|key, _| !key.starts_with(METADATA_PREFIX));
    SearchHit {
        score,
        reranker_score,
        document: raw,
    }
}

impl std::fmt::Debug for AzureSearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureSearchClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_version", &self.api_version)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SearchBackend for AzureSearchClient {
    async fn search(
        &self,
        index: &str,
        request: &SearchRequest,
    ) -> Result<SearchResults, SearchError> {
        let url = self.url(index, &["search"])?;
        debug!(index, top = request.top, "issuing search query");

        let response = self
            .authorize(self.http.post(url))
            .json(request)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let body: SearchResponseBody =
            response.json().await.map_err(|e| SearchError::Decode {
                message: e.to_string(),
            })?;

        Ok(SearchResults {
            hits: body.value.into_iter().map(into_hit).collect(),
            facets: body.facets,
        })
    }

    async fn get_document(&self, index: &str, key: &str) -> Result<Document, SearchError> {
        let url = self.url(index, &[key])?;
        debug!(index, key, "looking up document");

        let response = self.authorize(self.http.get(url)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(SearchError::NotFound {
                key: key.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let mut document: Document = response.json().await.map_err(|e| SearchError::Decode {
            message: e.to_string(),
        })?;
        document.retain(|field, _| !field.starts_with(ODATA_PREFIX));
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(endpoint: &str) -> AzureSearchClient {
        AzureSearchClient::new(endpoint, None, DEFAULT_API_VERSION, Duration::from_secs(5))
            .unwrap_or_else(|e| unreachable!("client: {e}"))
    }

    #[test]
    fn test_search_url() {
        let c = client("https://svc.search.windows.net");
        let url = c
            .url("assets-semantic", &["search"])
            .unwrap_or_else(|e| unreachable!("url: {e}"));
        assert_eq!(
            url.as_str(),
            "https://svc.search.windows.net/indexes/assets-semantic/docs/search?api-version=2024-07-01"
        );
    }

    #[test]
    fn test_lookup_url_escapes_key() {
        let c = client("https://svc.search.windows.net/");
        let url = c
            .url("assets", &["doc 1/2"])
            .unwrap_or_else(|e| unreachable!("url: {e}"));
        assert_eq!(
            url.as_str(),
            "https://svc.search.windows.net/indexes/assets/docs/doc%201%2F2?api-version=2024-07-01"
        );
    }

    #[test]
    fn test_invalid_endpoint() {
        let result =
            AzureSearchClient::new("not a url", None, DEFAULT_API_VERSION, Duration::from_secs(5));
        assert!(matches!(result, Err(SearchError::InvalidEndpoint { .. })));
    }

    #[test]
    fn test_into_hit_strips_metadata() {
        let raw: Document = serde_json::from_value(json!({
            "@search.score": 1.5,
            "@search.rerankerScore": 2.75,
            "@search.captions": null,
            "id": "asset-001",
            "name": "Pump"
        }))
        .unwrap_or_default();
        let hit = into_hit(raw);
        assert_eq!(hit.score, Some(1.5));
        assert_eq!(hit.reranker_score, Some(2.75));
        assert_eq!(hit.document.len(), 2);
        assert!(hit.document.keys().all(|k| !k.starts_with('@')));
    }

    #[test]
    fn test_response_body_parses_facets() {
        let body: SearchResponseBody = serde_json::from_value(json!({
            "value": [],
            "@search.facets": {
                "region": [{"value": "North", "count": 3}, {"value": "South", "count": 1}]
            }
        }))
        .unwrap_or_else(|e| unreachable!("parse: {e}"));
        assert_eq!(body.facets["region"].len(), 2);
        assert_eq!(body.facets["region"][0].count, 3);
    }
}
