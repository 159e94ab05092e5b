//! SearXNG search provider (JSON API, no API key required).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use sourcebrief_shared::{Result, SourceBriefError, SourceLocation};

use super::{SearchProvider, USER_AGENT};

/// Timeout for search requests in seconds.
const SEARCH_TIMEOUT_SECS: u64 = 10;

/// Provider backed by a SearXNG instance's JSON API.
pub struct SearxngProvider {
    client: Client,
    base_url: String,
}

impl SearxngProvider {
    /// Create a provider for the SearXNG instance at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(3))
            .timeout(Duration::from_secs(SEARCH_TIMEOUT_SECS))
            .build()
            .map_err(|e| SourceBriefError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl SearchProvider for SearxngProvider {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SourceLocation>> {
        let url = format!("{}/search", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("format", "json"), ("pageno", "1")])
            .send()
            .await
            .map_err(|e| SourceBriefError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceBriefError::Network(format!("{url}: HTTP {status}")));
        }

        let parsed: SearxngResponse = response
            .json()
            .await
            .map_err(|e| SourceBriefError::parse(format!("searxng response: {e}")))?;

        // The JSON API has no result-count parameter; enforce the bound here.
        let mut locations: Vec<SourceLocation> = parsed
            .results
            .into_iter()
            .map(|r| SourceLocation::new(r.url))
            .collect();
        locations.truncate(max_results);

        debug!(count = locations.len(), "searxng results");
        Ok(locations)
    }

    fn name(&self) -> &str {
        "searxng"
    }
}

#[derive(Debug, Deserialize)]
struct SearxngResponse {
    #[serde(default)]
    results: Vec<SearxngResult>,
}

#[derive(Debug, Deserialize)]
struct SearxngResult {
    url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn parses_results_in_order() {
        let server = MockServer::start().await;

        let body = serde_json::json!({
            "query": "tallest mountain",
            "results": [
                {"url": "https://en.wikipedia.org/wiki/Mount_Everest", "title": "Everest"},
                {"url": "https://en.wikipedia.org/wiki/K2", "title": "K2"},
                {"url": "https://example.com/mountains", "title": "Mountains"},
            ]
        });

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "tallest mountain"))
            .and(query_param("format", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let provider = SearxngProvider::new(server.uri()).unwrap();
        let locations = provider.search("tallest mountain", 2).await.unwrap();

        // Truncated to the requested bound, order preserved
        assert_eq!(locations.len(), 2);
        assert_eq!(
            locations[0].as_str(),
            "https://en.wikipedia.org/wiki/Mount_Everest"
        );
        assert_eq!(locations[1].as_str(), "https://en.wikipedia.org/wiki/K2");
    }

    #[tokio::test]
    async fn http_error_is_a_search_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let provider = SearxngProvider::new(server.uri()).unwrap();
        let result = provider.search("anything", 5).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn missing_results_field_is_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let provider = SearxngProvider::new(server.uri()).unwrap();
        let locations = provider.search("anything", 5).await.unwrap();
        assert!(locations.is_empty());
    }
}
