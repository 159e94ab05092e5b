//! Brave Search API provider (requires an API key).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use sourcebrief_shared::{Result, SourceBriefError, SourceLocation};

use super::{SearchProvider, USER_AGENT};

/// Production endpoint for the Brave web search API.
const DEFAULT_ENDPOINT: &str = "https://api.search.brave.com/res/v1/web/search";

/// Timeout for search requests in seconds.
const SEARCH_TIMEOUT_SECS: u64 = 10;

/// Provider backed by the Brave Search API.
pub struct BraveProvider {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl BraveProvider {
    /// Create a provider against the production Brave endpoint.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_endpoint(api_key, DEFAULT_ENDPOINT)
    }

    /// Create a provider against a custom endpoint (proxies, tests).
    pub fn with_endpoint(api_key: impl Into<String>, endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(SEARCH_TIMEOUT_SECS))
            .build()
            .map_err(|e| SourceBriefError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl SearchProvider for BraveProvider {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SourceLocation>> {
        let count = max_results.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .header("X-Subscription-Token", &self.api_key)
            .header("Accept", "application/json")
            .query(&[("q", query), ("count", count.as_str())])
            .send()
            .await
            .map_err(|e| SourceBriefError::Network(format!("{}: {e}", self.endpoint)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceBriefError::Network(format!(
                "{}: HTTP {status}",
                self.endpoint
            )));
        }

        let parsed: BraveResponse = response
            .json()
            .await
            .map_err(|e| SourceBriefError::parse(format!("brave response: {e}")))?;

        let mut locations: Vec<SourceLocation> = parsed
            .web
            .map(|w| w.results)
            .unwrap_or_default()
            .into_iter()
            .map(|r| SourceLocation::new(r.url))
            .collect();
        locations.truncate(max_results);

        debug!(count = locations.len(), "brave results");
        Ok(locations)
    }

    fn name(&self) -> &str {
        "brave"
    }
}

#[derive(Debug, Deserialize)]
struct BraveResponse {
    #[serde(default)]
    web: Option<BraveWeb>,
}

#[derive(Debug, Deserialize)]
struct BraveWeb {
    #[serde(default)]
    results: Vec<BraveResult>,
}

#[derive(Debug, Deserialize)]
struct BraveResult {
    url: String,
}
