//! Search provider trait and built-in providers.
//!
//! A provider turns a free-text query into an ordered list of source
//! locations. Provider failures are surfaced as a single search-level error;
//! the pipeline maps them to `SearchUnavailable`.

mod brave;
mod searxng;

use async_trait::async_trait;

use sourcebrief_shared::{Result, SourceLocation};

pub use brave::BraveProvider;
pub use searxng::SearxngProvider;

/// User-Agent string for search and fetch requests.
pub(crate) const USER_AGENT: &str = concat!("SourceBrief/", env!("CARGO_PKG_VERSION"));

/// External search capability.
///
/// Implementations must request at most `max_results` results from the
/// backing service and preserve its relevance order.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Search for `query`, returning up to `max_results` locations in
    /// relevance order.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SourceLocation>>;

    /// Human-readable provider name for tracing.
    fn name(&self) -> &str;
}

/// Compose a site-restricted query (e.g. `"linear algebra site:youtube.com"`).
pub fn site_filtered_query(topic: &str, site: &str) -> String {
    format!("{} site:{site}", topic.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_filter_composition() {
        assert_eq!(
            site_filtered_query("linear algebra", "youtube.com"),
            "linear algebra site:youtube.com"
        );
        assert_eq!(
            site_filtered_query("  rust lifetimes \n", "youtube.com"),
            "rust lifetimes site:youtube.com"
        );
    }
}
