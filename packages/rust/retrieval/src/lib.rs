//! Retrieval-and-Condense pipeline.
//!
//! Given a free-text query, obtains a bounded list of source locations from
//! a [`SearchProvider`], fetches each sequentially with a short timeout,
//! extracts a bounded number of text blocks per source, and condenses the
//! result under an optional word budget.
//!
//! Failure policy: only [`RetrievalError::SearchUnavailable`] and
//! [`RetrievalError::NoContentExtracted`] cross this boundary. Every
//! per-source failure is recorded as a [`FetchError`] in the per-source
//! report, logged at debug level, and skipped — no retry, no backoff, and a
//! slow or failing source never aborts retrieval of the others.

mod condense;
mod extract;
mod fetch;
pub mod search;

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, instrument};

use sourcebrief_shared::{
    CondensedAnswer, LogEntry, LogOutcome, Result, RetrievalConfig, SessionLog, SourceBriefError,
    SourceLocation,
};

pub use condense::{TRUNCATION_MARKER, truncate_words};
pub use extract::extract_fragments;
pub use fetch::FetchError;
pub use search::{BraveProvider, SearchProvider, SearxngProvider, site_filtered_query};

use condense::SourceReport;

// ---------------------------------------------------------------------------
// RetrievalError
// ---------------------------------------------------------------------------

/// The only two error kinds that cross the pipeline boundary.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    /// The search call itself failed (network, quota, malformed query).
    /// No fetches were attempted.
    #[error("search unavailable: {0}")]
    SearchUnavailable(String),

    /// Search succeeded but no source yielded usable text. The source list
    /// is still returned so callers can render the links.
    #[error("no extractable content from {} source(s)", sources.len())]
    NoContentExtracted {
        /// Full ordered list of locations the search returned.
        sources: Vec<SourceLocation>,
    },
}

// ---------------------------------------------------------------------------
// Retriever
// ---------------------------------------------------------------------------

/// Strictly sequential retrieval pipeline. Holds no state between calls;
/// repeated invocations are independent.
pub struct Retriever {
    config: RetrievalConfig,
    client: Client,
    /// Allow localhost/private IPs (for integration tests with mock servers).
    allow_localhost: bool,
}

impl Retriever {
    /// Create a retriever with the given bounds. Validates the contract
    /// inputs (`max_sources >= 1`, `max_fragments_per_source >= 1`,
    /// `max_words` positive if set).
    pub fn new(config: RetrievalConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .user_agent(search::USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| SourceBriefError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            client,
            allow_localhost: false,
        })
    }

    /// Allow fetching from localhost/private IPs (for integration tests).
    #[cfg(test)]
    pub fn allow_localhost(mut self) -> Self {
        self.allow_localhost = true;
        self
    }

    /// Run one retrieval: search, sequential fan-out fetch, condense.
    ///
    /// Appends exactly one entry to the caller-owned `log`, whatever the
    /// outcome. Returns the condensed text and the full ordered source list
    /// (failed sources included).
    #[instrument(skip_all, fields(provider = provider.name(), query = %query))]
    pub async fn retrieve_and_condense(
        &self,
        provider: &dyn SearchProvider,
        query: &str,
        log: &mut SessionLog,
    ) -> std::result::Result<CondensedAnswer, RetrievalError> {
        let max_sources = self.config.max_sources;

        info!(max_sources, "starting retrieval");

        let mut sources = match provider.search(query, max_sources).await {
            Ok(locations) => locations,
            Err(e) => {
                debug!(error = %e, "search call failed");
                log.append(LogEntry::new(query, LogOutcome::SearchFailed));
                return Err(RetrievalError::SearchUnavailable(e.to_string()));
            }
        };
        // Providers request at most max_sources; enforce the bound anyway.
        sources.truncate(max_sources);

        let timeout = Duration::from_secs(self.config.fetch_timeout_secs);
        let mut per_source: Vec<SourceReport> = Vec::with_capacity(sources.len());

        for location in &sources {
            let outcome = self.extract_from_source(location, timeout).await;
            if let Err(e) = &outcome {
                debug!(source = %location, error = %e, "source skipped");
            }
            per_source.push((location.clone(), outcome));
        }

        let buffer = condense::condense(&per_source);
        if buffer.is_empty() {
            info!(sources = sources.len(), "no extractable content");
            log.append(LogEntry::new(
                query,
                LogOutcome::NoContent {
                    source_count: sources.len(),
                },
            ));
            return Err(RetrievalError::NoContentExtracted { sources });
        }

        let text = match self.config.max_words {
            Some(max_words) => truncate_words(&buffer, max_words),
            None => buffer,
        };

        let answer = CondensedAnswer { text, sources };

        info!(
            sources = answer.sources.len(),
            words = answer.word_count(),
            "retrieval completed"
        );
        log.append(LogEntry::new(
            query,
            LogOutcome::Answered {
                source_count: answer.sources.len(),
                word_count: answer.word_count(),
            },
        ));

        Ok(answer)
    }

    /// Fetch one source and extract its first bounded text blocks.
    async fn extract_from_source(
        &self,
        location: &SourceLocation,
        timeout: Duration,
    ) -> std::result::Result<Vec<String>, FetchError> {
        let body =
            fetch::fetch_source(&self.client, location, timeout, self.allow_localhost).await?;

        let fragments = extract_fragments(&body, self.config.max_fragments_per_source);
        if fragments.is_empty() {
            return Err(FetchError::NoTextBlocks);
        }
        Ok(fragments)
    }
}

#[cfg(test)]
mod pipeline_tests {
    use super::*;

    use std::sync::Mutex;

    use async_trait::async_trait;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(max_sources: usize, max_fragments: usize, max_words: Option<usize>) -> RetrievalConfig {
        RetrievalConfig {
            max_sources,
            max_fragments_per_source: max_fragments,
            max_words,
            fetch_timeout_secs: 1,
        }
    }

    /// Provider returning a fixed list, recording the requested bound.
    struct StaticProvider {
        results: Vec<SourceLocation>,
        requested: Mutex<Vec<usize>>,
    }

    impl StaticProvider {
        fn new(urls: &[String]) -> Self {
            Self {
                results: urls.iter().map(|u| SourceLocation::new(u)).collect(),
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SearchProvider for StaticProvider {
        async fn search(
            &self,
            _query: &str,
            max_results: usize,
        ) -> sourcebrief_shared::Result<Vec<SourceLocation>> {
            self.requested.lock().unwrap().push(max_results);
            Ok(self.results.clone())
        }

        fn name(&self) -> &str {
            "static"
        }
    }

    /// Provider whose search call always fails.
    struct FailingProvider;

    #[async_trait]
    impl SearchProvider for FailingProvider {
        async fn search(
            &self,
            _query: &str,
            _max_results: usize,
        ) -> sourcebrief_shared::Result<Vec<SourceLocation>> {
            Err(SourceBriefError::Network("quota exceeded".into()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    async fn mount_text(server: &MockServer, route: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn tallest_mountain_scenario() {
        let server = MockServer::start().await;

        mount_text(&server, "/a", "Everest is tallest.").await;
        Mock::given(method("GET"))
            .and(path("/b"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        mount_text(&server, "/c", "K2 is second.").await;

        let provider = StaticProvider::new(&[
            format!("{}/a", server.uri()),
            format!("{}/b", server.uri()),
            format!("{}/c", server.uri()),
        ]);

        let retriever = Retriever::new(config(3, 1, None)).unwrap().allow_localhost();
        let mut log = SessionLog::new();
        let answer = retriever
            .retrieve_and_condense(&provider, "tallest mountain", &mut log)
            .await
            .unwrap();

        assert_eq!(answer.text, "Everest is tallest. K2 is second. ");
        // Failed source still appears in the citation list
        assert_eq!(answer.sources.len(), 3);
        assert_eq!(answer.sources[1].as_str(), format!("{}/b", server.uri()));

        // Search was asked for exactly max_sources results
        assert_eq!(*provider.requested.lock().unwrap(), vec![3]);

        assert_eq!(log.len(), 1);
        assert_eq!(
            log.entries()[0].outcome,
            LogOutcome::Answered {
                source_count: 3,
                word_count: 6,
            }
        );
    }

    #[tokio::test]
    async fn fragments_per_source_are_bounded() {
        let server = MockServer::start().await;

        mount_text(
            &server,
            "/page",
            "<html><body><p>One.</p><p>Two.</p><p>Three.</p><p>Four.</p></body></html>",
        )
        .await;

        let provider = StaticProvider::new(&[format!("{}/page", server.uri())]);
        let retriever = Retriever::new(config(5, 2, None)).unwrap().allow_localhost();
        let mut log = SessionLog::new();
        let answer = retriever
            .retrieve_and_condense(&provider, "anything", &mut log)
            .await
            .unwrap();

        assert_eq!(answer.text, "One. Two. ");
    }

    #[tokio::test]
    async fn search_failure_means_no_fetches() {
        let server = MockServer::start().await;

        // Any fetch reaching the server would trip this expectation.
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("should not be fetched"))
            .expect(0)
            .mount(&server)
            .await;

        let retriever = Retriever::new(config(5, 3, None)).unwrap().allow_localhost();
        let mut log = SessionLog::new();
        let result = retriever
            .retrieve_and_condense(&FailingProvider, "anything", &mut log)
            .await;

        match result {
            Err(RetrievalError::SearchUnavailable(msg)) => {
                assert!(msg.contains("quota exceeded"));
            }
            other => panic!("expected SearchUnavailable, got {other:?}"),
        }
        assert_eq!(log.entries()[0].outcome, LogOutcome::SearchFailed);
    }

    #[tokio::test]
    async fn all_fetches_failing_is_no_content_with_sources() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let urls: Vec<String> = (0..5).map(|i| format!("{}/p{i}", server.uri())).collect();
        let provider = StaticProvider::new(&urls);

        let retriever = Retriever::new(config(5, 3, None)).unwrap().allow_localhost();
        let mut log = SessionLog::new();
        let result = retriever
            .retrieve_and_condense(&provider, "anything", &mut log)
            .await;

        match result {
            Err(RetrievalError::NoContentExtracted { sources }) => {
                assert_eq!(sources.len(), 5);
            }
            other => panic!("expected NoContentExtracted, got {other:?}"),
        }
        assert_eq!(
            log.entries()[0].outcome,
            LogOutcome::NoContent { source_count: 5 }
        );
    }

    #[tokio::test]
    async fn slow_source_is_skipped_not_fatal() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("too late")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;
        mount_text(&server, "/fast", "K2 is second.").await;

        let provider = StaticProvider::new(&[
            format!("{}/slow", server.uri()),
            format!("{}/fast", server.uri()),
        ]);

        // 1s per-source timeout
        let retriever = Retriever::new(config(2, 1, None)).unwrap().allow_localhost();
        let mut log = SessionLog::new();
        let answer = retriever
            .retrieve_and_condense(&provider, "anything", &mut log)
            .await
            .unwrap();

        assert_eq!(answer.text, "K2 is second. ");
        assert_eq!(answer.sources.len(), 2);
    }

    #[tokio::test]
    async fn word_budget_truncates_with_marker() {
        let server = MockServer::start().await;

        mount_text(
            &server,
            "/p",
            "<p>one two three four five six seven eight</p>",
        )
        .await;

        let provider = StaticProvider::new(&[format!("{}/p", server.uri())]);
        let retriever = Retriever::new(config(1, 1, Some(5))).unwrap().allow_localhost();
        let mut log = SessionLog::new();
        let answer = retriever
            .retrieve_and_condense(&provider, "anything", &mut log)
            .await
            .unwrap();

        assert_eq!(answer.text, "one two three four five …");
    }

    #[tokio::test]
    async fn oversized_provider_list_is_truncated() {
        let server = MockServer::start().await;
        mount_text(&server, "/p", "some text").await;

        // Misbehaving provider returns more than requested
        let urls: Vec<String> = (0..7).map(|_| format!("{}/p", server.uri())).collect();
        let provider = StaticProvider::new(&urls);

        let retriever = Retriever::new(config(3, 1, None)).unwrap().allow_localhost();
        let mut log = SessionLog::new();
        let answer = retriever
            .retrieve_and_condense(&provider, "anything", &mut log)
            .await
            .unwrap();

        assert_eq!(answer.sources.len(), 3);
    }

    #[test]
    fn invalid_bounds_rejected_at_construction() {
        assert!(Retriever::new(config(0, 3, None)).is_err());
        assert!(Retriever::new(config(5, 0, None)).is_err());
        assert!(Retriever::new(config(5, 3, Some(0))).is_err());
    }
}
