//! Core domain types for SourceBrief retrieval sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// SourceLocation
// ---------------------------------------------------------------------------

/// An opaque address where candidate content was found by search.
///
/// Ordering is the relevance rank returned by the search provider. Locations
/// are not deduplicated and may repeat across calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceLocation(pub String);

impl SourceLocation {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SourceLocation {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// CondensedAnswer
// ---------------------------------------------------------------------------

/// The result of a retrieval: concatenated fragment text plus the full
/// ordered citation list.
///
/// `sources` always contains every location the search returned, including
/// ones whose fetch failed, so callers can still render them as links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CondensedAnswer {
    /// Concatenated, optionally word-truncated extraction from all sources.
    pub text: String,
    /// Ordered list of all source locations returned by search.
    pub sources: Vec<SourceLocation>,
}

impl CondensedAnswer {
    /// Number of whitespace-separated words in the condensed text.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

// ---------------------------------------------------------------------------
// SessionLog
// ---------------------------------------------------------------------------

/// Caller-owned, append-only log of pipeline invocations.
///
/// The pipeline appends exactly one entry per invocation and never reads
/// previous entries; there is no ambient session state anywhere else.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionLog {
    entries: Vec<LogEntry>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Entries can never be removed or reordered.
    pub fn append(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A single recorded pipeline invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Unique entry identifier (UUID v7, time-sortable).
    pub id: Uuid,
    /// When the invocation completed.
    pub at: DateTime<Utc>,
    /// The user-supplied query, as given.
    pub query: String,
    /// How the invocation ended.
    pub outcome: LogOutcome,
}

impl LogEntry {
    pub fn new(query: impl Into<String>, outcome: LogOutcome) -> Self {
        Self {
            id: Uuid::now_v7(),
            at: Utc::now(),
            query: query.into(),
            outcome,
        }
    }
}

/// Outcome summary recorded per invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum LogOutcome {
    /// Condensed text was produced.
    Answered {
        source_count: usize,
        word_count: usize,
    },
    /// Search succeeded but no source yielded usable text.
    NoContent { source_count: usize },
    /// The search call itself failed.
    SearchFailed,
}
