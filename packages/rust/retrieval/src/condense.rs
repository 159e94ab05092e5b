//! Aggregation of per-source results into the condensed answer text.

use sourcebrief_shared::SourceLocation;

use crate::fetch::FetchError;

/// Marker appended after word-budget truncation.
pub const TRUNCATION_MARKER: &str = "…";

/// Per-source extraction outcome, in receipt order.
pub type SourceReport = (SourceLocation, Result<Vec<String>, FetchError>);

/// Concatenate all successfully extracted fragments, each followed by a
/// single space. Failed sources are filtered out here, explicitly.
pub fn condense(per_source: &[SourceReport]) -> String {
    let mut buffer = String::new();
    for (_, outcome) in per_source {
        if let Ok(fragments) = outcome {
            for fragment in fragments {
                buffer.push_str(fragment);
                buffer.push(' ');
            }
        }
    }
    buffer
}

/// Truncate `text` to its first `max_words` words plus [`TRUNCATION_MARKER`].
/// Text at or under the budget is returned unmodified.
pub fn truncate_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        return text.to_string();
    }

    let mut out = words[..max_words].join(" ");
    out.push(' ');
    out.push_str(TRUNCATION_MARKER);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(s: &str) -> SourceLocation {
        SourceLocation::new(s)
    }

    #[test]
    fn condense_filters_failed_sources() {
        let per_source: Vec<SourceReport> = vec![
            (loc("https://a.example"), Ok(vec!["Everest is tallest.".into()])),
            (loc("https://b.example"), Err(FetchError::Timeout)),
            (loc("https://c.example"), Ok(vec!["K2 is second.".into()])),
        ];
        assert_eq!(condense(&per_source), "Everest is tallest. K2 is second. ");
    }

    #[test]
    fn condense_of_all_failures_is_empty() {
        let per_source: Vec<SourceReport> = vec![
            (loc("https://a.example"), Err(FetchError::Status(404))),
            (loc("https://b.example"), Err(FetchError::NoTextBlocks)),
        ];
        assert!(condense(&per_source).is_empty());
    }

    #[test]
    fn truncate_over_budget() {
        let text = "one two three four five six seven ";
        let out = truncate_words(text, 5);
        assert_eq!(out, "one two three four five …");
        // Exactly max_words words followed by the marker
        let tokens: Vec<&str> = out.split_whitespace().collect();
        assert_eq!(tokens.len(), 6);
        assert_eq!(tokens[5], TRUNCATION_MARKER);
    }

    #[test]
    fn truncate_at_or_under_budget_is_identity() {
        let text = "one two three ";
        assert_eq!(truncate_words(text, 3), text);
        assert_eq!(truncate_words(text, 10), text);
    }
}
