//! Fragment extraction from raw markup.
//!
//! Takes the first N text-bearing blocks of a page. Paragraph elements are
//! the primary unit; pages without any `<p>` fall back to the whole body
//! text as a single block, so plain-text responses still contribute.

use scraper::{Html, Selector};

/// Extract up to `max_fragments` text blocks from raw markup.
///
/// Whitespace inside each fragment is collapsed to single spaces. Returns an
/// empty vec when the document has no usable text at all; `scraper` tolerates
/// arbitrarily malformed markup, so this never fails.
pub fn extract_fragments(markup: &str, max_fragments: usize) -> Vec<String> {
    let doc = Html::parse_document(markup);

    let p_sel = Selector::parse("p").unwrap();
    let mut fragments = Vec::new();

    for el in doc.select(&p_sel) {
        let text = collapse_whitespace(&el.text().collect::<String>());
        if text.is_empty() {
            continue;
        }
        fragments.push(text);
        if fragments.len() >= max_fragments {
            break;
        }
    }

    if !fragments.is_empty() {
        return fragments;
    }

    // No paragraphs: treat the body text as one block.
    let body_sel = Selector::parse("body").unwrap();
    if let Some(body) = doc.select(&body_sel).next() {
        let text = collapse_whitespace(&body.text().collect::<String>());
        if !text.is_empty() {
            return vec![text];
        }
    }

    Vec::new()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
