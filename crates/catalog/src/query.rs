//! Title matching.
//!
//! A query is split on whitespace into literal tokens. A title matches when it
//! contains every token in order, with each pair of consecutive tokens
//! separated by one or more whitespace or underscore characters. A query with
//! no tokens matches every title.

use crate::record::HymnRecord;

fn is_gap(c: char) -> bool {
    c == '_' || c.is_whitespace()
}

/// A parsed, lowercased title query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    tokens: Vec<String>,
}

impl Query {
    /// Parse a free-text query.
    ///
    /// ```
    /// use hymnal_catalog::Query;
    ///
    /// let query = Query::parse("  How   GREAT ");
    /// assert_eq!(query.tokens(), ["how", "great"]);
    /// assert!(Query::parse(" \t ").matches("amazing grace"));
    /// ```
    pub fn parse(query: &str) -> Self {
        let tokens = query.to_lowercase().split_whitespace().map(str::to_string).collect();
        Self { tokens }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Whether a lowercased title matches this query.
    pub fn matches(&self, normalized_title: &str) -> bool {
        if self.tokens.is_empty() {
            return true;
        }
        normalized_title
            .char_indices()
            .map(|(start, _)| start)
            .any(|start| match_at(&normalized_title[start..], &self.tokens))
    }
}

/// Match `tokens` anchored at the start of `text`.
fn match_at(text: &str, tokens: &[String]) -> bool {
    let Some((token, rest)) = tokens.split_first() else {
        return true;
    };
    let Some(after) = text.strip_prefix(token.as_str()) else {
        return false;
    };
    if rest.is_empty() {
        return true;
    }
    // A token may itself start with a gap character, so every gap length has
    // to be tried, not only the longest.
    after
        .char_indices()
        .take_while(|&(_, c)| is_gap(c))
        .any(|(offset, c)| match_at(&after[offset + c.len_utf8()..], rest))
}

/// The first `max_results` records whose normalized title matches `query`,
/// in catalog order.
///
/// An empty query matches every record.
pub fn search(records: &[HymnRecord], query: &str, max_results: usize) -> Vec<HymnRecord> {
    let query = Query::parse(query);
    records
        .iter()
        .filter(|record| query.matches(record.normalized_title()))
        .take(max_results)
        .cloned()
        .collect()
}
