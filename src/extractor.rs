//! City extraction
//!
//! Turns a free-text utterance such as "what's the weather like in Paris?"
//! into a location query ("paris") by dropping punctuation, filler words
//! and very short tokens.

use serde::Serialize;
use std::fmt;

/// Words that never name a place: weather vocabulary, politeness and filler.
const STOPWORDS: &[&str] = &[
    "weather",
    "in",
    "at",
    "for",
    "temperature",
    "how",
    "is",
    "the",
    "like",
    "show",
    "me",
    "please",
    "tell",
    "forecast",
    "what",
    "whats",
    "today",
    "now",
    "current",
    "currently",
    "right",
    "outside",
    "hey",
    "hello",
    "can",
    "you",
    "could",
    "give",
    "about",
];

/// Tokens this short or shorter are dropped.
const MAX_DROPPED_TOKEN_CHARS: usize = 2;

/// Normalized candidate place name derived from one utterance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LocationQuery(String);

impl LocationQuery {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters, not bytes
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract a best-guess location from `text`.
///
/// Falls back to `text` verbatim when nothing survives filtering, so a
/// non-empty input never produces an empty query.
#[must_use]
pub fn extract(text: &str) -> LocationQuery {
    let normalized: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();

    let candidates: Vec<&str> = normalized
        .split_whitespace()
        .filter(|token| !STOPWORDS.contains(token))
        .filter(|token| token.chars().count() > MAX_DROPPED_TOKEN_CHARS)
        .collect();

    if candidates.is_empty() {
        LocationQuery(text.to_string())
    } else {
        LocationQuery(candidates.join(" "))
    }
}
