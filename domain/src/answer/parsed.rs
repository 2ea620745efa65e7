//! Normalized answer value object

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Confidence used when a structured answer omits or garbles its confidence
pub const DEFAULT_CONFIDENCE: u8 = 50;

/// A provider's answer reduced to a comparable label set
///
/// Labels are upper-case option letters (`"A"`, `"C"`), the literal tokens
/// `"true"` / `"false"`, or a single upper-cased free-text answer. The set is
/// ordered, so two answers naming the same options in a different order
/// normalize to the same string. An empty label set means the response could
/// not be parsed and the vote must be discarded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParsedAnswer {
    labels: BTreeSet<String>,
    confidence: u8,
}

impl ParsedAnswer {
    /// Create an answer; confidence is clamped to 0-100
    pub fn new<I, S>(labels: I, confidence: u8) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels
                .into_iter()
                .map(Into::into)
                .filter(|l: &String| !l.is_empty())
                .collect(),
            confidence: confidence.min(100),
        }
    }

    /// The "unparseable" answer: no labels, zero confidence
    pub fn empty() -> Self {
        Self {
            labels: BTreeSet::new(),
            confidence: 0,
        }
    }

    /// Answer made of option letters (upper-cased, deduplicated)
    pub fn letters<I: IntoIterator<Item = char>>(letters: I, confidence: u8) -> Self {
        Self::new(
            letters
                .into_iter()
                .map(|c| c.to_ascii_uppercase().to_string()),
            confidence,
        )
    }

    /// A `true` / `false` answer
    pub fn boolean(value: bool, confidence: u8) -> Self {
        Self::new([if value { "true" } else { "false" }], confidence)
    }

    pub fn labels(&self) -> &BTreeSet<String> {
        &self.labels
    }

    pub fn confidence(&self) -> u8 {
        self.confidence
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Replace the confidence (clamped to 0-100)
    pub fn with_confidence(mut self, confidence: u8) -> Self {
        self.confidence = confidence.min(100);
        self
    }

    /// Number of distinct single-letter option labels
    pub fn letter_count(&self) -> usize {
        self.labels.iter().filter(|l| is_letter_label(l)).count()
    }

    /// Canonical string used for exact-match voting (e.g. `"A, C"`, `"true"`)
    pub fn normalized(&self) -> String {
        self.labels
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for ParsedAnswer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}%)", self.normalized(), self.confidence)
    }
}

fn is_letter_label(label: &str) -> bool {
    let mut chars = label.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_uppercase())
}
