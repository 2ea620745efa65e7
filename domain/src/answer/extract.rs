//! Answer extraction from free-form model output.
//!
//! Model output is unreliable, so extraction is a cascade of named
//! strategies tried in a fixed order. The first strategy that matches wins;
//! more structured signals come first.
//!
//! | Order | Strategy | Example input | Confidence |
//! |-------|----------|---------------|------------|
//! | 1 | [`ExtractionStrategy::StructuredJson`] | `{"answer": "B", "confidence": 92}` | from JSON (default 50) |
//! | 2 | [`ExtractionStrategy::BooleanLiteral`] | `True` | 85 |
//! | 3 | [`ExtractionStrategy::StrictLetters`] | `A, C` | 70 |
//! | 4 | [`ExtractionStrategy::LabeledPhrase`] | `... Answer: D` | 65 |
//! | 5 | [`ExtractionStrategy::ShortTextScan`] | `(B).` | 60 |
//!
//! Every function here is pure: the same text always yields the same answer.

use super::parsed::{DEFAULT_CONFIDENCE, ParsedAnswer};
use crate::core::string::collapse_whitespace;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::LazyLock;

pub const BOOLEAN_LITERAL_CONFIDENCE: u8 = 85;
pub const STRICT_LETTERS_CONFIDENCE: u8 = 70;
pub const LABELED_PHRASE_CONFIDENCE: u8 = 65;
pub const SHORT_TEXT_CONFIDENCE: u8 = 60;

/// Longest text (in chars) the short-text scan will look at
const SHORT_TEXT_MAX_CHARS: usize = 10;

/// The whole text is 1-6 option letters, each separated by commas/whitespace
static STRICT_LETTERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[A-F](?:[\s,]+[A-F]){0,5}$").expect("valid strict letters pattern")
});

/// `Answer: B`, `**Jawaban:** a, c`, `Option: (D)`, `"answer": "B"`
static LABELED_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)(?:answer|jawaban|option)["']?\s*\**\s*[:：]\s*\**\s*["']?\(?([A-F](?:\s*[,&/]?\s*[A-F]){0,5})\b"#,
    )
    .expect("valid labeled phrase pattern")
});

/// `B. Paris` or `(C) 42`: a letter label followed by option text
static LEADING_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\(?([A-Z])[\.\):]\s+\S").expect("valid leading label pattern")
});

/// A named extraction strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionStrategy {
    /// JSON object with an `answer` field (and optional `confidence`)
    StructuredJson,
    /// The whole text is `true` or `false`
    BooleanLiteral,
    /// The whole text is a short run of option letters
    StrictLetters,
    /// `answer:` / `jawaban:` / `option:` followed by letters
    LabeledPhrase,
    /// Very short text containing a few standalone letters
    ShortTextScan,
}

impl ExtractionStrategy {
    /// All strategies in priority order
    pub const ORDERED: [ExtractionStrategy; 5] = [
        ExtractionStrategy::StructuredJson,
        ExtractionStrategy::BooleanLiteral,
        ExtractionStrategy::StrictLetters,
        ExtractionStrategy::LabeledPhrase,
        ExtractionStrategy::ShortTextScan,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ExtractionStrategy::StructuredJson => "structured_json",
            ExtractionStrategy::BooleanLiteral => "boolean_literal",
            ExtractionStrategy::StrictLetters => "strict_letters",
            ExtractionStrategy::LabeledPhrase => "labeled_phrase",
            ExtractionStrategy::ShortTextScan => "short_text_scan",
        }
    }

    /// Run this strategy alone
    pub fn apply(&self, text: &str) -> Option<ParsedAnswer> {
        let answer = match self {
            ExtractionStrategy::StructuredJson => structured_json(text),
            ExtractionStrategy::BooleanLiteral => boolean_literal(text),
            ExtractionStrategy::StrictLetters => strict_letters(text),
            ExtractionStrategy::LabeledPhrase => labeled_phrase(text),
            ExtractionStrategy::ShortTextScan => short_text_scan(text),
        }?;
        (!answer.is_empty()).then_some(answer)
    }
}

impl std::fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Tagged result of running the cascade
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Matched {
        answer: ParsedAnswer,
        strategy: ExtractionStrategy,
    },
    NoMatch,
}

impl Extraction {
    pub fn is_match(&self) -> bool {
        matches!(self, Extraction::Matched { .. })
    }

    pub fn strategy(&self) -> Option<ExtractionStrategy> {
        match self {
            Extraction::Matched { strategy, .. } => Some(*strategy),
            Extraction::NoMatch => None,
        }
    }

    /// The parsed answer, or [`ParsedAnswer::empty`] on no match
    pub fn into_answer(self) -> ParsedAnswer {
        match self {
            Extraction::Matched { answer, .. } => answer,
            Extraction::NoMatch => ParsedAnswer::empty(),
        }
    }
}

/// Run the strategy cascade and report which strategy matched.
pub fn extract_tagged(raw: &str) -> Extraction {
    let text = raw.trim();
    if text.is_empty() {
        return Extraction::NoMatch;
    }

    ExtractionStrategy::ORDERED
        .iter()
        .find_map(|strategy| {
            strategy.apply(text).map(|answer| Extraction::Matched {
                answer,
                strategy: *strategy,
            })
        })
        .unwrap_or(Extraction::NoMatch)
}

/// Extract a normalized answer from raw model output.
///
/// Returns an empty answer (confidence 0) when nothing matches.
///
/// # Examples
///
/// ```
/// use ensemble_domain::answer::extract_answer;
///
/// let answer = extract_answer("Reasoning...\n```json\n{\"answer\": \"b\", \"confidence\": 88}\n```");
/// assert_eq!(answer.normalized(), "B");
/// assert_eq!(answer.confidence(), 88);
///
/// assert_eq!(extract_answer("FALSE").normalized(), "false");
/// assert!(extract_answer("I am not sure.").is_empty());
/// ```
pub fn extract_answer(raw: &str) -> ParsedAnswer {
    extract_tagged(raw).into_answer()
}

// ==================== Strategies ====================

fn structured_json(text: &str) -> Option<ParsedAnswer> {
    // The terminal block is the one the prompt asks for, so scan from the end.
    text.rmatch_indices('{')
        .find_map(|(start, _)| answer_object(&text[start..]))
}

/// Parse the JSON value starting at `from_brace`, ignoring trailing text
fn answer_object(from_brace: &str) -> Option<ParsedAnswer> {
    let mut values = serde_json::Deserializer::from_str(from_brace).into_iter::<Value>();
    let Some(Ok(Value::Object(map))) = values.next() else {
        return None;
    };
    let field = |name: &str| {
        map.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    };

    let labels = labels_from_json(field("answer")?);
    if labels.is_empty() {
        return None;
    }
    let confidence = field("confidence")
        .and_then(confidence_from_json)
        .unwrap_or(DEFAULT_CONFIDENCE);
    Some(ParsedAnswer::new(labels, confidence))
}

fn boolean_literal(text: &str) -> Option<ParsedAnswer> {
    if text.eq_ignore_ascii_case("true") {
        Some(ParsedAnswer::boolean(true, BOOLEAN_LITERAL_CONFIDENCE))
    } else if text.eq_ignore_ascii_case("false") {
        Some(ParsedAnswer::boolean(false, BOOLEAN_LITERAL_CONFIDENCE))
    } else {
        None
    }
}

fn strict_letters(text: &str) -> Option<ParsedAnswer> {
    STRICT_LETTERS.is_match(text).then(|| {
        ParsedAnswer::letters(
            text.chars().filter(|c| c.is_ascii_alphabetic()),
            STRICT_LETTERS_CONFIDENCE,
        )
    })
}

fn labeled_phrase(text: &str) -> Option<ParsedAnswer> {
    let captures = LABELED_PHRASE.captures_iter(text).last()?;
    let letters = captures.get(1)?.as_str();
    Some(ParsedAnswer::letters(
        letters.chars().filter(|c| c.is_ascii_alphabetic()),
        LABELED_PHRASE_CONFIDENCE,
    ))
}

fn short_text_scan(text: &str) -> Option<ParsedAnswer> {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() > SHORT_TEXT_MAX_CHARS {
        return None;
    }

    let standalone: BTreeSet<char> = chars
        .iter()
        .enumerate()
        .filter(|&(i, &c)| {
            matches!(c.to_ascii_uppercase(), 'A'..='F')
                && !i
                    .checked_sub(1)
                    .is_some_and(|p| chars[p].is_alphanumeric())
                && !chars.get(i + 1).is_some_and(|n| n.is_alphanumeric())
        })
        .map(|(_, c)| c.to_ascii_uppercase())
        .collect();

    (1..=4)
        .contains(&standalone.len())
        .then(|| ParsedAnswer::letters(standalone, SHORT_TEXT_CONFIDENCE))
}

// ==================== JSON field normalization ====================

fn labels_from_json(value: &Value) -> BTreeSet<String> {
    match value {
        Value::String(s) => normalize_answer_text(s),
        Value::Bool(b) => BTreeSet::from([b.to_string()]),
        Value::Number(n) => BTreeSet::from([n.to_string()]),
        Value::Array(items) => items.iter().flat_map(labels_from_json).collect(),
        Value::Null | Value::Object(_) => BTreeSet::new(),
    }
}

/// Normalize the `answer` string of a structured response.
///
/// Letter lists (`"a, c"`, `"B and D"`, `"AC"`) become letter sets, boolean
/// words become `true`/`false`, `"B. Paris"` becomes `B`; anything else is
/// kept as one upper-cased, whitespace-collapsed label.
pub fn normalize_answer_text(answer: &str) -> BTreeSet<String> {
    let upper = collapse_whitespace(&answer.to_uppercase());
    let bare = upper.trim_end_matches('.');
    if bare.is_empty() {
        return BTreeSet::new();
    }

    match bare {
        "TRUE" | "BENAR" => return BTreeSet::from(["true".to_string()]),
        "FALSE" | "SALAH" => return BTreeSet::from(["false".to_string()]),
        _ => {}
    }

    if let Some(letters) = letter_list(bare) {
        return letters;
    }

    if let Some(captures) = LEADING_LABEL.captures(bare)
        && let Some(letter) = captures.get(1)
    {
        return BTreeSet::from([letter.as_str().to_string()]);
    }

    BTreeSet::from([bare.to_string()])
}

/// Parse `"A, C"`, `"A AND C"`, `"(B)"` or `"ACD"` into letters
fn letter_list(upper: &str) -> Option<BTreeSet<String>> {
    let mut letters = BTreeSet::new();
    let tokens = upper
        .split(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '/' | '&'))
        .map(|t| t.trim_matches(|c: char| matches!(c, '(' | ')' | '.')))
        .filter(|t| !t.is_empty() && *t != "AND" && *t != "DAN");

    for token in tokens {
        let chars: Vec<char> = token.chars().collect();
        match chars.as_slice() {
            [c] if c.is_ascii_uppercase() => {
                letters.insert(c.to_string());
            }
            // Concatenated option letters, e.g. "ACD"
            run if run.len() <= 6
                && run.iter().all(|c| matches!(*c, 'A'..='F'))
                && run.iter().collect::<BTreeSet<_>>().len() == run.len() =>
            {
                letters.extend(run.iter().map(|c| c.to_string()));
            }
            _ => return None,
        }
    }

    (!letters.is_empty()).then_some(letters)
}

fn confidence_from_json(value: &Value) -> Option<u8> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !raw.is_finite() {
        return None;
    }
    // Fractions such as 0.85 are read as percentages
    let percent = if raw > 0.0 && raw < 1.0 { raw * 100.0 } else { raw };
    Some(percent.round().clamp(0.0, 100.0) as u8)
}
