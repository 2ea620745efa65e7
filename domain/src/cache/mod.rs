//! Answer cache key and entry
//!
//! The storage itself lives behind the `AnswerCache` port in the application
//! layer; this module only defines what is stored and when it goes stale.

use crate::core::question::Question;
use crate::core::string::collapse_whitespace;
use crate::quorum::{ResolutionMethod, ResolutionResult};
use serde::{Deserialize, Serialize};
use std::hash::{DefaultHasher, Hash, Hasher};

/// Normalized projection of a question used as the cache key
///
/// Whitespace runs are collapsed and text is lower-cased, so two questions
/// that differ only in formatting share a key. Options and kind are part of
/// the key; an attached image contributes a content fingerprint.
///
/// # Example
///
/// ```
/// use ensemble_domain::{Question, cache::CacheKey};
///
/// let a = Question::new("What is  the capital\nof France?").with_option("A", "Paris");
/// let b = Question::new("what is the capital of france? ").with_option("a", " paris");
/// assert_eq!(CacheKey::for_question(&a), CacheKey::for_question(&b));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn for_question(question: &Question) -> Self {
        let mut key = format!(
            "{}|{}",
            normalize_fragment(question.text()),
            question.kind().as_str()
        );

        for option in question.options() {
            key.push('|');
            key.push_str(&normalize_fragment(&option.label));
            key.push('=');
            key.push_str(&normalize_fragment(&option.text));
        }

        if let Some(image) = question.image() {
            let mut hasher = DefaultHasher::new();
            image.data().hash(&mut hasher);
            image.mime_type().hash(&mut hasher);
            key.push_str(&format!("|img:{:016x}", hasher.finish()));
        }

        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn normalize_fragment(s: &str) -> String {
    collapse_whitespace(s).to_lowercase()
}

/// A resolved answer held in the cache
///
/// Only successful resolutions are ever cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub answer: String,
    pub confidence: Option<u8>,
    /// Method of the resolution that produced this entry
    pub method: ResolutionMethod,
    #[serde(default)]
    pub supporting_providers: Vec<String>,
    pub inserted_at_epoch_ms: u64,
}

impl CacheEntry {
    pub fn from_result(key: CacheKey, result: &ResolutionResult, now_epoch_ms: u64) -> Self {
        Self {
            key,
            answer: result.final_answer.clone(),
            confidence: Some(result.final_confidence),
            method: result.method,
            supporting_providers: result.supporting_providers.clone(),
            inserted_at_epoch_ms: now_epoch_ms,
        }
    }

    pub fn age_ms(&self, now_epoch_ms: u64) -> u64 {
        now_epoch_ms.saturating_sub(self.inserted_at_epoch_ms)
    }

    /// An entry is stale once its age exceeds the TTL
    pub fn is_expired(&self, now_epoch_ms: u64, ttl_ms: u64) -> bool {
        self.age_ms(now_epoch_ms) > ttl_ms
    }

    /// Rebuild a result from this entry, flagged as served from cache
    pub fn to_result(&self) -> ResolutionResult {
        ResolutionResult::new(
            self.answer.clone(),
            self.confidence.unwrap_or(0),
            self.method,
        )
        .with_supporting_providers(self.supporting_providers.clone())
        .cached()
    }
}
