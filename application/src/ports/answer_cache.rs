//! Answer cache port
//!
//! Process-wide store of resolved answers, keyed by the normalized question.
//! Implementations must tolerate concurrent `get`/`put` from many in-flight
//! resolutions and must treat expired entries as absent.

use ensemble_domain::{CacheEntry, CacheKey, ResolutionResult};

pub trait AnswerCache: Send + Sync {
    /// Fresh entry for `key`, or `None` if absent or expired
    fn get(&self, key: &CacheKey) -> Option<CacheEntry>;

    /// Insert or overwrite the entry for `key`, stamped with the current time
    fn put(&self, key: CacheKey, result: &ResolutionResult);

    /// Remove every expired entry; returns how many were removed
    fn evict_expired(&self) -> usize;
}

/// Cache that never stores anything (caching disabled)
pub struct NoCache;

impl AnswerCache for NoCache {
    fn get(&self, _key: &CacheKey) -> Option<CacheEntry> {
        None
    }

    fn put(&self, _key: CacheKey, _result: &ResolutionResult) {}

    fn evict_expired(&self) -> usize {
        0
    }
}
