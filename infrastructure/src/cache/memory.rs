//! In-memory TTL answer cache.

use ensemble_application::AnswerCache;
use ensemble_domain::{CacheEntry, CacheKey, ResolutionResult};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// Source of "now" in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// Wall clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_millis() as u64
    }
}

/// Process-wide answer cache behind one coarse lock.
///
/// Only resolved answers are stored. Entries older than the TTL behave as
/// absent on `get` and are dropped by `evict_expired`.
pub struct MemoryAnswerCache<C: Clock = SystemClock> {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    ttl_ms: u64,
    clock: C,
}

impl MemoryAnswerCache<SystemClock> {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, SystemClock)
    }
}

impl<C: Clock> MemoryAnswerCache<C> {
    pub fn with_clock(ttl: Duration, clock: C) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl_ms: ttl.as_millis() as u64,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<C: Clock> AnswerCache for MemoryAnswerCache<C> {
    fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        let entries = self.entries.lock().ok()?;
        let entry = entries.get(key)?;
        if entry.is_expired(self.clock.now_ms(), self.ttl_ms) {
            debug!("Cache entry expired: {}", key);
            return None;
        }
        Some(entry.clone())
    }

    fn put(&self, key: CacheKey, result: &ResolutionResult) {
        let entry = CacheEntry::from_result(key.clone(), result, self.clock.now_ms());
        match self.entries.lock() {
            Ok(mut entries) => {
                entries.insert(key, entry);
            }
            Err(_) => warn!("Answer cache lock poisoned; dropping entry for {}", key),
        }
    }

    fn evict_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let Ok(mut entries) = self.entries.lock() else {
            return 0;
        };
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now, self.ttl_ms));
        let evicted = before - entries.len();
        if evicted > 0 {
            debug!("Evicted {} expired cache entries", evicted);
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ensemble_domain::{Model, ParsedAnswer, Question, ResolutionMethod};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[derive(Clone, Default)]
    struct ManualClock(Arc<AtomicU64>);

    impl ManualClock {
        fn advance(&self, ms: u64) {
            self.0.fetch_add(ms, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_ms(&self) -> u64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    fn result(answer: &str) -> ResolutionResult {
        ResolutionResult::from_answer(
            &Model::Gemini25Flash,
            &ParsedAnswer::letters(answer.chars(), 90),
            ResolutionMethod::Unanimous,
        )
    }

    fn key(text: &str) -> CacheKey {
        CacheKey::for_question(&Question::new(text))
    }

    #[test]
    fn test_put_then_get() {
        let cache = MemoryAnswerCache::with_clock(Duration::from_secs(60), ManualClock::default());
        cache.put(key("Capital of France?"), &result("A"));

        let entry = cache.get(&key("capital  of france?")).unwrap();
        assert_eq!(entry.answer, "A");
        assert_eq!(entry.method, ResolutionMethod::Unanimous);
        assert!(cache.get(&key("Capital of Spain?")).is_none());
    }

    #[test]
    fn test_entry_at_ttl_is_still_fresh() {
        let clock = ManualClock::default();
        let cache = MemoryAnswerCache::with_clock(Duration::from_millis(1_000), clock.clone());
        cache.put(key("q"), &result("B"));

        clock.advance(1_000);
        assert!(cache.get(&key("q")).is_some());

        clock.advance(1);
        assert!(cache.get(&key("q")).is_none());
    }

    #[test]
    fn test_put_overwrites_and_refreshes() {
        let clock = ManualClock::default();
        let cache = MemoryAnswerCache::with_clock(Duration::from_millis(100), clock.clone());
        cache.put(key("q"), &result("A"));
        clock.advance(80);
        cache.put(key("q"), &result("C"));
        clock.advance(80);

        let entry = cache.get(&key("q")).unwrap();
        assert_eq!(entry.answer, "C");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_evict_expired() {
        let clock = ManualClock::default();
        let cache = MemoryAnswerCache::with_clock(Duration::from_millis(100), clock.clone());
        cache.put(key("old"), &result("A"));
        clock.advance(150);
        cache.put(key("new"), &result("B"));

        assert_eq!(cache.evict_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key("new")).is_some());
        assert_eq!(cache.evict_expired(), 0);
    }

    #[test]
    fn test_concurrent_access() {
        let cache = Arc::new(MemoryAnswerCache::new(Duration::from_secs(60)));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for j in 0..50 {
                        let k = key(&format!("question {}", (i * 50 + j) % 20));
                        cache.put(k.clone(), &result("A"));
                        assert!(cache.get(&k).is_some());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 20);
    }
}
