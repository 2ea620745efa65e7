//! Test doubles shared by the use case tests.

use crate::ports::answer_cache::AnswerCache;
use crate::ports::llm_gateway::{GatewayError, GenerationRequest, LlmGateway};
use crate::ports::progress::ProgressNotifier;
use crate::ports::resolution_logger::{ResolutionEvent, ResolutionLogger};
use async_trait::async_trait;
use ensemble_domain::{CacheEntry, CacheKey, Model, Phase, ResolutionResult};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Gateway answering each model with a fixed response, counting calls
#[derive(Default)]
pub struct FixedGateway {
    responses: HashMap<String, Result<String, GatewayError>>,
    panics: HashSet<String>,
    calls: Mutex<HashMap<String, u32>>,
}

impl FixedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// `model` answers with a JSON block for `answer` at `confidence`
    pub fn answer(self, model: &str, answer: &str, confidence: u8) -> Self {
        self.raw(
            model,
            format!(
                "Reasoning about the options...\n{{\"answer\": \"{}\", \"confidence\": {}}}",
                answer, confidence
            ),
        )
    }

    pub fn raw(mut self, model: &str, text: impl Into<String>) -> Self {
        self.responses.insert(model.to_string(), Ok(text.into()));
        self
    }

    pub fn fail(mut self, model: &str, error: GatewayError) -> Self {
        self.responses.insert(model.to_string(), Err(error));
        self
    }

    /// `model` panics inside its worker task
    pub fn panic_on(mut self, model: &str) -> Self {
        self.panics.insert(model.to_string());
        self
    }

    pub fn calls(&self, model: &str) -> u32 {
        self.calls.lock().unwrap().get(model).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> u32 {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl LlmGateway for FixedGateway {
    async fn generate(
        &self,
        model: &Model,
        _request: &GenerationRequest,
    ) -> Result<String, GatewayError> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(model.to_string())
            .or_default() += 1;
        if self.panics.contains(model.as_str()) {
            panic!("gateway crashed for {}", model);
        }
        self.responses
            .get(model.as_str())
            .cloned()
            .unwrap_or_else(|| Err(GatewayError::ModelNotAvailable(model.to_string())))
    }
}

/// Cache with a manually advanced clock
pub struct ManualCache {
    ttl_ms: u64,
    now_ms: Mutex<u64>,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl ManualCache {
    pub fn new(ttl_ms: u64) -> Self {
        Self {
            ttl_ms,
            now_ms: Mutex::new(0),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn advance(&self, ms: u64) {
        *self.now_ms.lock().unwrap() += ms;
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    fn now(&self) -> u64 {
        *self.now_ms.lock().unwrap()
    }
}

impl AnswerCache for ManualCache {
    fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        let now = self.now();
        self.entries
            .lock()
            .unwrap()
            .get(key)
            .filter(|e| !e.is_expired(now, self.ttl_ms))
            .cloned()
    }

    fn put(&self, key: CacheKey, result: &ResolutionResult) {
        let entry = CacheEntry::from_result(key.clone(), result, self.now());
        self.entries.lock().unwrap().insert(key, entry);
    }

    fn evict_expired(&self) -> usize {
        let now = self.now();
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired(now, self.ttl_ms));
        before - entries.len()
    }
}

/// Logger keeping every event type in order
#[derive(Default)]
pub struct RecordingLogger {
    pub events: Mutex<Vec<(&'static str, serde_json::Value)>>,
}

impl RecordingLogger {
    pub fn event_types(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }
}

impl ResolutionLogger for RecordingLogger {
    fn log(&self, event: ResolutionEvent) {
        self.events
            .lock()
            .unwrap()
            .push((event.event_type, event.payload));
    }
}

/// Progress notifier recording phase starts
#[derive(Default)]
pub struct RecordingProgress {
    pub phases: Mutex<Vec<(Phase, usize)>>,
    pub cache_hits: Mutex<u32>,
}

impl ProgressNotifier for RecordingProgress {
    fn on_phase_start(&self, phase: &Phase, total_tasks: usize) {
        self.phases.lock().unwrap().push((*phase, total_tasks));
    }

    fn on_task_complete(&self, _phase: &Phase, _model: &Model, _success: bool) {}

    fn on_phase_complete(&self, _phase: &Phase) {}

    fn on_cache_hit(&self, _result: &ResolutionResult) {
        *self.cache_hits.lock().unwrap() += 1;
    }
}
