//! Answer Question use case
//!
//! The full request flow: cache lookup, prompt rendering, optional
//! single-call shortcut, ensemble resolution, cache write.

use crate::ports::answer_cache::AnswerCache;
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::resolution_logger::{ResolutionEvent, ResolutionLogger};
use crate::use_cases::consensus_engine::{ConsensusEngine, ResolveError};
use ensemble_domain::{CacheKey, PromptTemplate, ProviderRoster, Question, ResolutionResult};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Input for the AnswerQuestion use case
#[derive(Debug, Clone)]
pub struct AnswerQuestionInput {
    pub question: Question,
    pub roster: ProviderRoster,
}

impl AnswerQuestionInput {
    pub fn new(question: impl Into<Question>, roster: ProviderRoster) -> Self {
        Self {
            question: question.into(),
            roster,
        }
    }
}

/// Use case answering one question through cache and ensemble
pub struct AnswerQuestionUseCase<G: LlmGateway + 'static> {
    engine: ConsensusEngine<G>,
    cache: Arc<dyn AnswerCache>,
    logger: Arc<dyn ResolutionLogger>,
}

impl<G: LlmGateway + 'static> AnswerQuestionUseCase<G> {
    pub fn new(
        engine: ConsensusEngine<G>,
        cache: Arc<dyn AnswerCache>,
        logger: Arc<dyn ResolutionLogger>,
    ) -> Self {
        Self {
            engine,
            cache,
            logger,
        }
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: AnswerQuestionInput,
    ) -> Result<ResolutionResult, ResolveError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: AnswerQuestionInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<ResolutionResult, ResolveError> {
        let started = Instant::now();
        let AnswerQuestionInput { question, roster } = input;

        let evicted = self.cache.evict_expired();
        if evicted > 0 {
            debug!("Evicted {} expired cache entries", evicted);
        }

        let key = CacheKey::for_question(&question);
        if let Some(entry) = self.cache.get(&key) {
            let result = entry
                .to_result()
                .with_elapsed_ms(started.elapsed().as_millis() as u64);
            info!("Cache hit: {}", result);
            progress.on_cache_hit(&result);
            self.log_resolution(&key, &result);
            return Ok(result);
        }
        debug!("Cache miss for key '{}'", key);

        let prompt = PromptTemplate::render(&question);

        let result = if self.engine.params().mode.is_single() {
            match self
                .engine
                .resolve_single(&question, &prompt, &roster, progress)
                .await
            {
                Ok(result) => result,
                Err(first) => {
                    self.engine
                        .resolve_with_prior(&question, &prompt, &roster, vec![first], progress)
                        .await?
                }
            }
        } else {
            self.engine
                .resolve(&question, &prompt, &roster, progress)
                .await?
        };

        let result = result.with_elapsed_ms(started.elapsed().as_millis() as u64);
        self.cache.put(key.clone(), &result);
        info!("Resolved {} in {} ms", result, result.elapsed_ms);
        self.log_resolution(&key, &result);
        Ok(result)
    }

    fn log_resolution(&self, key: &CacheKey, result: &ResolutionResult) {
        self.logger.log(ResolutionEvent::new(
            "resolution",
            serde_json::json!({
                "cache_key": key.as_str(),
                "result": result,
            }),
        ));
    }
}
