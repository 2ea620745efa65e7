//! Provider Client
//!
//! Sends one prompt to one provider and returns a single [`ProviderResult`].
//! Retries are an explicit state machine:
//!
//! ```text
//! Attempting(n) ──success──────────────────────────► Succeeded
//!       │
//!       ├──retryable failure, n < max ──► (backoff) Attempting(n+1)
//!       │
//!       └──fatal failure, or n = max ─────────────► Failed
//! ```
//!
//! A response from which no answer can be extracted counts as a retryable
//! failure, never as a success with an empty answer.

use crate::config::{GenerationParams, RetryPolicy};
use crate::ports::llm_gateway::{GenerationRequest, LlmGateway};
use ensemble_domain::{
    Model, ProviderErrorKind, ProviderResult, QuestionImage, RenderedPrompt, extract_answer,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Outcome of a single attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    Failure(ProviderErrorKind),
}

/// State of one provider call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    /// About to make attempt `n` (1-based)
    Attempting(u32),
    Succeeded,
    Failed,
}

/// Transition after attempt `attempt` finished with `outcome`.
///
/// Pure, so termination and retry decisions are testable without I/O.
pub fn next_state(attempt: u32, max_attempts: u32, outcome: AttemptOutcome) -> AttemptState {
    match outcome {
        AttemptOutcome::Success => AttemptState::Succeeded,
        AttemptOutcome::Failure(kind) if kind.is_retryable() && attempt < max_attempts => {
            AttemptState::Attempting(attempt + 1)
        }
        AttemptOutcome::Failure(_) => AttemptState::Failed,
    }
}

/// Retrying client for a single provider call
pub struct ProviderClient<G: LlmGateway + 'static> {
    gateway: Arc<G>,
    retry: RetryPolicy,
    generation: GenerationParams,
}

impl<G: LlmGateway + 'static> Clone for ProviderClient<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            retry: self.retry,
            generation: self.generation,
        }
    }
}

impl<G: LlmGateway + 'static> ProviderClient<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            retry: RetryPolicy::default(),
            generation: GenerationParams::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_generation(mut self, generation: GenerationParams) -> Self {
        self.generation = generation;
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Invoke `model` until it answers, fails fatally or runs out of attempts.
    ///
    /// Never returns an error: failures are reported in the envelope.
    pub async fn invoke(
        &self,
        model: &Model,
        prompt: &RenderedPrompt,
        image: Option<&QuestionImage>,
    ) -> ProviderResult {
        let started = Instant::now();
        let max_attempts = self.retry.max_attempts.max(1);
        let request = GenerationRequest {
            prompt: prompt.clone(),
            image: image.cloned(),
            temperature: self.generation.temperature,
            max_output_tokens: self.generation.max_output_tokens,
        };

        let mut state = AttemptState::Attempting(1);
        let mut last_error = (ProviderErrorKind::Other, String::new());
        let mut attempts = 0;

        while let AttemptState::Attempting(attempt) = state {
            attempts = attempt;
            debug!("Calling {} (attempt {}/{})", model, attempt, max_attempts);

            match self.attempt(model, &request).await {
                Ok(text) => {
                    let latency_ms = started.elapsed().as_millis() as u64;
                    info!("{} answered in {} ms (attempt {})", model, latency_ms, attempt);
                    return ProviderResult::success(model.to_string(), text)
                        .with_attempts(attempt)
                        .with_latency_ms(latency_ms);
                }
                Err((kind, detail)) => {
                    state = next_state(attempt, max_attempts, AttemptOutcome::Failure(kind));
                    if let AttemptState::Attempting(_) = state {
                        let delay = self.retry.backoff_delay(attempt, kind);
                        warn!(
                            "{} attempt {}/{} failed ({}: {}), retrying in {:?}",
                            model, attempt, max_attempts, kind, detail, delay
                        );
                        tokio::time::sleep(delay).await;
                    } else {
                        warn!(
                            "{} gave up after {} attempt(s): {}: {}",
                            model, attempt, kind, detail
                        );
                    }
                    last_error = (kind, detail);
                }
            }
        }

        let (kind, detail) = last_error;
        ProviderResult::failure(model.to_string(), kind, detail)
            .with_attempts(attempts)
            .with_latency_ms(started.elapsed().as_millis() as u64)
    }

    /// One attempt: call with a deadline, then insist on an extractable answer
    async fn attempt(
        &self,
        model: &Model,
        request: &GenerationRequest,
    ) -> Result<String, (ProviderErrorKind, String)> {
        let call = self.gateway.generate(model, request);
        let text = match tokio::time::timeout(self.retry.call_timeout, call).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => return Err((e.kind(), e.to_string())),
            Err(_) => {
                return Err((
                    ProviderErrorKind::Timeout,
                    format!("no response within {:?}", self.retry.call_timeout),
                ));
            }
        };

        if text.trim().is_empty() {
            return Err((ProviderErrorKind::EmptyOrUnparseable, "empty response".to_string()));
        }
        if extract_answer(&text).is_empty() {
            return Err((
                ProviderErrorKind::EmptyOrUnparseable,
                format!("no answer found in {} chars of output", text.len()),
            ));
        }
        Ok(text)
    }
}
