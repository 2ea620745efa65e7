//! Consensus Engine
//!
//! One resolution round: parallel worker fan-out, vote tally, and a
//! sequential judge call only when the workers do not agree.

use crate::config::ResolutionParams;
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::progress::ProgressNotifier;
use crate::ports::resolution_logger::{ResolutionEvent, ResolutionLogger};
use crate::use_cases::invoke_provider::ProviderClient;
use ensemble_domain::quorum::{evaluate, select_fallback};
use ensemble_domain::{
    DomainError, Model, Phase, ProviderErrorKind, ProviderResult, ProviderRoster, Question,
    RenderedPrompt, ResolutionMethod, ResolutionResult, RoundDecision, Vote, VoteTally,
};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// One provider's final failure, as reported in [`ResolveError::EnsembleExhausted`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderFailure {
    pub provider_id: String,
    pub kind: ProviderErrorKind,
    pub detail: Option<String>,
}

impl ProviderFailure {
    fn from_result(result: &ProviderResult) -> Self {
        Self {
            provider_id: result.provider_id.clone(),
            kind: result.error_kind.unwrap_or(ProviderErrorKind::EmptyOrUnparseable),
            detail: result.error_detail.clone(),
        }
    }
}

impl std::fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.provider_id, self.kind)
    }
}

/// Errors that can occur during resolution
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("No worker models configured")]
    NoWorkers,

    #[error("Invalid roster: {0}")]
    InvalidRoster(String),

    #[error("Every worker and the judge failed ({})", format_failures(.failures))]
    EnsembleExhausted { failures: Vec<ProviderFailure> },
}

impl ResolveError {
    /// Stable classification for callers and JSON output
    pub fn kind(&self) -> &'static str {
        match self {
            ResolveError::NoWorkers => "no_workers",
            ResolveError::InvalidRoster(_) => "invalid_roster",
            ResolveError::EnsembleExhausted { .. } => "ensemble_exhausted",
        }
    }
}

impl From<DomainError> for ResolveError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NoWorkers => ResolveError::NoWorkers,
            other => ResolveError::InvalidRoster(other.to_string()),
        }
    }
}

fn format_failures(failures: &[ProviderFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Runs resolution rounds against a roster
pub struct ConsensusEngine<G: LlmGateway + 'static> {
    client: ProviderClient<G>,
    params: ResolutionParams,
    logger: Arc<dyn ResolutionLogger>,
}

impl<G: LlmGateway + 'static> ConsensusEngine<G> {
    pub fn new(
        client: ProviderClient<G>,
        params: ResolutionParams,
        logger: Arc<dyn ResolutionLogger>,
    ) -> Self {
        Self {
            client,
            params,
            logger,
        }
    }

    pub fn params(&self) -> &ResolutionParams {
        &self.params
    }

    /// Ask only the first worker.
    ///
    /// Returns the answer with `method = single` when it is reliable and at
    /// least `single_min_confidence`; otherwise returns the raw result so an
    /// ensemble round can reuse it instead of asking that worker again.
    pub async fn resolve_single(
        &self,
        question: &Question,
        prompt: &RenderedPrompt,
        roster: &ProviderRoster,
        progress: &dyn ProgressNotifier,
    ) -> Result<ResolutionResult, ProviderResult> {
        let model = roster.first_worker();
        progress.on_phase_start(&Phase::Single, 1);
        let result = self.client.invoke(model, prompt, question.image()).await;
        progress.on_task_complete(&Phase::Single, model, result.succeeded);
        progress.on_phase_complete(&Phase::Single);
        self.log_provider_result(Phase::Single, &result);

        let (answer, reliable) = self.params.reliability.assess(result.answer(), question);
        if !answer.is_empty() && reliable && answer.confidence() >= self.params.single_min_confidence
        {
            info!("Single call: {} answered {} confidently", model, answer);
            return Ok(ResolutionResult::from_answer(
                model,
                &answer,
                ResolutionMethod::Single,
            ));
        }

        info!(
            "Single call: {} not confident enough ({}), escalating to ensemble",
            model,
            if answer.is_empty() {
                "no answer".to_string()
            } else {
                answer.to_string()
            }
        );
        Err(result)
    }

    /// Run a full resolution round
    pub async fn resolve(
        &self,
        question: &Question,
        prompt: &RenderedPrompt,
        roster: &ProviderRoster,
        progress: &dyn ProgressNotifier,
    ) -> Result<ResolutionResult, ResolveError> {
        self.resolve_with_prior(question, prompt, roster, Vec::new(), progress)
            .await
    }

    /// Run a round, reusing worker results already obtained this request
    pub async fn resolve_with_prior(
        &self,
        question: &Question,
        prompt: &RenderedPrompt,
        roster: &ProviderRoster,
        prior: Vec<ProviderResult>,
        progress: &dyn ProgressNotifier,
    ) -> Result<ResolutionResult, ResolveError> {
        if roster.workers().is_empty() {
            return Err(ResolveError::NoWorkers);
        }

        info!(
            "Resolving with {} workers, judge {}",
            roster.worker_count(),
            roster.judge()
        );

        // Phase 1: all workers in parallel
        let results = self
            .run_workers(question, prompt, roster, prior, progress)
            .await;
        let votes = self.collect_votes(question, roster, &results);
        let tally = VoteTally::from_votes(&votes);
        info!("Worker tally: [{}]", tally.summary());

        if let RoundDecision::Agreed(result) =
            evaluate(&tally, &self.params.rule, roster.worker_count())
        {
            info!("Workers agreed ({}): {}", result.method, result.final_answer);
            return Ok(result);
        }

        // Phase 2: judge, strictly after the join
        info!(
            "No agreement under rule '{}', consulting judge {}",
            self.params.rule,
            roster.judge()
        );
        let judge = roster.judge();
        progress.on_phase_start(&Phase::Judge, 1);
        let judge_result = self.client.invoke(judge, prompt, question.image()).await;
        progress.on_task_complete(&Phase::Judge, judge, judge_result.succeeded);
        progress.on_phase_complete(&Phase::Judge);
        self.log_provider_result(Phase::Judge, &judge_result);

        let judge_answer = judge_result.answer();
        if judge_result.succeeded && !judge_answer.is_empty() {
            info!("Judge {} decided {}", judge, judge_answer);
            return Ok(ResolutionResult::from_answer(
                judge,
                &judge_answer,
                ResolutionMethod::Judge,
            ));
        }

        // Phase 3: judge unavailable, fall back on a single worker
        warn!(
            "Judge {} failed ({}), falling back",
            judge,
            judge_result
                .failure_summary()
                .unwrap_or_else(|| "no answer".to_string())
        );
        if let Some(result) = select_fallback(
            &votes,
            self.params.primary.as_ref(),
            self.params.secondary.as_ref(),
        ) {
            info!("Fallback ({}): {}", result.method, result.final_answer);
            return Ok(result);
        }

        let failures: Vec<ProviderFailure> = results
            .iter()
            .chain(std::iter::once(&judge_result))
            .map(ProviderFailure::from_result)
            .collect();
        warn!("Ensemble exhausted: {}", format_failures(&failures));
        Err(ResolveError::EnsembleExhausted { failures })
    }

    /// Invoke every worker not already covered by `prior`, concurrently.
    ///
    /// Results come back in roster order regardless of completion order.
    async fn run_workers(
        &self,
        question: &Question,
        prompt: &RenderedPrompt,
        roster: &ProviderRoster,
        prior: Vec<ProviderResult>,
        progress: &dyn ProgressNotifier,
    ) -> Vec<ProviderResult> {
        let mut slots: Vec<Option<ProviderResult>> = vec![None; roster.worker_count()];
        for result in prior {
            let model = Model::from(result.provider_id.as_str());
            if let Some(index) = roster.position(&model) {
                debug!("Reusing earlier result from {}", model);
                slots[index] = Some(result);
            }
        }

        let pending = slots.iter().filter(|s| s.is_none()).count();
        progress.on_phase_start(&Phase::Workers, pending);

        let mut join_set = JoinSet::new();
        for (index, model) in roster.workers().iter().enumerate() {
            if slots[index].is_some() {
                continue;
            }
            let client = self.client.clone();
            let model = model.clone();
            let prompt = prompt.clone();
            let image = question.image().cloned();

            join_set.spawn(async move {
                let result = client.invoke(&model, &prompt, image.as_ref()).await;
                (index, model, result)
            });
        }

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, model, result)) => {
                    progress.on_task_complete(&Phase::Workers, &model, result.succeeded);
                    self.log_provider_result(Phase::Workers, &result);
                    slots[index] = Some(result);
                }
                Err(e) => {
                    warn!("Worker task join error: {}", e);
                }
            }
        }

        // A task that panicked never filled its slot
        for (slot, model) in slots.iter_mut().zip(roster.workers()) {
            if slot.is_none() {
                let result = ProviderResult::failure(
                    model.as_str(),
                    ProviderErrorKind::Other,
                    "worker task aborted",
                );
                progress.on_task_complete(&Phase::Workers, model, false);
                self.log_provider_result(Phase::Workers, &result);
                *slot = Some(result);
            }
        }
        progress.on_phase_complete(&Phase::Workers);

        slots.into_iter().flatten().collect()
    }

    /// Parse successful results and apply the reliability policy
    fn collect_votes(
        &self,
        question: &Question,
        roster: &ProviderRoster,
        results: &[ProviderResult],
    ) -> Vec<Vote> {
        results
            .iter()
            .filter(|r| r.succeeded)
            .filter_map(|result| {
                let model = Model::from(result.provider_id.as_str());
                let index = roster.position(&model)?;
                let parsed = result.answer();
                if parsed.is_empty() {
                    debug!("Discarding unparseable vote from {}", model);
                    return None;
                }
                let (answer, reliable) = self.params.reliability.assess(parsed, question);
                if reliable {
                    Some(Vote::new(model, index, answer))
                } else {
                    warn!(
                        "{} listed {} options, confidence capped to {}",
                        model,
                        answer.letter_count(),
                        answer.confidence()
                    );
                    Some(Vote::unreliable(model, index, answer))
                }
            })
            .collect()
    }

    fn log_provider_result(&self, phase: Phase, result: &ProviderResult) {
        self.logger.log(ResolutionEvent::new(
            "provider_result",
            serde_json::json!({
                "phase": phase.as_str(),
                "result": result,
            }),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryPolicy;
    use crate::ports::llm_gateway::GatewayError;
    use crate::ports::progress::NoProgress;
    use crate::ports::resolution_logger::NoResolutionLogger;
    use crate::use_cases::test_support::{FixedGateway, RecordingProgress};
    use ensemble_domain::PromptTemplate;

    fn engine(gateway: FixedGateway) -> (Arc<FixedGateway>, ConsensusEngine<FixedGateway>) {
        let gateway = Arc::new(gateway);
        let client = ProviderClient::new(Arc::clone(&gateway)).with_retry(RetryPolicy::immediate(1));
        let engine = ConsensusEngine::new(
            client,
            ResolutionParams::default(),
            Arc::new(NoResolutionLogger),
        );
        (gateway, engine)
    }

    fn question() -> Question {
        Question::new("Is 7 prime?").with_kind(ensemble_domain::QuestionKind::TrueFalse)
    }

    #[tokio::test]
    async fn test_true_false_majority() {
        let (gateway, engine) = engine(
            FixedGateway::new()
                .raw("w1", "TRUE")
                .answer("w2", "true", 90)
                .answer("w3", "False", 60),
        );
        let roster = ProviderRoster::from_models(vec![
            Model::from("w1"),
            Model::from("w2"),
            Model::from("w3"),
            Model::from("judge"),
        ])
        .unwrap();
        let prompt = PromptTemplate::render(&question());
        let result = engine
            .resolve(&question(), &prompt, &roster, &NoProgress)
            .await
            .unwrap();

        assert_eq!(result.final_answer, "true");
        assert_eq!(result.method, ResolutionMethod::Majority);
        // (85 + 90) / 2 rounds to 88
        assert_eq!(result.final_confidence, 88);
        assert_eq!(gateway.calls("judge"), 0);
    }

    #[tokio::test]
    async fn test_panicking_worker_counts_as_failure() {
        let (_, engine) = engine(
            FixedGateway::new()
                .panic_on("w1")
                .fail("w2", GatewayError::Http {
                    status: 401,
                    message: "denied".to_string(),
                })
                .fail("judge", GatewayError::Timeout),
        );
        let roster = ProviderRoster::from_models(vec![
            Model::from("w1"),
            Model::from("w2"),
            Model::from("judge"),
        ])
        .unwrap();
        let prompt = PromptTemplate::render(&question());

        let err = engine
            .resolve(&question(), &prompt, &roster, &NoProgress)
            .await
            .unwrap_err();
        match err {
            ResolveError::EnsembleExhausted { failures } => {
                let ids: Vec<_> = failures.iter().map(|f| f.provider_id.as_str()).collect();
                assert_eq!(ids, ["w1", "w2", "judge"]);
                assert_eq!(failures[0].kind, ProviderErrorKind::Other);
                assert_eq!(failures[1].kind, ProviderErrorKind::AuthError);
            }
            other => panic!("expected exhaustion, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_phases_reported_in_order() {
        let (_, engine) = engine(
            FixedGateway::new()
                .answer("w1", "true", 90)
                .answer("w2", "false", 90)
                .answer("judge", "false", 70),
        );
        let roster = ProviderRoster::from_models(vec![
            Model::from("w1"),
            Model::from("w2"),
            Model::from("judge"),
        ])
        .unwrap();
        let progress = RecordingProgress::default();
        let prompt = PromptTemplate::render(&question());
        let result = engine
            .resolve(&question(), &prompt, &roster, &progress)
            .await
            .unwrap();

        assert_eq!(result.method, ResolutionMethod::Judge);
        assert_eq!(
            *progress.phases.lock().unwrap(),
            vec![(Phase::Workers, 2), (Phase::Judge, 1)]
        );
    }

    #[test]
    fn test_resolve_error_kinds() {
        assert_eq!(ResolveError::NoWorkers.kind(), "no_workers");
        assert_eq!(ResolveError::InvalidRoster("x".into()).kind(), "invalid_roster");

        let err = ResolveError::EnsembleExhausted {
            failures: vec![ProviderFailure {
                provider_id: "gpt-4o".to_string(),
                kind: ProviderErrorKind::AuthError,
                detail: None,
            }],
        };
        assert_eq!(err.kind(), "ensemble_exhausted");
        assert_eq!(
            err.to_string(),
            "Every worker and the judge failed (gpt-4o: auth_error)"
        );
    }

    #[test]
    fn test_from_domain_error() {
        assert_eq!(ResolveError::from(DomainError::NoWorkers), ResolveError::NoWorkers);
        assert!(matches!(
            ResolveError::from(DomainError::InvalidRoster("dup".into())),
            ResolveError::InvalidRoster(_)
        ));
    }

    #[test]
    fn test_failure_keeps_kind_and_detail() {
        let result = ProviderResult::failure("w1", ProviderErrorKind::Timeout, "slow");
        let failure = ProviderFailure::from_result(&result);
        assert_eq!(failure.kind, ProviderErrorKind::Timeout);
        assert_eq!(failure.detail.as_deref(), Some("slow"));
    }
}
