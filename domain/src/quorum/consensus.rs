//! Consensus decisions for a resolution round
//!
//! Pure functions over votes: whether the workers agree, and which single
//! vote to fall back on when they do not and the judge is unavailable.

use super::rule::QuorumRule;
use super::tally::VoteTally;
use super::vote::Vote;
use crate::answer::ParsedAnswer;
use crate::core::model::Model;
use serde::{Deserialize, Serialize};

/// How the final answer of a round was decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMethod {
    /// Enough workers agreed, but not all of them
    Majority,
    /// Every worker gave the same answer
    Unanimous,
    /// Fallback to the configured primary worker
    Primary,
    /// Fallback to the configured secondary worker
    Secondary,
    /// Workers disagreed and the judge arbitrated
    Judge,
    /// Fallback to the most confident worker
    FallbackConfidence,
    /// Single-call mode answered confidently on its own
    Single,
}

impl ResolutionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionMethod::Majority => "majority",
            ResolutionMethod::Unanimous => "unanimous",
            ResolutionMethod::Primary => "primary",
            ResolutionMethod::Secondary => "secondary",
            ResolutionMethod::Judge => "judge",
            ResolutionMethod::FallbackConfidence => "fallback_confidence",
            ResolutionMethod::Single => "single",
        }
    }

    /// Whether the answer came from worker agreement
    pub fn is_consensus(&self) -> bool {
        matches!(self, ResolutionMethod::Majority | ResolutionMethod::Unanimous)
    }
}

impl std::fmt::Display for ResolutionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Terminal output of one resolution round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub final_answer: String,
    pub final_confidence: u8,
    pub method: ResolutionMethod,
    pub elapsed_ms: u64,
    /// True when served from the answer cache without provider calls
    #[serde(default)]
    pub from_cache: bool,
    /// Providers whose answer matches `final_answer`, in roster order
    #[serde(default)]
    pub supporting_providers: Vec<String>,
}

impl ResolutionResult {
    pub fn new(
        final_answer: impl Into<String>,
        final_confidence: u8,
        method: ResolutionMethod,
    ) -> Self {
        Self {
            final_answer: final_answer.into(),
            final_confidence: final_confidence.min(100),
            method,
            elapsed_ms: 0,
            from_cache: false,
            supporting_providers: Vec::new(),
        }
    }

    /// Result backed by a single provider's answer
    pub fn from_answer(model: &Model, answer: &ParsedAnswer, method: ResolutionMethod) -> Self {
        Self::new(answer.normalized(), answer.confidence(), method)
            .with_supporting_providers(vec![model.to_string()])
    }

    pub fn with_supporting_providers(mut self, providers: Vec<String>) -> Self {
        self.supporting_providers = providers;
        self
    }

    pub fn with_elapsed_ms(mut self, elapsed_ms: u64) -> Self {
        self.elapsed_ms = elapsed_ms;
        self
    }

    /// Mark as served from cache
    pub fn cached(mut self) -> Self {
        self.from_cache = true;
        self
    }
}

impl std::fmt::Display for ResolutionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}%, {})",
            self.final_answer, self.final_confidence, self.method
        )
    }
}

/// Outcome of checking the worker tally against the agreement rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundDecision {
    /// Workers agreed; the result is final
    Agreed(ResolutionResult),
    /// No answer reached the rule; the judge must arbitrate
    NoAgreement,
}

impl RoundDecision {
    pub fn is_agreed(&self) -> bool {
        matches!(self, RoundDecision::Agreed(_))
    }
}

/// Decide whether the workers agree.
///
/// The top-ranked tally entry wins when its count satisfies `rule` against
/// the full worker roster size. The method is `unanimous` when every worker
/// on the roster gave that answer, `majority` otherwise. The confidence is
/// the entry's average confidence.
///
/// # Example
///
/// ```
/// use ensemble_domain::{Model, ParsedAnswer};
/// use ensemble_domain::quorum::{QuorumRule, ResolutionMethod, RoundDecision, Vote, VoteTally, evaluate};
///
/// let votes = vec![
///     Vote::new(Model::from("w1"), 0, ParsedAnswer::letters(['A'], 90)),
///     Vote::new(Model::from("w2"), 1, ParsedAnswer::letters(['A'], 80)),
///     Vote::new(Model::from("w3"), 2, ParsedAnswer::letters(['B'], 70)),
/// ];
/// let decision = evaluate(&VoteTally::from_votes(&votes), &QuorumRule::default(), 3);
/// let RoundDecision::Agreed(result) = decision else { panic!("expected agreement") };
/// assert_eq!(result.final_answer, "A");
/// assert_eq!(result.method, ResolutionMethod::Majority);
/// assert_eq!(result.final_confidence, 85);
/// ```
pub fn evaluate(tally: &VoteTally, rule: &QuorumRule, worker_count: usize) -> RoundDecision {
    let Some(leader) = tally.leader() else {
        return RoundDecision::NoAgreement;
    };
    if !rule.is_satisfied(leader.count, worker_count) {
        return RoundDecision::NoAgreement;
    }

    let method = if leader.count == worker_count {
        ResolutionMethod::Unanimous
    } else {
        ResolutionMethod::Majority
    };
    RoundDecision::Agreed(
        ResolutionResult::new(leader.answer.clone(), leader.average_confidence(), method)
            .with_supporting_providers(leader.supporting_providers.clone()),
    )
}

/// Pick a single worker vote when neither agreement nor the judge
/// produced an answer.
///
/// Precedence:
/// 1. the `primary` worker, if it voted and its vote is reliable
/// 2. the `secondary` worker, under the same conditions
/// 3. the most confident reliable vote (ties go to roster order)
/// 4. the most confident vote of any kind (ties go to roster order)
///
/// Steps 3 and 4 report `fallback_confidence`. Returns `None` only when
/// there are no usable votes at all.
pub fn select_fallback(
    votes: &[Vote],
    primary: Option<&Model>,
    secondary: Option<&Model>,
) -> Option<ResolutionResult> {
    let usable = || votes.iter().filter(|v| !v.answer.is_empty());
    let designated = |model: Option<&Model>| {
        model.and_then(|m| usable().find(|v| &v.model == m && v.reliable))
    };

    if let Some(vote) = designated(primary) {
        return Some(ResolutionResult::from_answer(
            &vote.model,
            &vote.answer,
            ResolutionMethod::Primary,
        ));
    }
    if let Some(vote) = designated(secondary) {
        return Some(ResolutionResult::from_answer(
            &vote.model,
            &vote.answer,
            ResolutionMethod::Secondary,
        ));
    }

    let most_confident = |only_reliable: bool| {
        usable()
            .filter(|v| v.reliable || !only_reliable)
            .min_by_key(|v| (std::cmp::Reverse(v.confidence()), v.roster_index))
    };
    most_confident(true)
        .or_else(|| most_confident(false))
        .map(|vote| {
            ResolutionResult::from_answer(
                &vote.model,
                &vote.answer,
                ResolutionMethod::FallbackConfidence,
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vote(model: &str, index: usize, letters: &[char], confidence: u8) -> Vote {
        Vote::new(
            Model::from(model),
            index,
            ParsedAnswer::letters(letters.iter().copied(), confidence),
        )
    }

    fn decide(votes: &[Vote], workers: usize) -> RoundDecision {
        evaluate(&VoteTally::from_votes(votes), &QuorumRule::default(), workers)
    }

    // ==================== evaluate ====================

    #[test]
    fn test_majority() {
        let decision = decide(
            &[
                vote("w1", 0, &['A'], 90),
                vote("w2", 1, &['A'], 80),
                vote("w3", 2, &['B'], 70),
            ],
            3,
        );
        let RoundDecision::Agreed(result) = decision else {
            panic!("expected agreement");
        };
        assert_eq!(result.final_answer, "A");
        assert_eq!(result.method, ResolutionMethod::Majority);
        assert_eq!(result.final_confidence, 85);
        assert_eq!(result.supporting_providers, vec!["w1", "w2"]);
    }

    #[test]
    fn test_unanimous() {
        let decision = decide(
            &[
                vote("w1", 0, &['A'], 90),
                vote("w2", 1, &['A'], 85),
                vote("w3", 2, &['A'], 95),
            ],
            3,
        );
        let RoundDecision::Agreed(result) = decision else {
            panic!("expected agreement");
        };
        assert_eq!(result.method, ResolutionMethod::Unanimous);
        assert_eq!(result.final_confidence, 90);
    }

    #[test]
    fn test_agreement_of_survivors_is_majority_not_unanimous() {
        // Third worker failed; two agreeing survivors are not the full roster
        let decision = decide(&[vote("w1", 0, &['C'], 90), vote("w2", 1, &['C'], 70)], 3);
        let RoundDecision::Agreed(result) = decision else {
            panic!("expected agreement");
        };
        assert_eq!(result.method, ResolutionMethod::Majority);
    }

    #[test]
    fn test_no_agreement() {
        let decision = decide(
            &[
                vote("w1", 0, &['A'], 90),
                vote("w2", 1, &['B'], 85),
                vote("w3", 2, &['C'], 70),
            ],
            3,
        );
        assert_eq!(decision, RoundDecision::NoAgreement);
        assert_eq!(decide(&[], 3), RoundDecision::NoAgreement);
    }

    #[test]
    fn test_stricter_rule() {
        let votes = [
            vote("w1", 0, &['A'], 90),
            vote("w2", 1, &['A'], 80),
            vote("w3", 2, &['B'], 70),
        ];
        let decision = evaluate(&VoteTally::from_votes(&votes), &QuorumRule::Unanimous, 3);
        assert!(!decision.is_agreed());
    }

    // ==================== select_fallback ====================

    #[test]
    fn test_fallback_highest_confidence() {
        let votes = [
            vote("w1", 0, &['A'], 90),
            vote("w2", 1, &['B'], 85),
            vote("w3", 2, &['C'], 70),
        ];
        let result = select_fallback(&votes, None, None).unwrap();
        assert_eq!(result.final_answer, "A");
        assert_eq!(result.final_confidence, 90);
        assert_eq!(result.method, ResolutionMethod::FallbackConfidence);
        assert_eq!(result.supporting_providers, vec!["w1"]);
    }

    #[test]
    fn test_fallback_skips_unreliable() {
        let votes = [
            Vote::unreliable(
                Model::from("w1"),
                0,
                ParsedAnswer::letters(['A', 'B', 'C', 'D'], 40),
            ),
            vote("w2", 1, &['B'], 35),
        ];
        let result = select_fallback(&votes, None, None).unwrap();
        assert_eq!(result.final_answer, "B");
    }

    #[test]
    fn test_fallback_uses_unreliable_when_nothing_else() {
        let votes = [Vote::unreliable(
            Model::from("w1"),
            0,
            ParsedAnswer::letters(['A', 'B', 'C', 'D'], 40),
        )];
        let result = select_fallback(&votes, None, None).unwrap();
        assert_eq!(result.final_answer, "A, B, C, D");
        assert_eq!(result.method, ResolutionMethod::FallbackConfidence);
    }

    #[test]
    fn test_fallback_tie_goes_to_roster_order() {
        let votes = [vote("w2", 1, &['B'], 80), vote("w1", 0, &['A'], 80)];
        assert_eq!(select_fallback(&votes, None, None).unwrap().final_answer, "A");
    }

    #[test]
    fn test_primary_then_secondary() {
        let votes = [
            vote("w1", 0, &['A'], 90),
            vote("w2", 1, &['B'], 60),
            vote("w3", 2, &['C'], 50),
        ];
        let w2 = Model::from("w2");
        let w3 = Model::from("w3");

        let result = select_fallback(&votes, Some(&w2), Some(&w3)).unwrap();
        assert_eq!(result.final_answer, "B");
        assert_eq!(result.method, ResolutionMethod::Primary);

        // Primary absent from the votes: secondary takes over
        let result = select_fallback(&votes[..1], Some(&w2), Some(&Model::from("w1"))).unwrap();
        assert_eq!(result.method, ResolutionMethod::Secondary);
        assert_eq!(result.final_answer, "A");
    }

    #[test]
    fn test_unreliable_primary_is_skipped() {
        let votes = [
            Vote::unreliable(
                Model::from("w1"),
                0,
                ParsedAnswer::letters(['A', 'B', 'C', 'D'], 40),
            ),
            vote("w2", 1, &['B'], 60),
        ];
        let result = select_fallback(&votes, Some(&Model::from("w1")), None).unwrap();
        assert_eq!(result.method, ResolutionMethod::FallbackConfidence);
        assert_eq!(result.final_answer, "B");
    }

    #[test]
    fn test_no_votes_no_fallback() {
        assert!(select_fallback(&[], None, None).is_none());
    }

    #[test]
    fn test_method_serializes_snake_case() {
        let json = serde_json::to_string(&ResolutionMethod::FallbackConfidence).unwrap();
        assert_eq!(json, "\"fallback_confidence\"");
    }
}
