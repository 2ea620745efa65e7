//! Reliability policy for over-broad answers
//!
//! A model that lists most of the options instead of committing to one is
//! almost certainly hedging. Such answers keep their vote but have their
//! confidence capped and are excluded from confidence-based fallback.

use crate::answer::ParsedAnswer;
use crate::core::question::{Question, QuestionKind};

/// Letter count at which an answer is considered unreliable
pub const DEFAULT_MAX_LETTERS: usize = 4;
/// Confidence ceiling applied to unreliable answers
pub const DEFAULT_CONFIDENCE_CAP: u8 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReliabilityPolicy {
    /// An answer with this many distinct letters (or more) is unreliable
    pub max_letters: usize,
    /// Confidence ceiling for unreliable answers
    pub confidence_cap: u8,
    /// Lower the threshold to the option count for short option lists
    pub scale_with_options: bool,
}

impl Default for ReliabilityPolicy {
    fn default() -> Self {
        Self {
            max_letters: DEFAULT_MAX_LETTERS,
            confidence_cap: DEFAULT_CONFIDENCE_CAP,
            scale_with_options: false,
        }
    }
}

impl ReliabilityPolicy {
    /// Letter-count threshold for a given question.
    ///
    /// With scaling on, a single-choice or true/false question with 3
    /// options gets a threshold of 3: picking every option is a hedge.
    /// Multi-select questions always use `max_letters`.
    pub fn threshold_for(&self, question: &Question) -> usize {
        let option_count = question.options().len();
        if self.scale_with_options
            && option_count >= 2
            && question.kind() != QuestionKind::MultiSelect
        {
            self.max_letters.min(option_count)
        } else {
            self.max_letters
        }
    }

    /// Apply the policy to a parsed answer.
    ///
    /// Returns the answer with its effective confidence and whether it is
    /// still considered reliable.
    pub fn assess(&self, answer: ParsedAnswer, question: &Question) -> (ParsedAnswer, bool) {
        if answer.letter_count() >= self.threshold_for(question) {
            let capped = answer.confidence().min(self.confidence_cap);
            (answer.with_confidence(capped), false)
        } else {
            (answer, true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four_options(kind: QuestionKind) -> Question {
        Question::new("Which are prime?")
            .with_option("A", "2")
            .with_option("B", "3")
            .with_option("C", "4")
            .with_option("D", "5")
            .with_kind(kind)
    }

    #[test]
    fn test_four_letters_are_capped() {
        let policy = ReliabilityPolicy::default();
        let question = four_options(QuestionKind::SingleChoice);
        let (answer, reliable) =
            policy.assess(ParsedAnswer::letters(['A', 'B', 'C', 'D'], 95), &question);
        assert!(!reliable);
        assert_eq!(answer.confidence(), 40);
        assert_eq!(answer.normalized(), "A, B, C, D");
    }

    #[test]
    fn test_low_confidence_is_not_raised() {
        let policy = ReliabilityPolicy::default();
        let question = four_options(QuestionKind::SingleChoice);
        let (answer, reliable) =
            policy.assess(ParsedAnswer::letters(['A', 'B', 'C', 'D'], 20), &question);
        assert!(!reliable);
        assert_eq!(answer.confidence(), 20);
    }

    #[test]
    fn test_three_letters_are_reliable_by_default() {
        let policy = ReliabilityPolicy::default();
        let question = four_options(QuestionKind::MultiSelect);
        let (answer, reliable) =
            policy.assess(ParsedAnswer::letters(['A', 'B', 'D'], 75), &question);
        assert!(reliable);
        assert_eq!(answer.confidence(), 75);
    }

    #[test]
    fn test_boolean_answers_are_reliable() {
        let policy = ReliabilityPolicy::default();
        let question = Question::new("Water boils at 100C at sea level.")
            .with_kind(QuestionKind::TrueFalse);
        assert!(policy.assess(ParsedAnswer::boolean(true, 90), &question).1);
    }

    #[test]
    fn test_threshold_scales_with_option_count() {
        let policy = ReliabilityPolicy {
            scale_with_options: true,
            ..ReliabilityPolicy::default()
        };
        let three = Question::new("Pick one")
            .with_option("A", "x")
            .with_option("B", "y")
            .with_option("C", "z");
        assert_eq!(policy.threshold_for(&three), 3);
        assert!(!policy.assess(ParsedAnswer::letters(['A', 'B', 'C'], 80), &three).1);

        // Multi-select keeps the fixed threshold
        let multi = three.clone().with_kind(QuestionKind::MultiSelect);
        assert_eq!(policy.threshold_for(&multi), 4);

        // No options listed: nothing to scale with
        assert_eq!(policy.threshold_for(&Question::new("Pick one")), 4);
    }
}
