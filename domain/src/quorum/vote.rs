//! Worker votes
//!
//! A vote is one worker's parsed answer after the reliability policy has
//! been applied.

use crate::answer::ParsedAnswer;
use crate::core::model::Model;
use serde::{Deserialize, Serialize};

/// A single worker's vote in a resolution round
///
/// # Example
///
/// ```
/// use ensemble_domain::{Model, ParsedAnswer};
/// use ensemble_domain::quorum::Vote;
///
/// let vote = Vote::new(Model::Gemini25Flash, 0, ParsedAnswer::letters(['B'], 80));
/// assert!(vote.reliable);
/// assert_eq!(vote.normalized(), "B");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    /// Worker that cast this vote
    pub model: Model,
    /// Position of the worker in the roster (0-based)
    pub roster_index: usize,
    /// Parsed answer with the effective (possibly capped) confidence
    pub answer: ParsedAnswer,
    /// False when the answer tripped the reliability policy
    pub reliable: bool,
}

impl Vote {
    /// Create a reliable vote
    pub fn new(model: Model, roster_index: usize, answer: ParsedAnswer) -> Self {
        Self {
            model,
            roster_index,
            answer,
            reliable: true,
        }
    }

    /// Create a vote flagged as unreliable
    pub fn unreliable(model: Model, roster_index: usize, answer: ParsedAnswer) -> Self {
        Self {
            reliable: false,
            ..Self::new(model, roster_index, answer)
        }
    }

    /// Normalized answer string used as the tally key
    pub fn normalized(&self) -> String {
        self.answer.normalized()
    }

    /// Effective confidence (after any reliability cap)
    pub fn confidence(&self) -> u8 {
        self.answer.confidence()
    }
}
