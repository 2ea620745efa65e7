//! Resolution parameters: how a round is decided and how providers sample.

use ensemble_domain::{Model, QuorumRule, ReliabilityPolicy, ResolutionMode};
use serde::{Deserialize, Serialize};

/// Default minimum confidence for single-call mode to skip the ensemble
pub const DEFAULT_SINGLE_MIN_CONFIDENCE: u8 = 80;

/// Sampling settings sent with every provider request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.4,
            max_output_tokens: 8192,
        }
    }
}

/// Decision parameters for the Consensus Engine
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionParams {
    /// Agreement rule evaluated against the worker roster size
    pub rule: QuorumRule,
    /// Penalty for over-broad answers
    pub reliability: ReliabilityPolicy,
    /// Preferred fallback worker when the judge cannot decide
    pub primary: Option<Model>,
    /// Second preferred fallback worker
    pub secondary: Option<Model>,
    pub mode: ResolutionMode,
    /// Single-call mode answers alone only at or above this confidence
    pub single_min_confidence: u8,
}

impl Default for ResolutionParams {
    fn default() -> Self {
        Self {
            rule: QuorumRule::default(),
            reliability: ReliabilityPolicy::default(),
            primary: None,
            secondary: None,
            mode: ResolutionMode::default(),
            single_min_confidence: DEFAULT_SINGLE_MIN_CONFIDENCE,
        }
    }
}

impl ResolutionParams {
    // ==================== Builder Methods ====================

    pub fn with_rule(mut self, rule: QuorumRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn with_reliability(mut self, reliability: ReliabilityPolicy) -> Self {
        self.reliability = reliability;
        self
    }

    pub fn with_primary(mut self, primary: Option<Model>) -> Self {
        self.primary = primary;
        self
    }

    pub fn with_secondary(mut self, secondary: Option<Model>) -> Self {
        self.secondary = secondary;
        self
    }

    pub fn with_mode(mut self, mode: ResolutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_single_min_confidence(mut self, confidence: u8) -> Self {
        self.single_min_confidence = confidence.min(100);
        self
    }
}
