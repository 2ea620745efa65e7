//! Domain layer for exam-ensemble
//!
//! This crate contains the pure decision logic of the ensemble: no I/O, no
//! async, no provider specifics.
//!
//! # Core Concepts
//!
//! - **Question**: text, ordered options, kind and an optional image
//! - **Prompt Builder**: renders a question into one prompt shared by every
//!   provider of a round, ending in a fixed JSON output contract
//! - **Answer Extractor**: an ordered cascade of named strategies turning
//!   raw model text into a [`ParsedAnswer`]
//! - **Consensus**: reliability policy, vote tally, agreement rule and the
//!   fallback precedence used when the workers and judge cannot decide
//! - **Cache key/entry**: the normalized projection of a question and the
//!   stored resolution

pub mod answer;
pub mod cache;
pub mod config;
pub mod core;
pub mod orchestration;
pub mod prompt;
pub mod providers;
pub mod quorum;

// Re-export commonly used types
pub use answer::{Extraction, ExtractionStrategy, ParsedAnswer, extract_answer, extract_tagged};
pub use cache::{CacheEntry, CacheKey};
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use core::{
    error::DomainError,
    model::Model,
    question::{AnswerOption, Question, QuestionImage, QuestionKind},
};
pub use orchestration::{Phase, ResolutionMode};
pub use prompt::{PromptTemplate, RenderedPrompt};
pub use providers::{
    GeminiProviderConfig, OpenAiProviderConfig, ProviderConfig, ProviderErrorKind, ProviderResult,
};
pub use quorum::{
    ProviderRoster, QuorumRule, ReliabilityPolicy, ResolutionMethod, ResolutionResult,
    RoundDecision, Vote, VoteTally,
};
