//! Application layer for exam-ensemble
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{GenerationParams, ResolutionParams, RetryPolicy};
pub use ports::{
    answer_cache::{AnswerCache, NoCache},
    llm_gateway::{GatewayError, GenerationRequest, LlmGateway},
    progress::{NoProgress, ProgressNotifier},
    resolution_logger::{NoResolutionLogger, ResolutionEvent, ResolutionLogger},
};
pub use use_cases::answer_question::{AnswerQuestionInput, AnswerQuestionUseCase};
pub use use_cases::consensus_engine::{ConsensusEngine, ProviderFailure, ResolveError};
pub use use_cases::invoke_provider::{AttemptOutcome, AttemptState, ProviderClient, next_state};
