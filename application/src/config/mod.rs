//! Application-level configuration.
//!
//! These types control how use cases behave:
//!
//! - [`RetryPolicy`]: attempts, timeouts and backoff for provider calls
//! - [`GenerationParams`]: sampling settings sent to every provider
//! - [`ResolutionParams`]: agreement rule, reliability policy, fallback order and mode

pub mod resolution_params;
pub mod retry_policy;

pub use resolution_params::{DEFAULT_SINGLE_MIN_CONFIDENCE, GenerationParams, ResolutionParams};
pub use retry_policy::RetryPolicy;
