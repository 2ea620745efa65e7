//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`]: LLM models used as worker/judge providers
//! - [`question::Question`]: an exam question with options, kind and image
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod model;
pub mod question;
pub mod string;
