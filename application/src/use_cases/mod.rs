//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod answer_question;
pub mod consensus_engine;
pub mod invoke_provider;

#[cfg(test)]
pub(crate) mod test_support;
