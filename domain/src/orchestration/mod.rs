//! Orchestration domain
//!
//! Resolution mode selection and the phases of a round.

pub mod mode;

pub use mode::{Phase, ResolutionMode};
