//! Worker voting and consensus
//!
//! One resolution round, as pure logic:
//!
//! ```text
//! worker answers ──► ReliabilityPolicy ──► Vote ──► VoteTally
//!                                                      │
//!                                   evaluate(QuorumRule, roster size)
//!                                          │                 │
//!                                       Agreed          NoAgreement
//!                                 (majority/unanimous)       │
//!                                                   judge (application layer)
//!                                                            │ judge failed
//!                                                     select_fallback
//!                                         (primary → secondary → confidence)
//! ```

pub mod consensus;
pub mod reliability;
pub mod roster;
pub mod rule;
pub mod tally;
pub mod vote;

pub use consensus::{
    ResolutionMethod, ResolutionResult, RoundDecision, evaluate, select_fallback,
};
pub use reliability::ReliabilityPolicy;
pub use roster::ProviderRoster;
pub use rule::QuorumRule;
pub use tally::{TallyEntry, VoteTally};
pub use vote::Vote;
