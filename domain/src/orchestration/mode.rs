//! Resolution mode: how many providers a question starts with.
//!
//! - Ensemble (default): every worker answers, the judge arbitrates
//!   disagreement.
//! - Single: the first worker answers alone; a low-confidence or hedged
//!   answer escalates to the full ensemble.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionMode {
    /// All workers in parallel, judge on disagreement
    #[default]
    Ensemble,
    /// First worker only, escalating when unsure
    Single,
}

impl ResolutionMode {
    pub fn description(&self) -> &'static str {
        match self {
            ResolutionMode::Ensemble => "Ensemble: all workers vote, judge on disagreement",
            ResolutionMode::Single => "Single: first worker alone, ensemble when unsure",
        }
    }

    pub fn is_single(&self) -> bool {
        matches!(self, ResolutionMode::Single)
    }
}

impl fmt::Display for ResolutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionMode::Ensemble => write!(f, "ensemble"),
            ResolutionMode::Single => write!(f, "single"),
        }
    }
}

impl std::str::FromStr for ResolutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ensemble" | "ens" | "e" => Ok(ResolutionMode::Ensemble),
            "single" | "solo" | "s" => Ok(ResolutionMode::Single),
            _ => Err(format!("Invalid resolution mode: {}. Valid: ensemble, single", s)),
        }
    }
}

/// Stage of a resolution round, reported to progress observers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Single-call mode: the first worker alone
    Single,
    /// Parallel worker fan-out
    Workers,
    /// Sequential judge call after disagreement
    Judge,
}

impl Phase {
    pub fn as_str(&self) -> &str {
        match self {
            Phase::Single => "single",
            Phase::Workers => "workers",
            Phase::Judge => "judge",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Phase::Single => "Single Call",
            Phase::Workers => "Worker Vote",
            Phase::Judge => "Judge Arbitration",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
