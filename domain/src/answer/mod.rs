//! Answer extraction
//!
//! Turns raw model output into a [`ParsedAnswer`]: a normalized label set
//! plus a confidence.

pub mod extract;
pub mod parsed;

pub use extract::{
    Extraction, ExtractionStrategy, extract_answer, extract_tagged, normalize_answer_text,
};
pub use parsed::{DEFAULT_CONFIDENCE, ParsedAnswer};
