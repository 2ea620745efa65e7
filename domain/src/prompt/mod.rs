//! Prompt domain
//!
//! Deterministic rendering of a question into the provider instruction,
//! including the output contract the answer extractor depends on.

mod template;

pub use template::{PromptTemplate, RenderedPrompt};
