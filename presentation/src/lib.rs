//! Presentation layer for exam-ensemble
//!
//! This crate contains CLI definitions, the batch runner, output formatters
//! and progress reporters.

pub mod batch;
pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use batch::{BatchDefaults, BatchRunner, BatchSummary};
pub use cli::commands::{Cli, OutputFormat, guess_image_mime, parse_option};
pub use output::{ConsoleFormatter, OutputFormatter};
pub use progress::{ProgressReporter, SimpleProgress};
