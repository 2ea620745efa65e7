//! Output formatter trait

use ensemble_application::ResolveError;
use ensemble_domain::{Question, ResolutionResult};

/// Trait for formatting resolution outcomes
pub trait OutputFormatter {
    /// Format the complete result for a question
    fn format(&self, question: &Question, result: &ResolutionResult) -> String;

    /// Format as JSON
    fn format_json(&self, result: &ResolutionResult) -> String;

    /// Format the answer alone (for quiet mode and scripts)
    fn format_answer_only(&self, result: &ResolutionResult) -> String;

    /// Format a failed resolution
    fn format_error(&self, error: &ResolveError) -> String;

    /// Format a failed resolution as JSON
    fn format_error_json(&self, error: &ResolveError) -> String;
}
