//! Console output formatter for resolution results

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use ensemble_application::{ProviderFailure, ResolveError};
use ensemble_domain::{Question, ResolutionMethod, ResolutionResult};
use serde::Serialize;

/// Formats resolution results for console display
pub struct ConsoleFormatter;

#[derive(Serialize)]
struct ErrorOutput<'a> {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    failures: Option<&'a [ProviderFailure]>,
}

impl ConsoleFormatter {
    /// Format the complete result
    pub fn format(question: &Question, result: &ResolutionResult) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Ensemble Answer"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n",
            "Question:".cyan().bold(),
            question.text()
        ));
        for option in question.options() {
            output.push_str(&format!("  {}. {}\n", option.label.bold(), option.text));
        }
        if question.has_image() {
            output.push_str(&format!("  {}\n", "[image attached]".dimmed()));
        }
        output.push('\n');

        output.push_str(&format!(
            "{:<12}{}\n",
            "Answer:".cyan().bold(),
            result.final_answer.green().bold()
        ));
        output.push_str(&format!(
            "{:<12}{}%\n",
            "Confidence:".cyan().bold(),
            result.final_confidence
        ));

        let method = Self::method_label(result.method);
        let method = if result.from_cache {
            format!("{} {}", method, "(cached)".dimmed())
        } else {
            method.to_string()
        };
        output.push_str(&format!("{:<12}{}\n", "Method:".cyan().bold(), method));

        if !result.supporting_providers.is_empty() {
            output.push_str(&format!(
                "{:<12}{}\n",
                "Backed by:".cyan().bold(),
                result.supporting_providers.join(", ")
            ));
        }
        if !result.from_cache {
            output.push_str(&format!(
                "{:<12}{} ms\n",
                "Elapsed:".cyan().bold(),
                result.elapsed_ms
            ));
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(result: &ResolutionResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the answer alone
    pub fn format_answer_only(result: &ResolutionResult) -> String {
        result.final_answer.clone()
    }

    pub fn format_error(error: &ResolveError) -> String {
        let mut output = format!("{} {}\n", "Error:".red().bold(), error);
        if let ResolveError::EnsembleExhausted { failures } = error {
            for failure in failures {
                let detail = failure
                    .detail
                    .as_deref()
                    .map(|d| format!(" ({})", d))
                    .unwrap_or_default();
                output.push_str(&format!(
                    "  {} {}: {}{}\n",
                    "x".red(),
                    failure.provider_id,
                    failure.kind,
                    detail.dimmed()
                ));
            }
        }
        output
    }

    pub fn format_error_json(error: &ResolveError) -> String {
        let failures = match error {
            ResolveError::EnsembleExhausted { failures } => Some(failures.as_slice()),
            _ => None,
        };
        let output = ErrorOutput {
            error: error.kind(),
            message: error.to_string(),
            failures,
        };
        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }

    fn method_label(method: ResolutionMethod) -> &'static str {
        match method {
            ResolutionMethod::Unanimous => "unanimous (all workers agree)",
            ResolutionMethod::Majority => "majority",
            ResolutionMethod::Judge => "judge (workers disagreed)",
            ResolutionMethod::Primary => "primary worker (judge unavailable)",
            ResolutionMethod::Secondary => "secondary worker (judge unavailable)",
            ResolutionMethod::FallbackConfidence => "most confident worker (judge unavailable)",
            ResolutionMethod::Single => "single call",
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn footer() -> String {
        format!("{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, question: &Question, result: &ResolutionResult) -> String {
        Self::format(question, result)
    }

    fn format_json(&self, result: &ResolutionResult) -> String {
        Self::format_json(result)
    }

    fn format_answer_only(&self, result: &ResolutionResult) -> String {
        Self::format_answer_only(result)
    }

    fn format_error(&self, error: &ResolveError) -> String {
        Self::format_error(error)
    }

    fn format_error_json(&self, error: &ResolveError) -> String {
        Self::format_error_json(error)
    }
}
