//! Batch runner: one question per input line, one shared use case

use crate::output::console::ConsoleFormatter;
use ensemble_application::{
    AnswerQuestionInput, AnswerQuestionUseCase, LlmGateway, ProgressNotifier, ResolveError,
};
use ensemble_domain::{
    AnswerOption, OutputFormat, ProviderRoster, Question, QuestionKind, ResolutionResult,
};
use serde_json::json;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

/// Options and kind applied to plain-text lines
#[derive(Debug, Clone, Default)]
pub struct BatchDefaults {
    pub options: Vec<AnswerOption>,
    pub kind: QuestionKind,
}

/// Counts reported after a batch finishes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub answered: usize,
    pub cache_hits: usize,
    pub failed: usize,
    pub invalid: usize,
}

impl BatchSummary {
    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.invalid > 0
    }
}

/// Parse one batch line.
///
/// Blank lines and `#` comments yield `Ok(None)`. A line starting with `{`
/// is a JSON question (`text`, `options`, `kind`); anything else is the
/// question text, combined with `defaults`.
pub fn parse_batch_line(line: &str, defaults: &BatchDefaults) -> Result<Option<Question>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    if line.starts_with('{') {
        let question: Question =
            serde_json::from_str(line).map_err(|e| format!("invalid JSON question: {}", e))?;
        if question.text().trim().is_empty() {
            return Err("question text cannot be empty".to_string());
        }
        return Ok(Some(question));
    }

    Ok(Question::try_new(line)
        .map(|q| q.with_options(defaults.options.clone()).with_kind(defaults.kind)))
}

/// Answers a stream of questions with one use case (and so one cache)
pub struct BatchRunner<G: LlmGateway + 'static> {
    use_case: AnswerQuestionUseCase<G>,
    roster: ProviderRoster,
    defaults: BatchDefaults,
    format: OutputFormat,
}

impl<G: LlmGateway + 'static> BatchRunner<G> {
    pub fn new(use_case: AnswerQuestionUseCase<G>, roster: ProviderRoster) -> Self {
        Self {
            use_case,
            roster,
            defaults: BatchDefaults::default(),
            format: OutputFormat::Text,
        }
    }

    pub fn with_defaults(mut self, defaults: BatchDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Read lines until EOF, answering each question as it arrives.
    ///
    /// JSON output is one compact record per line.
    pub async fn run<R, W>(
        &self,
        input: R,
        out: &mut W,
        progress: &dyn ProgressNotifier,
    ) -> std::io::Result<BatchSummary>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut summary = BatchSummary::default();
        let mut lines = input.lines();
        let mut line_no = 0usize;

        while let Some(line) = lines.next_line().await? {
            line_no += 1;
            let question = match parse_batch_line(&line, &self.defaults) {
                Ok(Some(question)) => question,
                Ok(None) => continue,
                Err(message) => {
                    warn!("Line {}: {}", line_no, message);
                    summary.invalid += 1;
                    self.write_invalid(out, line_no, &message)?;
                    continue;
                }
            };

            debug!("Line {}: {}", line_no, question.text());
            let input = AnswerQuestionInput::new(question.clone(), self.roster.clone());
            let outcome = self.use_case.execute_with_progress(input, progress).await;

            match &outcome {
                Ok(result) => {
                    summary.answered += 1;
                    if result.from_cache {
                        summary.cache_hits += 1;
                    }
                }
                Err(_) => summary.failed += 1,
            }
            self.write_outcome(out, line_no, &question, &outcome)?;
        }

        Ok(summary)
    }

    fn write_outcome<W: Write>(
        &self,
        out: &mut W,
        line_no: usize,
        question: &Question,
        outcome: &Result<ResolutionResult, ResolveError>,
    ) -> std::io::Result<()> {
        match (self.format, outcome) {
            (OutputFormat::Json, Ok(result)) => {
                let record = json!({"line": line_no, "question": question.text(), "result": result});
                writeln!(out, "{}", record)
            }
            (OutputFormat::Json, Err(err)) => {
                let failures = match err {
                    ResolveError::EnsembleExhausted { failures } => json!(failures),
                    _ => json!([]),
                };
                let record = json!({
                    "line": line_no,
                    "question": question.text(),
                    "error": err.kind(),
                    "message": err.to_string(),
                    "failures": failures,
                });
                writeln!(out, "{}", record)
            }
            (OutputFormat::Text, Ok(result)) => {
                writeln!(out, "[{}] {}", line_no, ConsoleFormatter::format(question, result))
            }
            (OutputFormat::Text, Err(err)) => {
                write!(
                    out,
                    "[{}] {}\n{}",
                    line_no,
                    question.text(),
                    ConsoleFormatter::format_error(err)
                )
            }
        }
    }

    fn write_invalid<W: Write>(&self, out: &mut W, line_no: usize, message: &str) -> std::io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                let record = json!({"line": line_no, "error": "invalid_question", "message": message});
                writeln!(out, "{}", record)
            }
            OutputFormat::Text => writeln!(out, "[{}] skipped: {}", line_no, message),
        }
    }
}
