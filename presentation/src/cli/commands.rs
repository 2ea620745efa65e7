//! CLI command definitions

use clap::{Parser, ValueEnum};
use ensemble_domain::{AnswerOption, Question, QuestionKind, ResolutionMode};
use std::path::{Path, PathBuf};

/// Output format for resolution results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Text,
    /// JSON object
    Json,
}

impl From<OutputFormat> for ensemble_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => ensemble_domain::OutputFormat::Text,
            OutputFormat::Json => ensemble_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for exam-ensemble
#[derive(Parser, Debug)]
#[command(name = "exam-ensemble")]
#[command(author, version, about = "Answer exam questions with an ensemble of LLMs")]
#[command(long_about = r#"
exam-ensemble asks several LLM workers the same question in parallel and
returns the answer they agree on.

Resolution:
1. Workers: every worker answers in parallel; answers are normalized and tallied
2. Judge: if no answer reaches the agreement rule, a judge model arbitrates
3. Fallback: if the judge fails, the primary/secondary or most confident worker wins

Configuration files are loaded from (in priority order):
1. EXAM_ENSEMBLE_* environment variables
2. --config <path>     Explicit config file
3. ./ensemble.toml     Project-level config
4. ~/.config/exam-ensemble/config.toml   Global config

Example:
  exam-ensemble "Capital of France?" -o A=Lyon -o B=Paris -o C=Nice
  exam-ensemble "The Earth is flat." --kind true-false --output json
  exam-ensemble "Which graph is convex?" --image plot.png -o A=left -o B=right
  exam-ensemble --batch questions.txt -o A=yes -o B=no --output json
  exam-ensemble -w gpt-4o -w gemini-2.5-flash -w gpt-4.1-mini --judge gemini-2.5-pro "..."
"#)]
pub struct Cli {
    /// The question text
    pub question: Option<String>,

    /// Answer option as LABEL=TEXT (repeat for each option)
    #[arg(short = 'o', long = "option", value_name = "LABEL=TEXT", value_parser = parse_option)]
    pub options: Vec<AnswerOption>,

    /// Question kind: single, multi, true-false
    #[arg(short, long, default_value = "single")]
    pub kind: QuestionKind,

    /// Image attached to the question (PNG, JPEG, GIF or WebP)
    #[arg(long, value_name = "PATH", conflicts_with = "batch")]
    pub image: Option<PathBuf>,

    /// Answer one question per line of PATH ("-" reads stdin); lines may be
    /// plain text (using --option/--kind) or JSON objects
    #[arg(long, value_name = "PATH", conflicts_with = "question")]
    pub batch: Option<PathBuf>,

    /// Worker models, in roster order (can be specified multiple times)
    #[arg(short, long = "worker", value_name = "MODEL")]
    pub workers: Vec<String>,

    /// Judge model consulted when workers disagree
    #[arg(long, value_name = "MODEL")]
    pub judge: Option<String>,

    /// Resolution mode: ensemble, single
    #[arg(short, long)]
    pub mode: Option<ResolutionMode>,

    /// Output format (overrides [output] format)
    #[arg(long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration sources and effective settings, then exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// Build the question from text, options and kind (image attached separately)
    pub fn build_question(&self) -> Option<Question> {
        let question = Question::try_new(self.question.as_deref()?)?;
        Some(question.with_options(self.options.clone()).with_kind(self.kind))
    }

    /// Batch input path, with `None` inside meaning stdin
    pub fn batch_source(&self) -> Option<Option<&Path>> {
        let path = self.batch.as_deref()?;
        Some((path != Path::new("-")).then_some(path))
    }
}

/// Parse `LABEL=TEXT` (or `LABEL:TEXT`) into an answer option
pub fn parse_option(s: &str) -> Result<AnswerOption, String> {
    let (label, text) = s
        .split_once('=')
        .or_else(|| s.split_once(':'))
        .ok_or_else(|| format!("expected LABEL=TEXT, got '{}'", s))?;
    let (label, text) = (label.trim(), text.trim());
    if label.is_empty() || text.is_empty() {
        return Err(format!("option label and text cannot be empty: '{}'", s));
    }
    Ok(AnswerOption::new(label.to_uppercase(), text))
}

/// Guess an image MIME type from the file extension
pub fn guess_image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}
