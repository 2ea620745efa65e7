//! CLI entrypoint for exam-ensemble
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use ensemble_application::{
    AnswerCache, AnswerQuestionInput, AnswerQuestionUseCase, ConsensusEngine, LlmGateway,
    NoCache, NoProgress, NoResolutionLogger, ProgressNotifier, ProviderClient, ResolutionLogger,
};
use ensemble_domain::{OutputFormat, Question, QuestionImage};
use ensemble_infrastructure::{
    ConfigLoader, FileConfig, JsonlResolutionLogger, MemoryAnswerCache, build_routing_gateway,
};
use ensemble_presentation::{
    BatchDefaults, BatchRunner, Cli, ConsoleFormatter, ProgressReporter, guess_image_mime,
};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Load configuration (before logging so [logging] dir is known)
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())?
    };
    let mut config = config.with_roster_override(&cli.workers, cli.judge.as_deref());
    if let Some(mode) = cli.mode {
        config.ensemble.mode = mode.to_string();
    }

    let _log_guard = init_tracing(cli.verbose, &config);
    info!("Starting exam-ensemble");

    if !config.output.color {
        colored::control::set_override(false);
    }

    if cli.show_config {
        show_config(&cli, &config)?;
        return Ok(ExitCode::SUCCESS);
    }

    // Errors abort in to_roster; warnings are only reported
    for issue in config.validate().iter().filter(|i| !i.is_error()) {
        eprintln!("warning: {}", issue);
    }
    let roster = config.to_roster()?;

    // Validate single-question input before any provider is built
    let question = match cli.batch_source() {
        Some(_) => None,
        None => Some(build_question(&cli)?),
    };

    let format = cli
        .output
        .map(OutputFormat::from)
        .or(config.output.format)
        .unwrap_or_default();

    // === Dependency Injection ===
    let retry = config.to_retry_policy();
    let gateway = Arc::new(build_routing_gateway(
        &config.to_provider_config(),
        retry.call_timeout,
    )?);
    let client = ProviderClient::new(gateway)
        .with_retry(retry)
        .with_generation(config.to_generation_params());

    let logger: Arc<dyn ResolutionLogger> = match config.logging.audit_path() {
        Some(path) => match JsonlResolutionLogger::new(&path) {
            Some(logger) => {
                info!("Audit log: {}", logger.path().display());
                Arc::new(logger)
            }
            None => Arc::new(NoResolutionLogger),
        },
        None => Arc::new(NoResolutionLogger),
    };

    let cache: Arc<dyn AnswerCache> = match config.cache.ttl() {
        Some(ttl) => Arc::new(MemoryAnswerCache::new(ttl)),
        None => Arc::new(NoCache),
    };

    let engine = ConsensusEngine::new(client, config.to_resolution_params(), logger.clone());
    let use_case = AnswerQuestionUseCase::new(engine, cache, logger);

    let progress: Box<dyn ProgressNotifier> = if cli.quiet || format == OutputFormat::Json {
        Box::new(NoProgress)
    } else {
        Box::new(ProgressReporter::new())
    };

    let Some(question) = question else {
        let runner = BatchRunner::new(use_case, roster)
            .with_defaults(BatchDefaults {
                options: cli.options.clone(),
                kind: cli.kind,
            })
            .with_format(format);
        return run_batch(&cli, &runner, progress.as_ref()).await;
    };

    let input = AnswerQuestionInput::new(question.clone(), roster);
    let outcome = use_case
        .execute_with_progress(input, progress.as_ref())
        .await;

    match (outcome, format) {
        (Ok(result), OutputFormat::Json) => {
            println!("{}", ConsoleFormatter::format_json(&result));
            Ok(ExitCode::SUCCESS)
        }
        (Ok(result), OutputFormat::Text) => {
            if cli.quiet {
                println!("{}", ConsoleFormatter::format_answer_only(&result));
            } else {
                println!("{}", ConsoleFormatter::format(&question, &result));
            }
            Ok(ExitCode::SUCCESS)
        }
        (Err(err), OutputFormat::Json) => {
            println!("{}", ConsoleFormatter::format_error_json(&err));
            Ok(ExitCode::FAILURE)
        }
        (Err(err), OutputFormat::Text) => {
            eprint!("{}", ConsoleFormatter::format_error(&err));
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Answer every line of the batch source, sharing one use case and cache
async fn run_batch<G: LlmGateway + 'static>(
    cli: &Cli,
    runner: &BatchRunner<G>,
    progress: &dyn ProgressNotifier,
) -> Result<ExitCode> {
    let mut out = std::io::stdout().lock();
    let summary = match cli.batch_source().flatten() {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open batch file {}", path.display()))?;
            runner.run(BufReader::new(file), &mut out, progress).await?
        }
        None => {
            runner
                .run(BufReader::new(tokio::io::stdin()), &mut out, progress)
                .await?
        }
    };

    info!(
        "Batch finished: {} answered ({} cached), {} failed, {} invalid",
        summary.answered, summary.cache_hits, summary.failed, summary.invalid
    );
    Ok(if summary.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Initialize logging based on verbosity level
///
/// `RUST_LOG` takes precedence over `-v`. When `[logging] dir` is set, a
/// daily-rotated log file is written there in addition to stderr.
fn init_tracing(verbose: u8, config: &FileConfig) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    match config.logging.dir() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "exam-ensemble.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(file_layer)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
            None
        }
    }
}

/// Print configuration sources and the effective settings
fn show_config(cli: &Cli, config: &FileConfig) -> Result<()> {
    for line in ConfigLoader::describe_sources(cli.config.as_deref()) {
        println!("{}", line);
    }
    println!();

    let mut redacted = config.clone();
    for key in [
        &mut redacted.providers.gemini.api_key,
        &mut redacted.providers.openai.api_key,
    ] {
        if key.is_some() {
            *key = Some("***".to_string());
        }
    }
    println!(
        "{}",
        toml::to_string_pretty(&redacted).context("Failed to render configuration")?
    );

    for issue in config.validate() {
        println!("# {}", issue);
    }
    Ok(())
}

/// Build the question from arguments, attaching the image if given
fn build_question(cli: &Cli) -> Result<Question> {
    let Some(question) = cli.build_question() else {
        bail!("A non-empty question is required. Run with --help for usage.");
    };

    let Some(path) = &cli.image else {
        return Ok(question);
    };

    let mime = match guess_image_mime(path) {
        Some(mime) => mime,
        None => {
            warn!(
                "Unrecognized image extension for {}, sending as image/png",
                path.display()
            );
            "image/png"
        }
    };
    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read image {}", path.display()))?;
    Ok(question.with_image(QuestionImage::new(data, mime)))
}
