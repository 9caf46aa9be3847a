//! LogTarget demo
//!
//! Replays the facade walkthrough against the process-wide sink and prints
//! the in-memory log afterwards.
//!
//! ## Usage
//!
//! ```bash
//! # Fallback lines on stderr, in-memory log on stdout
//! logtarget-demo
//!
//! # Write the fallback lines to a file and log every level there
//! logtarget-demo --log-file logs/system.log --ignore ""
//!
//! # Forward everything to tracing instead of the system log
//! logtarget-demo --tracing -vv
//!
//! # Load the policy from a JSON file
//! logtarget-demo --config sink.json
//! ```

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use logtarget_core::{
    facade, BacktraceCapture, Context, Failure, FileLog, Level, LogItem, LogSink, LogTargetError,
    SinkConfig, StackCapture, TracingLogger, XmlError, XmlErrorLevel,
};
use logtarget_core::{log_critical, log_debug, log_error, log_info, log_warning};
use serde_json::json;

/// LogTarget - logging facade walkthrough
#[derive(Parser, Debug)]
#[command(name = "logtarget-demo")]
#[command(version = "0.1.0")]
#[command(about = "Replays the LogTarget walkthrough and prints the in-memory log")]
struct Cli {
    /// Append system log lines to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Load the sink policy from a JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Levels never written to the system log (comma separated, empty for none)
    #[arg(long, value_delimiter = ',')]
    ignore: Option<Vec<String>>,

    /// Levels that get an automatic stack context (comma separated, empty for none)
    #[arg(long, value_delimiter = ',')]
    auto_context: Option<Vec<String>>,

    /// Do not keep entries in memory
    #[arg(long)]
    no_store: bool,

    /// Forward entries to tracing instead of the system log
    #[arg(long)]
    tracing: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Strict level parsing; empty items are skipped so `""` means "no levels".
fn parse_levels(tokens: &[String]) -> Result<BTreeSet<Level>, LogTargetError> {
    tokens
        .iter()
        .map(|token| token.trim())
        .filter(|token| !token.is_empty())
        .map(str::parse)
        .collect()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);
    tracing::debug!(?cli, "starting walkthrough");

    let sink = build_sink(&cli)?;
    facade::install(sink)?;

    println!("TESTING THE LOG FUNCTIONS...");
    run_walkthrough();

    let sink = facade::global();
    tracing::info!(entries = sink.len(), "walkthrough finished");
    println!();
    println!("CONTENTS OF THE IN MEMORY LOG:");
    print!("{}", sink.get_log_formatted());

    Ok(())
}

fn build_sink(cli: &Cli) -> Result<LogSink> {
    let mut config = match &cli.config {
        Some(path) => SinkConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => SinkConfig::default(),
    };

    if let Some(tokens) = &cli.ignore {
        config.ignore_levels = parse_levels(tokens)?;
    }
    if let Some(tokens) = &cli.auto_context {
        config.automatic_context_levels = parse_levels(tokens)?;
    }
    if cli.no_store {
        config.store_in_memory = false;
    }

    let mut builder = LogSink::builder().config(config);

    if let Some(path) = &cli.log_file {
        let file_log = FileLog::open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        builder = builder.system_log(file_log);
    }
    if cli.tracing {
        builder = builder.logger(Arc::new(TracingLogger::new()));
    }

    Ok(builder.build())
}

fn run_walkthrough() {
    // Text is logged verbatim
    log_debug!("Testing LogDebug");
    log_warning!("Testing LogWarning");
    log_error!("Testing LogError");

    // Error values supply the message
    if let Err(e) = "forty-two".parse::<i32>() {
        log_error!(LogItem::error(e));
    }

    // Collections are summarized by key and value type
    log_debug!(json!(["Some Text", 42, ["child array"]]));

    let xml = XmlError::new(
        XmlErrorLevel::Warning,
        1549,
        "failed to load external entity \"Non-Existent-File.bad\"\n",
    )
    .at("Non-Existent-File.bad", 0, 0);
    log_error!(xml);

    // An explicit context is used as given
    log_debug!("Test LogDebug WITH a context", current_stack());

    Walkthrough.run();
}

fn current_stack() -> Context {
    BacktraceCapture::new().capture().into()
}

/// Logging from inside methods.
struct Walkthrough;

impl Walkthrough {
    #[inline(never)]
    fn run(&self) {
        match divide(4, 0) {
            Ok(value) => log_info!(format!("4 / 0 = {}", value)),
            Err(failure) => log_error!(failure),
        }

        log_warning!("A test warning from Walkthrough");
        log_critical!("Testing LogCritical from Walkthrough");
        log_info!("Testing LogInfo from Walkthrough WITH CONTEXT", current_stack());
        log_error!("Testing LogError from Walkthrough");
        Self::associated();
    }

    #[inline(never)]
    fn associated() {
        log_error!("Testing LogError from an associated function");
    }
}

#[inline(never)]
fn divide(numerator: i64, denominator: i64) -> Result<i64, Failure> {
    numerator
        .checked_div(denominator)
        .ok_or_else(|| Failure::new("Division by zero").with_kind("DivisionByZero"))
}

/// Setup logging based on verbosity level
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();
}
