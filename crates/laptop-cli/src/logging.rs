//! Logging setup for the binary.
//!
//! Console output goes to stdout; every run also gets its own log file named
//! after its start time, written through a non-blocking appender.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const FILE_NAME_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Directive for the console and file filters, e.g. `info` or `laptop_learning=debug`.
    pub level: String,
    pub log_dir: PathBuf,
    /// Only warnings and errors on the console.
    pub quiet: bool,
}

/// Keeps the file writer alive. Dropping it flushes and closes the log file.
#[derive(Debug)]
pub struct LogHandle {
    pub file: PathBuf,
    _guard: WorkerGuard,
}

/// `<log_dir>/<start time>.log`
pub fn log_file_name(started: chrono::DateTime<chrono::Local>) -> String {
    format!("{}.log", started.format(FILE_NAME_FORMAT))
}

fn filter(directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive))
}

/// Console output filtered by `filter`, capped at `warn` when quiet.
fn console_layer<S, W>(filter: EnvFilter, quiet: bool, writer: W) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(writer)
        .with_filter(filter)
        .with_filter(quiet.then_some(LevelFilter::WARN))
}

/// Install the global subscriber.
pub fn init(options: &LogOptions) -> Result<LogHandle> {
    create_log_dir(&options.log_dir)?;
    let file_name = log_file_name(chrono::Local::now());
    let file = options.log_dir.join(&file_name);

    let appender = tracing_appender::rolling::never(&options.log_dir, &file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let console_layer = console_layer(filter(&options.level), options.quiet, std::io::stdout);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(writer)
        .with_filter(filter(&options.level));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("installing the log subscriber")?;

    Ok(LogHandle {
        file,
        _guard: guard,
    })
}

fn create_log_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating log directory {}", dir.display()))
}
