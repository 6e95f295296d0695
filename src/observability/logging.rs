//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global tracing subscriber once at startup
//! - Tee output to an optional append-only log file
//! - Pick the output format (JSON by default)
//!
//! # Design Decisions
//! - Every event is formatted into one buffer and written with a single call,
//!   so concurrent requests never interleave within a line
//! - The file writer is non-blocking; dropping the returned guard flushes and
//!   closes it
//! - `RUST_LOG` takes precedence over the configured level

use std::fs::OpenOptions;
use std::io;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, writer::BoxMakeWriter, writer::MakeWriterExt},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::{LogFormat, LoggingConfig};

/// Initializes the logging system based on configuration.
///
/// Returns a guard that must be kept alive for the duration of the program
/// when a log file is configured.
pub fn init_logging(config: &LoggingConfig) -> io::Result<Option<WorkerGuard>> {
    let filter = build_filter(&config.level);
    let (writer, guard) = build_writer(config.log_file.as_deref())?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(writer))
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_writer(writer))
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_writer(writer))
            .try_init(),
    };
    result.map_err(io::Error::other)?;

    Ok(guard)
}

/// Filter for our own events at `level`, quieter for dependencies.
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match level.to_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "warn" => "warn",
            "error" => "error",
            _ => "info",
        };
        EnvFilter::new(format!("{},hyper=warn,hyper_util=warn,rustls=warn", level))
    })
}

fn build_writer(log_file: Option<&str>) -> io::Result<(BoxMakeWriter, Option<WorkerGuard>)> {
    match log_file {
        None => Ok((BoxMakeWriter::new(io::stdout), None)),
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            Ok((BoxMakeWriter::new(io::stdout.and(non_blocking)), Some(guard)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_level_falls_back_to_info() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let filter = build_filter("verbose").to_string();
        assert!(filter.contains("info"));
        assert!(!filter.contains("verbose"));
        assert!(build_filter("DEBUG").to_string().contains("debug"));
    }

    #[test]
    fn log_file_is_created_in_append_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("xdjprox.log");
        std::fs::write(&path, "existing\n").unwrap();

        let (_writer, guard) = build_writer(Some(path.to_str().unwrap())).unwrap();
        assert!(guard.is_some());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "existing\n");
    }

    #[test]
    fn unwritable_log_file_is_an_error() {
        assert!(build_writer(Some("/nonexistent-dir/xdjprox.log")).is_err());
    }
}
