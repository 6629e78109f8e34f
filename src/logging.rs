//! Diagnostics for a generation run
//!
//! Console diagnostics go to stderr so stdout only ever carries the result
//! line. When `logging.file` is set, the same events are appended to a run log
//! without colour, giving a record of which cards each batch wrote.

use crate::config::LoggingOptions;
use crate::error::{Error, Result};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use tracing_appender::non_blocking::{NonBlockingBuilder, WorkerGuard};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Flushes the run log when dropped; hold it until the process is done.
#[must_use = "dropping the guard early loses buffered run-log lines"]
#[derive(Debug, Default)]
pub struct LogGuard {
    _run_log: Option<WorkerGuard>,
}

/// Install the global subscriber for this process.
///
/// A subscriber installed earlier (e.g. by a test harness) is left in place.
pub fn init(options: &LoggingOptions) -> Result<LogGuard> {
    if tracing::dispatcher::has_been_set() {
        return Ok(LogGuard::default());
    }

    let level = std::env::var("CARDQR_LOG_LEVEL").unwrap_or_else(|_| options.level.clone());
    let filter = build_filter(&level)?;

    let console = fmt::layer()
        .compact()
        .without_time()
        .with_target(false)
        .with_ansi(options.color)
        .with_writer(io::stderr);

    let (run_log, guard) = match options.file.as_deref() {
        Some(path) => {
            let (writer, guard) = NonBlockingBuilder::default()
                .lossy(false)
                .finish(open_run_log(path)?);
            let layer = fmt::layer()
                .with_timer(UtcTime::rfc_3339())
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    Registry::default()
        .with(filter)
        .with(console)
        .with(run_log)
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to install tracing subscriber: {e}")))?;

    Ok(LogGuard { _run_log: guard })
}

fn build_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(level)
        .map_err(|e| Error::Config(format!("Invalid log level '{level}': {e}")))
}

fn open_run_log(path: &Path) -> Result<File> {
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| {
            Error::Config(format!("Failed to create log directory {}: {e}", dir.display()))
        })?;
    }

    OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|e| Error::Config(format!("Failed to open run log {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_accepts_levels_and_directives() {
        assert!(build_filter("warn").is_ok());
        assert!(build_filter("cardqr=debug,info").is_ok());
    }

    #[test]
    fn test_filter_rejects_unknown_level() {
        assert!(matches!(build_filter("cardqr=loudest"), Err(Error::Config(_))));
    }

    #[test]
    fn test_run_log_creates_parent_dirs_and_appends() {
        use std::io::Write;

        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("logs/nested/run.log");

        writeln!(open_run_log(&path).unwrap(), "first").unwrap();
        writeln!(open_run_log(&path).unwrap(), "second").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_run_log_on_directory_is_config_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(open_run_log(tmp.path()), Err(Error::Config(_))));
    }
}
