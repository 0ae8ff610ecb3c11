//! Tracing setup.

use quill_core::error::Result;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "quill.log";

/// Installs a daily-rolling file subscriber under `log_dir`.
///
/// The filter comes from `RUST_LOG`, defaulting to `info`. Keep the returned
/// guard alive for the life of the process or buffered lines are lost.
/// Returns `Ok(None)` when a global subscriber is already installed.
pub fn init_logging(log_dir: &Path) -> Result<Option<WorkerGuard>> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
    {
        Ok(()) => {
            tracing::info!("[Logging] writing logs to {}", log_dir.display());
            Ok(Some(guard))
        }
        Err(_) => Ok(None),
    }
}
