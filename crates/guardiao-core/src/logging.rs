//! Tracing setup.
//!
//! The terminal belongs to the UI, so logs go to a daily-rotated file under
//! `<home>/logs/`. The filter comes from `GUARDIAO_LOG`, then the config's
//! `log_level`, then `info`.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Log file name prefix inside the logs directory.
const LOG_FILE_PREFIX: &str = "guardiao.log";

/// Builds the filter, preferring the environment over the configured level.
///
/// An invalid directive falls back to `info` rather than failing startup.
pub fn build_filter(env_value: Option<&str>, configured: &str) -> EnvFilter {
    env_value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(configured)
        .parse::<EnvFilter>()
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global file subscriber.
///
/// Keep the returned guard alive for the whole process; dropping it flushes
/// and stops the background writer.
///
/// # Errors
/// Returns an error if the log directory cannot be created or a global
/// subscriber is already installed.
pub fn init_file_logging(logs_dir: &Path, configured_level: &str) -> Result<WorkerGuard> {
    std::fs::create_dir_all(logs_dir)
        .with_context(|| format!("Failed to create log directory {}", logs_dir.display()))?;

    let appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let env_value = std::env::var("GUARDIAO_LOG").ok();
    let filter = build_filter(env_value.as_deref(), configured_level);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!("Failed to install log subscriber: {err}"))?;

    Ok(guard)
}
