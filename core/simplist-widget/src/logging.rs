//! Logging setup for the widget CLI.
//!
//! Stdout belongs to command output, so logs go to a daily rolling file under
//! `~/.simplist/logs/`. If that directory can't be created we fall back to
//! stderr at `warn`.

use fs_err as fs;
use simplist_core::StorageConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_PREFIX: &str = "simplist-widget.log";
const DEBUG_ENV: &str = "SIMPLIST_DEBUG_LOG";

/// Installs the global subscriber. Keep the returned guard alive until exit
/// so buffered lines are flushed.
pub fn init(storage: Option<&StorageConfig>) -> Option<WorkerGuard> {
    let Some(dir) = storage.map(StorageConfig::logs_dir) else {
        init_stderr();
        return None;
    };

    if let Err(err) = fs::create_dir_all(&dir) {
        init_stderr();
        tracing::warn!(error = %err, "Failed to create log directory; logging to stderr");
        return None;
    }

    let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = tracing_subscriber::registry()
        .with(filter("info"))
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init();
    Some(guard)
}

fn init_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter("warn"))
        .with_writer(std::io::stderr)
        .try_init();
}

fn filter(default_level: &str) -> EnvFilter {
    let debug_enabled = std::env::var(DEBUG_ENV)
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    }
}
