use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Log directory: `<cache_dir>/foldertrack/logs`.
pub fn log_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join("foldertrack").join("logs"))
}

/// Route `tracing` output to a daily-rolling file.
///
/// The terminal belongs to ratatui, so nothing is written to stdout/stderr.
/// `RUST_LOG` overrides the default `info` level. The returned guard must
/// live until exit or buffered lines are lost. Returns `None` when there is
/// no usable log directory; logging is then disabled.
pub fn init() -> Option<WorkerGuard> {
    let dir = log_dir()?;
    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("warning: cannot create log directory {}: {e}", dir.display());
        return None;
    }

    let appender = tracing_appender::rolling::daily(&dir, "foldertrack.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false),
        )
        .try_init()
        .ok()?;

    tracing::info!(dir = %dir.display(), "foldertrack starting up");
    Some(guard)
}
