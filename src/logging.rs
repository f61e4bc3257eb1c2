use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::constants::constants;

/// Route `tracing` output to a daily-rolling file under the user's data directory.
///
/// The terminal belongs to the TUI, so nothing is written to stderr. The level
/// comes from the `PEW_LOG` environment variable and defaults to `info`. Keep
/// the returned guard alive for the life of the program so buffered lines are
/// flushed on exit.
pub fn init_logging() -> Result<WorkerGuard> {
  let proj_dirs = ProjectDirs::from("", "", "pew").context("Could not determine a home directory for logs")?;
  let log_dir = proj_dirs.data_local_dir().join("logs");
  std::fs::create_dir_all(&log_dir).with_context(|| format!("Failed to create log dir {}", log_dir.display()))?;

  let appender = tracing_appender::rolling::daily(&log_dir, &constants().log_file_prefix);
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let filter = EnvFilter::try_from_env(&constants().log_env_var).unwrap_or_else(|_| EnvFilter::new("info"));

  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(writer).with_ansi(false).with_target(false))
    .with(filter)
    .try_init()
    .map_err(|e| anyhow!("Failed to install log subscriber: {}", e))?;

  Ok(guard)
}
