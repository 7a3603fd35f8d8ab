use crate::config::LogConfig;
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an EnvFilter directive
const LOG_ENV: &str = "STAFFDESK_LOG";

/// Install a file-backed subscriber. The terminal belongs to the UI, so
/// nothing is logged to stdout/stderr.
///
/// Keep the returned guard alive until exit or buffered lines are lost.
pub fn init(config: &LogConfig) -> Result<(WorkerGuard, PathBuf)> {
  let path = match &config.file {
    Some(file) => file.clone(),
    None => default_log_path()?,
  };

  let dir = path
    .parent()
    .map(|p| p.to_path_buf())
    .unwrap_or_else(|| PathBuf::from("."));
  std::fs::create_dir_all(&dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;

  let file_name = path
    .file_name()
    .ok_or_else(|| eyre!("Invalid log file path: {}", path.display()))?;
  let appender = tracing_appender::rolling::never(&dir, file_name);
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let filter = EnvFilter::try_from_env(LOG_ENV)
    .or_else(|_| EnvFilter::try_new(&config.level))
    .map_err(|e| eyre!("Invalid log level {:?}: {}", config.level, e))?;

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(false)
    .try_init()
    .map_err(|e| eyre!("Failed to install logger: {}", e))?;

  Ok((guard, path))
}

fn default_log_path() -> Result<PathBuf> {
  let data_dir = dirs::data_dir().ok_or_else(|| eyre!("Could not determine data directory"))?;
  Ok(data_dir.join("staffdesk").join("staffdesk.log"))
}
