use std::fs;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::{LogSettings, default_log_path};

/// Send `tracing` output to a file; the terminal belongs to the TUI.
///
/// The filter comes from `RUST_LOG`, else `level_override`, else the config.
/// Keep the returned guard alive until exit so buffered lines get flushed.
pub fn init(
    settings: &LogSettings,
    level_override: Option<&str>,
) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error>> {
    let Some(path) = settings.file.clone().or_else(default_log_path) else {
        return Ok(None);
    };
    let dir = path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "spindle.log".into());
    fs::create_dir_all(&dir)?;

    let file_appender = tracing_appender::rolling::never(&dir, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let level = level_override.unwrap_or(&settings.level);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_writer(file_writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_env_filter(filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(Some(guard))
}
