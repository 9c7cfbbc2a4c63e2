use crate::config::Config;
use crate::error::AppError;
use std::io::stdout;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_DIRECTIVE: &str = "t2_scoreboard=info";
const DEFAULT_LOG_FILE_NAME: &str = "t2_scoreboard.log";

/// Where log lines go besides the log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Server mode: stdout and file
    StdoutAndFile,
    /// xbar mode: stdout carries the menu, so only the file
    FileOnly,
}

/// Splits a custom log file path into directory and file name, or returns
/// the default location.
pub fn resolve_log_location(custom_log_path: Option<&str>) -> (String, String) {
    match custom_log_path {
        Some(custom_path) => {
            let path = Path::new(custom_path);
            let parent = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(DEFAULT_LOG_FILE_NAME);
            (parent.to_string_lossy().to_string(), file_name.to_string())
        }
        None => (Config::get_log_dir_path(), DEFAULT_LOG_FILE_NAME.to_string()),
    }
}

fn env_filter() -> Result<EnvFilter, AppError> {
    let directive = DEFAULT_DIRECTIVE
        .parse()
        .map_err(|e| AppError::log_setup_error(format!("Invalid log directive: {e}")))?;
    Ok(EnvFilter::from_default_env().add_directive(directive))
}

/// Sets up logging for the application.
///
/// Uses a daily rolling file appender, creating the log directory if it
/// doesn't exist. `RUST_LOG` directives are honoured on top of
/// `t2_scoreboard=info`.
///
/// Returns the path to the log file and the guard that must be kept alive
/// for the duration of the program to ensure proper log flushing.
pub async fn setup_logging(
    custom_log_path: Option<&str>,
    target: LogTarget,
) -> Result<(String, WorkerGuard), AppError> {
    let (log_dir, log_file_name) = resolve_log_location(custom_log_path);

    if !Path::new(&log_dir).exists() {
        tokio::fs::create_dir_all(&log_dir).await.map_err(|e| {
            AppError::log_setup_error(format!("Failed to create log directory: {e}"))
        })?;
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, &log_file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::Layer::new()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(env_filter()?);
    let registry = tracing_subscriber::registry().with(file_layer);

    match target {
        LogTarget::StdoutAndFile => registry
            .with(
                fmt::Layer::new()
                    .with_writer(stdout)
                    .with_ansi(true)
                    .with_filter(env_filter()?),
            )
            .try_init(),
        LogTarget::FileOnly => registry.try_init(),
    }
    .map_err(|e| AppError::log_setup_error(format!("Failed to install subscriber: {e}")))?;

    let log_file_path = format!("{log_dir}/{log_file_name}");
    Ok((log_file_path, guard))
}
