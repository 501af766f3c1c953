use std::io;
use std::str::FromStr;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::errors::AppError;
use crate::errors::Result;

/// Parse a configured level name such as `"info"` or `"DEBUG"`
pub fn parse_level(level: &str) -> Result<Level> {
    Level::from_str(level.trim()).map_err(|_| AppError::InvalidLogLevel(level.to_string()))
}

/// Initialise tracing to stdout and a non-blocking hourly log file
///
/// `RUST_LOG` takes precedence over `default_level`. Keep the returned guard
/// alive for the lifetime of the process or buffered file output is lost.
pub fn init_with_stdout(app_name: &str, log_dir: &str, default_level: Level) -> WorkerGuard {
    let _ = std::fs::create_dir_all(log_dir);

    let file_appender = tracing_appender::rolling::hourly(log_dir, format!("{app_name}.log"));
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::builder().with_default_directive(default_level.into()).from_env_lossy();

    let file_layer =
        fmt::layer().with_writer(non_blocking).with_target(true).with_thread_ids(true).with_thread_names(true).with_ansi(false).compact();

    let stdout_layer =
        fmt::layer().with_writer(io::stdout).with_target(false).with_thread_names(true).with_ansi(true).compact();

    tracing_subscriber::registry().with(env_filter).with(file_layer).with(stdout_layer).init();

    guard
}
