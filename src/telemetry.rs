//! Tracing initialization.

use std::path::PathBuf;
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use docsearch_config::{ConfigLoader, LoggingConfig};

use crate::error::Error;

/// Keeps the file writer's worker alive for the life of the process.
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides `config.level`. Console output is text or JSON per
/// `config.format`; when `config.directory` is set, logs are also written
/// to daily-rolling files there.
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<bool, Error> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| Error::Telemetry(format!("invalid log level '{}': {}", config.level, e)))?,
    };

    let json = config.format == "json";
    let console_text = (!json).then(|| fmt::layer().with_target(true).with_ansi(true));
    let console_json = json.then(|| fmt::layer().json().with_target(true));

    let file = match &config.directory {
        Some(directory) => Some(
            fmt::layer()
                .with_writer(file_writer(directory)?)
                .with_ansi(false),
        ),
        None => None,
    };

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_text)
        .with(console_json)
        .with(file)
        .try_init()
        .is_ok();

    Ok(installed)
}

fn file_writer(directory: &str) -> Result<NonBlocking, Error> {
    let log_dir = PathBuf::from(ConfigLoader::expand_path(directory));
    std::fs::create_dir_all(&log_dir)
        .map_err(|e| Error::Telemetry(format!("cannot create {}: {}", log_dir.display(), e)))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("docsearch")
        .filename_suffix("log")
        .max_log_files(30)
        .build(&log_dir)
        .map_err(|e| Error::Telemetry(e.to_string()))?;

    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = FILE_GUARD.set(guard);
    Ok(writer)
}
