//! Logging configuration for the BikeHero assistant

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;

use crate::Result;

const LOG_DIR: &str = "logs";
const LOG_FILE: &str = "bikehero.log";

/// Initialize logging from configuration, falling back to `RUST_LOG`
///
/// File output is flushed when the returned guard is dropped; hold it until
/// the process exits.
pub fn init_logging_with_config(config: Option<&crate::config::AppConfig>) -> Result<WorkerGuard> {
    let (env_filter, level) = if let Some(config) = config {
        let level = config.logging.level.as_str();
        (EnvFilter::new(format!("{level},bikehero={level}")), level)
    } else {
        (
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,bikehero=debug")),
            "info",
        )
    };

    let guard = install(env_filter, Path::new(LOG_DIR))?;
    tracing::info!("Logging initialized with level: {} - console and file output enabled", level);
    Ok(guard)
}

/// Initialize logging with custom log level
pub fn init_logging_with_level(level: &str) -> Result<WorkerGuard> {
    let guard = install(
        EnvFilter::new(format!("{level},bikehero={level}")),
        Path::new(LOG_DIR),
    )?;
    tracing::info!("Logging initialized with level: {} - console and file output enabled", level);
    Ok(guard)
}

fn install(env_filter: EnvFilter, logs_dir: &Path) -> Result<WorkerGuard> {
    // Create logs directory if it doesn't exist
    if !logs_dir.exists() {
        std::fs::create_dir_all(logs_dir)?;
    }

    let file_appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(non_blocking)
        .with_ansi(false); // No colors in file

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| crate::BikeHeroError::Custom(format!("Failed to install logger: {e}")))?;

    tracing::info!(
        "Log files will be saved to: {}/{}.YYYY-MM-DD",
        logs_dir.display(),
        LOG_FILE
    );

    Ok(guard)
}
