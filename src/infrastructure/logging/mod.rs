//! Tracing subscriber setup driven by the logging configuration.

use anyhow::{anyhow, Result};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::domain::models::LoggingConfig;

/// Initialize the global tracing subscriber.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
/// `RUST_LOG` overrides the configured level. Calling this twice is an
/// error from `try_init`, surfaced to the caller.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let default_level = parse_log_level(&config.level)?;
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    match config.format.as_str() {
        "json" => builder
            .json()
            .with_current_span(true)
            .try_init()
            .map_err(|e| anyhow!("failed to initialize logging: {e}")),
        "pretty" => builder
            .try_init()
            .map_err(|e| anyhow!("failed to initialize logging: {e}")),
        other => Err(anyhow!("unsupported log format: {other}")),
    }
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => Err(anyhow!("unsupported log level: {other}")),
    }
}
