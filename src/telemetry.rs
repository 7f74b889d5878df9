//! Tracing subscriber setup.
//!
//! `RUST_LOG` overrides the configured filter when it is set and non-empty.

use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] ParseError),

    #[error("failed to install tracing subscriber: {0}")]
    Install(String),
}

/// Installs the global fmt subscriber. Call once at startup.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = EnvFilter::try_new(filter_directives(env.as_deref(), config))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| TelemetryError::Install(e.to_string()))
}

fn filter_directives<'a>(env: Option<&'a str>, config: &'a LoggingConfig) -> &'a str {
    match env {
        Some(directives) if !directives.trim().is_empty() => directives,
        _ => &config.filter,
    }
}
