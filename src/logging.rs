//! Process-wide logging setup.
//!
//! Library code only emits `tracing` events. The binary calls [`init`] once
//! at startup; nothing else installs a subscriber.

use std::fs::{self, File, OpenOptions};
use std::sync::Arc;

use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::config::LoggingSettings;

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log level '{level}': {source}")]
    InvalidLevel {
        level: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("failed to open log file: {0}")]
    File(#[from] std::io::Error),

    #[error("a global subscriber is already installed")]
    AlreadyInitialized,
}

/// Build the level filter: `RUST_LOG` if set, else the configured level.
pub fn env_filter(settings: &LoggingSettings) -> Result<EnvFilter, LoggingError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&settings.level).map_err(|source| {
            LoggingError::InvalidLevel {
                level: settings.level.clone(),
                source,
            }
        }),
    }
}

/// Install the global subscriber: stderr, plus an append-only log file when
/// `settings.file` is set.
pub fn init(settings: &LoggingSettings) -> Result<(), LoggingError> {
    let filter = env_filter(settings)?;

    let file_layer = match &settings.file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            let file: File = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Arc::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)
}
