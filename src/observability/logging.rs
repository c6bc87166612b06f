//! Structured logging configuration.

use crate::config::LoggingSettings;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parses a format name, defaulting to [`LogFormat::Pretty`].
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// Resolved logging configuration.
#[derive(Debug)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// Optional log file; stderr when `None`.
    pub file: Option<PathBuf>,
    /// Event filter.
    pub filter: EnvFilter,
}

impl LoggingConfig {
    /// Resolves settings into a logging configuration.
    ///
    /// The filter comes from `RUST_LOG` when set, then `debug` when
    /// `verbose`, then the configured level, then `info`.
    #[must_use]
    pub fn from_settings(settings: &LoggingSettings, verbose: bool) -> Self {
        let directive = if verbose {
            "debug".to_string()
        } else {
            settings.level.clone().unwrap_or_else(|| "info".to_string())
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"))
        });

        Self {
            format: settings
                .format
                .as_deref()
                .map(LogFormat::parse)
                .unwrap_or_default(),
            file: settings.file.clone(),
            filter,
        }
    }
}
