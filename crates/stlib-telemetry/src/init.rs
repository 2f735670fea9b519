//! Subscriber installation and the optional log file sink.
//!
//! # Design
//! - Console logging (pretty or JSON) is installed once, before configuration
//!   is resolved, so resolver events are never lost.
//! - The file sink occupies a reloadable slot that starts empty; attaching a
//!   file later does not reinstall the subscriber.
//! - Records the build SHA once to avoid inconsistencies across modules.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use once_cell::sync::OnceCell;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt as tracing_fmt, layer::SubscriberExt, reload,
    util::SubscriberInitExt,
};

use crate::error::{Result, TelemetryError};

/// Default logging target when `RUST_LOG` is not provided.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Name of the log file created inside the configured log directory.
pub const LOG_FILE_NAME: &str = "stlib.log";

static BUILD_SHA: OnceCell<String> = OnceCell::new();

type FileSink = Option<Box<dyn Layer<Registry> + Send + Sync>>;

/// Configure and install the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if the tracing subscriber cannot be installed (for example,
/// because another subscriber has already been set globally).
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingHandle> {
    let _ = BUILD_SHA.set(config.build_sha.to_string());

    let (file_layer, file) = reload::Layer::new(FileSink::None);
    let registry = tracing_subscriber::registry()
        .with(file_layer)
        .with(build_env_filter(config.level));

    let installed = match config.format {
        LogFormat::Json => registry
            .with(
                tracing_fmt::layer()
                    .json()
                    .with_target(false)
                    .with_thread_ids(false),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                tracing_fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false),
            )
            .try_init(),
    };
    installed.map_err(|source| TelemetryError::SubscriberInstall { source })?;

    Ok(LoggingHandle { file })
}

/// Access the build SHA recorded during logging initialisation.
#[must_use]
pub fn build_sha() -> &'static str {
    BUILD_SHA.get().map_or("dev", String::as_str)
}

/// Handle onto the installed subscriber, used to attach the file sink.
pub struct LoggingHandle {
    file: reload::Handle<FileSink, Registry>,
}

impl LoggingHandle {
    /// Mirror log output into `<directory>/stlib.log`, creating the directory
    /// when missing and appending to an existing file.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::LogFileCreate`] when the directory or file
    /// cannot be opened, or [`TelemetryError::Reload`] when the subscriber is
    /// gone.
    pub fn attach_log_file(&self, directory: &Path) -> Result<PathBuf> {
        fs::create_dir_all(directory).map_err(|source| TelemetryError::LogFileCreate {
            path: directory.to_path_buf(),
            source,
        })?;
        let path = directory.join(LOG_FILE_NAME);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| TelemetryError::LogFileCreate {
                path: path.clone(),
                source,
            })?;

        let sink: Box<dyn Layer<Registry> + Send + Sync> = tracing_fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(false)
            .boxed();
        self.file
            .reload(Some(sink))
            .map_err(|source| TelemetryError::Reload { source })?;

        info!(path = %path.display(), "log file attached");
        Ok(path)
    }
}

impl fmt::Debug for LoggingHandle {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("LoggingHandle").finish_non_exhaustive()
    }
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig<'a> {
    /// Log level string (e.g., `info`, `debug`).
    pub level: &'a str,
    /// Output format selection for the console sink.
    pub format: LogFormat,
    /// Build identifier recorded in structured logs.
    pub build_sha: &'a str,
}

impl Default for LoggingConfig<'_> {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL,
            format: LogFormat::infer(),
            build_sha: build_sha(),
        }
    }
}

/// Available output formats for the console sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Emit logs as structured JSON objects.
    Json,
    /// Emit human-readable, pretty-printed logs.
    Pretty,
}

impl LogFormat {
    /// Choose a sensible default for the current build.
    #[must_use]
    pub const fn infer() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_info_and_build_format() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.format, LogFormat::infer());
    }

    #[test]
    fn build_sha_defaults_to_dev_before_install() {
        if BUILD_SHA.get().is_none() {
            assert_eq!(build_sha(), "dev");
        }
    }
}
