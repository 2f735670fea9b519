//! # Design
//!
//! - Centralize application-level errors for bootstrap.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Preserve source errors without re-logging at call sites.

use std::io;

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration operations failed.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: stlib_config::ConfigError,
    },
    /// Storage operations failed.
    #[error("storage operation failed")]
    Data {
        /// Operation identifier.
        operation: &'static str,
        /// Source data error.
        source: stlib_data::DataError,
    },
    /// Telemetry operations failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: stlib_telemetry::TelemetryError,
    },
    /// IO operations failed.
    #[error("io operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Source IO error.
        source: io::Error,
    },
}

impl AppError {
    pub(crate) const fn config(operation: &'static str, source: stlib_config::ConfigError) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn data(operation: &'static str, source: stlib_data::DataError) -> Self {
        Self::Data { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: stlib_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn io(operation: &'static str, source: io::Error) -> Self {
        Self::Io { operation, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn app_error_helpers_build_variants() {
        let config = AppError::config("config_store.publish", stlib_config::ConfigError::AlreadyPublished);
        assert!(matches!(
            config,
            AppError::Config {
                operation: "config_store.publish",
                ..
            }
        ));
        assert_eq!(config.to_string(), "configuration operation failed");
        assert!(config.source().is_some());

        let data = AppError::data(
            "database.open",
            stlib_data::DataError::UnsupportedBackend {
                value: "mysql".to_string(),
            },
        );
        assert!(matches!(data, AppError::Data { .. }));

        let telemetry = AppError::telemetry(
            "telemetry.attach",
            stlib_telemetry::TelemetryError::LogFileCreate {
                path: "/nope".into(),
                source: io::Error::other("io"),
            },
        );
        assert!(matches!(telemetry, AppError::Telemetry { .. }));

        let signal = AppError::io("signal.ctrl_c", io::Error::other("io"));
        assert_eq!(signal.to_string(), "io operation failed");
    }
}
