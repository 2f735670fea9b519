//! Error types for telemetry operations.

use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

/// Result alias for telemetry operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Errors raised by telemetry helpers.
#[derive(Debug)]
pub enum TelemetryError {
    /// Installing the tracing subscriber failed.
    SubscriberInstall {
        /// Underlying tracing subscriber error.
        source: tracing_subscriber::util::TryInitError,
    },
    /// Creating or opening the log file failed.
    LogFileCreate {
        /// Path that could not be created or opened.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Swapping the file sink into the running subscriber failed.
    Reload {
        /// Underlying reload error.
        source: tracing_subscriber::reload::Error,
    },
}

impl Display for TelemetryError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::SubscriberInstall { .. } => {
                formatter.write_str("failed to install tracing subscriber")
            }
            Self::LogFileCreate { .. } => formatter.write_str("failed to open log file"),
            Self::Reload { .. } => formatter.write_str("failed to attach log file sink"),
        }
    }
}

impl Error for TelemetryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::SubscriberInstall { source } => Some(source),
            Self::LogFileCreate { source, .. } => Some(source),
            Self::Reload { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_error_keeps_path_and_source() {
        let err = TelemetryError::LogFileCreate {
            path: PathBuf::from("/nope/stlib.log"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert_eq!(err.to_string(), "failed to open log file");
        assert!(err.source().is_some());
        assert!(format!("{err:?}").contains("/nope/stlib.log"));
    }
}
