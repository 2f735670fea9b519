//! Error types for configuration operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The data directory could not be created.
    #[error("failed to create data directory")]
    DataDirectory {
        /// Directory that could not be created.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
    /// The settings file exists but could not be read.
    #[error("failed to read settings file")]
    SettingsRead {
        /// Settings file path.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
    /// The settings file is not valid TOML.
    #[error("failed to parse settings file")]
    SettingsParse {
        /// Settings file path.
        path: PathBuf,
        /// Source TOML error.
        source: toml::de::Error,
    },
    /// The merged layers did not decode into a configuration record.
    #[error("failed to decode merged configuration")]
    Decode {
        /// Source TOML error.
        source: toml::de::Error,
    },
    /// The record could not be rendered as TOML.
    #[error("failed to encode configuration")]
    Encode {
        /// Source TOML error.
        source: toml::ser::Error,
    },
    /// The settings file could not be opened or written.
    #[error("failed to write settings file")]
    SettingsWrite {
        /// Settings file path.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
    /// An allow-listed environment variable held an unusable value.
    #[error("invalid environment value")]
    InvalidEnvValue {
        /// Environment variable name.
        var: &'static str,
        /// Offending value.
        value: String,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// A configuration store was already published for this process.
    #[error("configuration already published")]
    AlreadyPublished,
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn config_error_messages_are_constant_and_keep_sources() {
        let io_err = ConfigError::SettingsWrite {
            path: PathBuf::from("/data/config.toml"),
            source: io::Error::other("disk full"),
        };
        assert_eq!(io_err.to_string(), "failed to write settings file");
        assert!(io_err.source().is_some());

        let env_err = ConfigError::InvalidEnvValue {
            var: "PORT",
            value: "http".to_string(),
            reason: "not_an_integer",
        };
        assert_eq!(env_err.to_string(), "invalid environment value");
        assert!(env_err.source().is_none());
    }
}
