//! Backend selection: `database.type` to a connection descriptor.
//!
//! # Design
//! - The supported engines form a closed set; each variant carries exactly the
//!   parameters needed to open it.
//! - Selection never opens a connection, so an unsupported type fails before
//!   any IO happens.

use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use sqlx::postgres::{PgConnectOptions, PgSslMode};
use sqlx::sqlite::SqliteConnectOptions;
use stlib_config::{DatabaseConfig, PostgresConfig};

use crate::error::{DataError, Result};

/// File name of the embedded database inside the data directory.
pub const SQLITE_FILE_NAME: &str = "data.db";

/// Supported storage engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Embedded file-based engine.
    Sqlite,
    /// Client/server engine.
    Postgres,
}

impl BackendKind {
    /// Identifier used in `database.type`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Postgres => "postgres",
        }
    }
}

impl FromStr for BackendKind {
    type Err = DataError;

    /// An empty identifier selects `sqlite` for older settings files.
    fn from_str(value: &str) -> Result<Self> {
        match value {
            "" | "sqlite" => Ok(Self::Sqlite),
            "postgres" => Ok(Self::Postgres),
            other => Err(DataError::UnsupportedBackend {
                value: other.to_string(),
            }),
        }
    }
}

impl Display for BackendKind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Embedded database file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteTarget {
    /// Absolute or data-dir-relative path of the database file.
    pub path: PathBuf,
}

impl SqliteTarget {
    /// Driver options for this file, creating it when missing.
    #[must_use]
    pub fn connect_options(&self) -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(true)
    }
}

/// Postgres server parameters, copied verbatim from configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct PostgresTarget {
    /// Server hostname.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Role name.
    pub user: String,
    /// Role password.
    pub password: String,
    /// Database name.
    pub database: String,
    /// libpq SSL mode.
    pub sslmode: String,
}

impl PostgresTarget {
    /// Keyword/value connection string in libpq format.
    #[must_use]
    pub fn dsn(&self) -> String {
        self.render_dsn(&self.password)
    }

    /// Connection string with the password masked, for logs.
    #[must_use]
    pub fn redacted_dsn(&self) -> String {
        let password = if self.password.is_empty() {
            ""
        } else {
            stlib_config::model::REDACTED
        };
        self.render_dsn(password)
    }

    fn render_dsn(&self, password: &str) -> String {
        format!(
            "host={} port={} user={} password={} dbname={} sslmode={}",
            self.host, self.port, self.user, password, self.database, self.sslmode
        )
    }

    /// Driver options for this server.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Connect`] if the SSL mode is not one libpq knows.
    pub fn connect_options(&self) -> Result<PgConnectOptions> {
        let ssl_mode = PgSslMode::from_str(&self.sslmode).map_err(|source| DataError::Connect {
            backend: BackendKind::Postgres,
            source,
        })?;
        Ok(PgConnectOptions::new_without_pgpass()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
            .ssl_mode(ssl_mode))
    }
}

impl fmt::Debug for PostgresTarget {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("PostgresTarget")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("sslmode", &self.sslmode)
            .finish()
    }
}

impl From<&PostgresConfig> for PostgresTarget {
    fn from(config: &PostgresConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            user: config.user.clone(),
            password: config.password.clone(),
            database: config.database.clone(),
            sslmode: config.sslmode.clone(),
        }
    }
}

/// Connection descriptor for exactly one backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    /// Embedded engine.
    Sqlite(SqliteTarget),
    /// Client/server engine.
    Postgres(PostgresTarget),
}

impl DatabaseTarget {
    /// Select the backend named by `config.kind`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::UnsupportedBackend`] for any identifier other than
    /// `""`, `sqlite` or `postgres`.
    pub fn select(config: &DatabaseConfig, data_path: &Path) -> Result<Self> {
        match config.kind.parse::<BackendKind>()? {
            BackendKind::Sqlite => Ok(Self::Sqlite(SqliteTarget {
                path: data_path.join(SQLITE_FILE_NAME),
            })),
            BackendKind::Postgres => Ok(Self::Postgres(PostgresTarget::from(&config.postgres))),
        }
    }

    /// Engine this descriptor opens.
    #[must_use]
    pub const fn kind(&self) -> BackendKind {
        match self {
            Self::Sqlite(_) => BackendKind::Sqlite,
            Self::Postgres(_) => BackendKind::Postgres,
        }
    }
}

impl Display for DatabaseTarget {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite(target) => write!(formatter, "sqlite://{}", target.path.display()),
            Self::Postgres(target) => formatter.write_str(&target.redacted_dsn()),
        }
    }
}
