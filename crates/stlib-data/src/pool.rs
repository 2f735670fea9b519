//! Live connection handle for the selected backend.

use std::path::Path;

use once_cell::sync::OnceCell;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use stlib_config::DatabaseConfig;
use tracing::{info, instrument};

use crate::backend::{BackendKind, DatabaseTarget};
use crate::error::{DataError, Result};

const MAX_CONNECTIONS: u32 = 8;

static GLOBAL: OnceCell<Database> = OnceCell::new();

/// Open connection pool for one backend. Cloning shares the pool.
#[derive(Debug, Clone)]
pub enum Database {
    /// Embedded engine pool.
    Sqlite(SqlitePool),
    /// Client/server engine pool.
    Postgres(PgPool),
}

impl Database {
    /// Select the backend from configuration and open it.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::UnsupportedBackend`] without attempting a
    /// connection when the type is unknown, or [`DataError::Connect`] when the
    /// pool cannot be opened.
    pub async fn open(config: &DatabaseConfig, data_path: &Path) -> Result<Self> {
        let target = DatabaseTarget::select(config, data_path)?;
        Self::connect(&target).await
    }

    /// Open a pool for `target`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Connect`] wrapping the driver error when the first
    /// connection cannot be established.
    #[instrument(name = "database.connect", skip(target), fields(backend = %target.kind()))]
    pub async fn connect(target: &DatabaseTarget) -> Result<Self> {
        info!(descriptor = %target, "opening database");
        let database = match target {
            DatabaseTarget::Sqlite(sqlite) => SqlitePoolOptions::new()
                .max_connections(MAX_CONNECTIONS)
                .connect_with(sqlite.connect_options())
                .await
                .map(Self::Sqlite),
            DatabaseTarget::Postgres(postgres) => PgPoolOptions::new()
                .max_connections(MAX_CONNECTIONS)
                .connect_with(postgres.connect_options()?)
                .await
                .map(Self::Postgres),
        };
        database.map_err(|source| DataError::Connect {
            backend: target.kind(),
            source,
        })
    }

    /// Engine behind this handle.
    #[must_use]
    pub const fn kind(&self) -> BackendKind {
        match self {
            Self::Sqlite(_) => BackendKind::Sqlite,
            Self::Postgres(_) => BackendKind::Postgres,
        }
    }

    /// Run a single statement, returning the number of affected rows.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Query`] with a translated [`crate::DbErrorKind`].
    pub async fn execute(&self, operation: &'static str, sql: &str) -> Result<u64> {
        let result = match self {
            Self::Sqlite(pool) => sqlx::query(sql)
                .execute(pool)
                .await
                .map(|done| done.rows_affected()),
            Self::Postgres(pool) => sqlx::query(sql)
                .execute(pool)
                .await
                .map(|done| done.rows_affected()),
        };
        result.map_err(|source| DataError::query(operation, source))
    }

    /// Round-trip a trivial statement to prove the handle is usable.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Query`] if the statement fails.
    pub async fn ping(&self) -> Result<()> {
        self.execute("database.ping", "SELECT 1").await.map(|_| ())
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        match self {
            Self::Sqlite(pool) => pool.close().await,
            Self::Postgres(pool) => pool.close().await,
        }
    }
}

/// Publish `database` as the process-wide handle.
///
/// # Errors
///
/// Returns [`DataError::AlreadyPublished`] if a handle was published before.
pub fn publish(database: Database) -> Result<&'static Database> {
    GLOBAL
        .set(database)
        .map_err(|_| DataError::AlreadyPublished)?;
    GLOBAL.get().ok_or(DataError::AlreadyPublished)
}

/// Process-wide database handle, once published.
#[must_use]
pub fn global() -> Option<&'static Database> {
    GLOBAL.get()
}
