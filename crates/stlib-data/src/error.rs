//! Error types for the data access layer.
//!
//! Driver errors are translated into [`DbErrorKind`] so callers can react to
//! constraint violations without matching on engine-specific codes.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

use sqlx::error::ErrorKind;

use crate::backend::BackendKind;

/// Result alias for data layer operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Engine-independent classification of a failed statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbErrorKind {
    /// The query expected a row and found none.
    NotFound,
    /// A unique or primary key constraint was violated.
    UniqueViolation,
    /// A foreign key constraint was violated.
    ForeignKeyViolation,
    /// A `NOT NULL` constraint was violated.
    NotNullViolation,
    /// A `CHECK` constraint was violated.
    CheckViolation,
    /// Anything else.
    Other,
}

impl DbErrorKind {
    /// Classify a driver error.
    #[must_use]
    pub fn classify(error: &sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::Database(db) => match db.kind() {
                ErrorKind::UniqueViolation => Self::UniqueViolation,
                ErrorKind::ForeignKeyViolation => Self::ForeignKeyViolation,
                ErrorKind::NotNullViolation => Self::NotNullViolation,
                ErrorKind::CheckViolation => Self::CheckViolation,
                _ => Self::Other,
            },
            _ => Self::Other,
        }
    }
}

/// Errors raised by the data access layer.
#[derive(Debug)]
pub enum DataError {
    /// `database.type` named an engine this build does not support.
    UnsupportedBackend {
        /// Offending backend identifier.
        value: String,
    },
    /// Opening the connection pool failed.
    Connect {
        /// Backend being opened.
        backend: BackendKind,
        /// Underlying driver error.
        source: sqlx::Error,
    },
    /// A statement failed.
    Query {
        /// Operation identifier.
        operation: &'static str,
        /// Translated error kind.
        kind: DbErrorKind,
        /// Underlying driver error.
        source: sqlx::Error,
    },
    /// A schema initializer failed; later initializers were not run.
    SchemaInit {
        /// Name of the failing initializer.
        initializer: &'static str,
        /// Underlying data error.
        source: Box<DataError>,
    },
    /// A database handle was already published for this process.
    AlreadyPublished,
}

impl DataError {
    /// Wrap a driver error raised by `operation`, translating its kind.
    #[must_use]
    pub fn query(operation: &'static str, source: sqlx::Error) -> Self {
        Self::Query {
            operation,
            kind: DbErrorKind::classify(&source),
            source,
        }
    }

    /// Translated error kind, when the failure came from a statement.
    #[must_use]
    pub fn kind(&self) -> Option<DbErrorKind> {
        match self {
            Self::Query { kind, .. } => Some(*kind),
            Self::SchemaInit { source, .. } => source.kind(),
            _ => None,
        }
    }
}

impl Display for DataError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedBackend { value } => {
                write!(formatter, "unsupported database type: {value}")
            }
            Self::Connect { .. } => formatter.write_str("failed to connect database"),
            Self::Query { .. } => formatter.write_str("database operation failed"),
            Self::SchemaInit { initializer, .. } => {
                write!(formatter, "schema initialization failed: {initializer}")
            }
            Self::AlreadyPublished => formatter.write_str("database handle already published"),
        }
    }
}

impl Error for DataError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Connect { source, .. } | Self::Query { source, .. } => Some(source),
            Self::SchemaInit { source, .. } => Some(source.as_ref()),
            Self::UnsupportedBackend { .. } | Self::AlreadyPublished => None,
        }
    }
}
