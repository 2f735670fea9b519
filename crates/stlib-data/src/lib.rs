#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Storage backend selection and the shared connection handle for stlib.
//!
//! Layout: `backend.rs` (type to connection descriptor), `pool.rs` (the live
//! handle and its publication), `schema.rs` (ordered initializers),
//! `error.rs` (errors and driver error translation).

pub mod backend;
pub mod error;
pub mod pool;
pub mod schema;

pub use backend::{BackendKind, DatabaseTarget, PostgresTarget, SQLITE_FILE_NAME, SqliteTarget};
pub use error::{DataError, DbErrorKind, Result as DataResult};
pub use pool::{Database, global, publish};
pub use schema::{SchemaInitializer, TableSchema, catalog, initialize_schema};
