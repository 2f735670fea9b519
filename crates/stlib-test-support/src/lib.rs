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

//! Shared test helpers used across integration suites.
//! Layout: fixtures.rs (data directories and in-memory environments),
//! postgres.rs (optional external database).

pub mod fixtures;
pub mod postgres;

pub use fixtures::{DataDir, env_from};
pub use postgres::{ExternalPostgres, external_postgres};
