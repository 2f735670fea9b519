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

//! stlib application bootstrap wiring.
//!
//! Layout: `bootstrap.rs` (startup sequence), `error.rs` (application errors).

/// Startup sequence and process entry point.
pub mod bootstrap;
/// Application-level error type.
pub mod error;

pub use bootstrap::{AppState, BootstrapDependencies, bootstrap, run_app};
pub use error::{AppError, AppResult};
