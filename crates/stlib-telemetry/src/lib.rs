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

//! Logging setup shared by the stlib binaries.
//!
//! The console subscriber is installed before configuration is resolved; the
//! file sink is attached later through the returned [`LoggingHandle`].

pub mod error;
pub mod init;

pub use error::{Result, TelemetryError};
pub use init::{
    DEFAULT_LOG_LEVEL, LOG_FILE_NAME, LogFormat, LoggingConfig, LoggingHandle, build_sha,
    init_logging,
};
