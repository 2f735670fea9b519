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

//! Layered configuration for stlib: defaults, environment and `config.toml`.
//!
//! Layout: `model.rs` (the record), `defaults.rs` (constants and the
//! environment allow-list), `loader.rs` (layer merging and file IO),
//! `service.rs` (`ConfigStore` and process-wide publication).

pub mod defaults;
pub mod env;
pub mod error;
pub mod loader;
pub mod model;
pub mod service;
pub mod validate;

pub use defaults::{ENV_BINDINGS, EnvBinding, RESERVED_BLACKLIST, ValueKind};
pub use env::{EnvSource, ProcessEnv};
pub use error::{ConfigError, ConfigResult};
pub use loader::Resolution;
pub use model::{
    Config, CoreConfig, DatabaseConfig, IntegrationsConfig, LibraryConfig, LogConfig,
    PostgresConfig, RenderConfig, ServerConfig, ThingiverseConfig,
};
pub use service::{ConfigStore, global, publish};
