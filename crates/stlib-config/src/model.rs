//! Typed configuration record persisted to `config.toml`.
//!
//! # Design
//! - Pure data carriers; section names mirror the on-disk TOML layout.
//! - Layering, persistence and publication live in `loader.rs` and `service.rs`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::defaults;

/// Placeholder rendered in place of secret material.
pub const REDACTED: &str = "********";

/// Fully resolved process configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Core process settings.
    pub core: CoreConfig,
    /// HTTP server settings read by the (external) server.
    pub server: ServerConfig,
    /// Library scanning settings.
    pub library: LibraryConfig,
    /// Thumbnail renderer settings.
    pub render: RenderConfig,
    /// Third-party integration credentials.
    pub integrations: IntegrationsConfig,
    /// Storage backend selection.
    pub database: DatabaseConfig,
}

/// `[core]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Logging sinks.
    pub log: LogConfig,
}

/// `[core.log]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Mirror log output into a file sink.
    pub enable_file: bool,
    /// Directory holding the log file; empty selects `<data_path>/logs`.
    pub path: String,
}

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// TCP port the HTTP server binds to.
    pub port: u16,
    /// Public hostname advertised by the server.
    pub hostname: String,
}

/// `[library]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Root directory of the managed library.
    pub path: String,
    /// File name patterns excluded from scans, in match order.
    pub blacklist: Vec<String>,
    /// Skip files and directories whose name starts with a dot.
    pub ignore_dot_files: bool,
}

/// `[render]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Maximum number of concurrent render workers.
    pub max_workers: u32,
    /// Hex color used for rendered models.
    pub model_color: String,
    /// Hex color used for render backgrounds.
    pub background_color: String,
}

/// `[integrations]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationsConfig {
    /// Thingiverse API access.
    pub thingiverse: ThingiverseConfig,
}

/// `[integrations.thingiverse]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThingiverseConfig {
    /// API token; empty disables the integration.
    pub token: String,
}

/// `[database]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Backend identifier (`sqlite` or `postgres`). Kept as free text so an
    /// unknown value reaches the backend selector and is rejected there.
    #[serde(rename = "type")]
    pub kind: String,
    /// Connection parameters used when `kind` is `postgres`.
    pub postgres: PostgresConfig,
}

/// `[database.postgres]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostgresConfig {
    /// Server hostname.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Role used to authenticate.
    pub user: String,
    /// Password for `user`.
    pub password: String,
    /// Database name.
    pub database: String,
    /// libpq-style SSL mode (`disable`, `require`, ...).
    pub sslmode: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            core: CoreConfig {
                log: LogConfig {
                    enable_file: defaults::LOG_ENABLE_FILE,
                    path: String::new(),
                },
            },
            server: ServerConfig {
                port: defaults::SERVER_PORT,
                hostname: defaults::SERVER_HOSTNAME.to_string(),
            },
            library: LibraryConfig {
                path: defaults::LIBRARY_PATH.to_string(),
                blacklist: Vec::new(),
                ignore_dot_files: defaults::IGNORE_DOT_FILES,
            },
            render: RenderConfig {
                max_workers: defaults::RENDER_MAX_WORKERS,
                model_color: defaults::MODEL_COLOR.to_string(),
                background_color: defaults::BACKGROUND_COLOR.to_string(),
            },
            integrations: IntegrationsConfig {
                thingiverse: ThingiverseConfig {
                    token: String::new(),
                },
            },
            database: DatabaseConfig {
                kind: defaults::DATABASE_TYPE.to_string(),
                postgres: PostgresConfig {
                    host: defaults::POSTGRES_HOST.to_string(),
                    port: defaults::POSTGRES_PORT,
                    user: String::new(),
                    password: String::new(),
                    database: String::new(),
                    sslmode: defaults::POSTGRES_SSLMODE.to_string(),
                },
            },
        }
    }
}

impl LogConfig {
    /// Directory receiving the log file: `path` when set, otherwise
    /// `<data_path>/logs`.
    #[must_use]
    pub fn directory(&self, data_path: &Path) -> PathBuf {
        if self.path.is_empty() {
            data_path.join("logs")
        } else {
            PathBuf::from(&self.path)
        }
    }
}

impl Config {
    /// Append the fixed blacklist entries unless the list already ends with them.
    ///
    /// The entries are owned by the application (project metadata and generated
    /// thumbnails) and must always be excluded from library scans.
    pub fn enforce_reserved_blacklist(&mut self) {
        let reserved = defaults::RESERVED_BLACKLIST;
        if self.library.blacklist.ends_with(&reserved.map(str::to_string)) {
            return;
        }
        self.library
            .blacklist
            .extend(reserved.iter().map(|entry| (*entry).to_string()));
    }

    /// JSON view of the record with secret material masked, suitable for logs.
    #[must_use]
    pub fn redacted(&self) -> Value {
        json!({
            "core": { "log": {
                "enable_file": self.core.log.enable_file,
                "path": self.core.log.path,
            }},
            "server": {
                "port": self.server.port,
                "hostname": self.server.hostname,
            },
            "library": {
                "path": self.library.path,
                "blacklist": self.library.blacklist,
                "ignore_dot_files": self.library.ignore_dot_files,
            },
            "render": {
                "max_workers": self.render.max_workers,
                "model_color": self.render.model_color,
                "background_color": self.render.background_color,
            },
            "integrations": { "thingiverse": {
                "token": mask(&self.integrations.thingiverse.token),
            }},
            "database": {
                "type": self.database.kind,
                "postgres": {
                    "host": self.database.postgres.host,
                    "port": self.database.postgres.port,
                    "user": self.database.postgres.user,
                    "password": mask(&self.database.postgres.password),
                    "database": self.database.postgres.database,
                    "sslmode": self.database.postgres.sslmode,
                },
            },
        })
    }
}

fn mask(secret: &str) -> &str {
    if secret.is_empty() { "" } else { REDACTED }
}
