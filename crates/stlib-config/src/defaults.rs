//! Hardcoded defaults and the environment binding table.
//!
//! # Design
//! - Layer A constants live here so the loader and the model agree on them.
//! - `ENV_BINDINGS` is the explicit allow-list of variables that outrank the
//!   settings file; keys outside the table never read the environment.

/// Environment variable naming the data directory.
pub const DATA_PATH_VAR: &str = "DATA_PATH";
/// Data directory used when `DATA_PATH` is unset or empty.
pub const DEFAULT_DATA_PATH: &str = "/data";
/// Settings file name inside the data directory.
pub const SETTINGS_FILE_NAME: &str = "config.toml";

/// Blacklist entries appended after every layer has been merged.
pub const RESERVED_BLACKLIST: [&str; 3] = [".project.stlib", ".thumb.png", ".render.png"];

pub(crate) const LOG_ENABLE_FILE: bool = false;
pub(crate) const SERVER_PORT: u16 = 8000;
pub(crate) const SERVER_HOSTNAME: &str = "localhost";
pub(crate) const LIBRARY_PATH: &str = "/library";
pub(crate) const IGNORE_DOT_FILES: bool = true;
pub(crate) const RENDER_MAX_WORKERS: u32 = 5;
pub(crate) const MODEL_COLOR: &str = "#167DF0";
pub(crate) const BACKGROUND_COLOR: &str = "#FFFFFF";
pub(crate) const DATABASE_TYPE: &str = "sqlite";
pub(crate) const POSTGRES_HOST: &str = "localhost";
pub(crate) const POSTGRES_PORT: u16 = 5432;
pub(crate) const POSTGRES_SSLMODE: &str = "disable";

/// How a raw environment string is coerced before it lands in a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Stored verbatim.
    Text,
    /// Non-zero TCP port.
    Port,
    /// Non-zero count.
    Count,
}

/// One allow-listed environment variable and the dotted key it overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvBinding {
    /// Environment variable name.
    pub var: &'static str,
    /// Dotted path inside the settings document.
    pub key: &'static str,
    /// Coercion applied to the raw value.
    pub kind: ValueKind,
}

const fn bind(var: &'static str, key: &'static str, kind: ValueKind) -> EnvBinding {
    EnvBinding { var, key, kind }
}

/// Variables whose value wins over the settings file.
pub const ENV_BINDINGS: &[EnvBinding] = &[
    bind("PORT", "server.port", ValueKind::Port),
    bind("LIBRARY_PATH", "library.path", ValueKind::Text),
    bind("MAX_RENDER_WORKERS", "render.max_workers", ValueKind::Count),
    bind("MODEL_RENDER_COLOR", "render.model_color", ValueKind::Text),
    bind("MODEL_BACKGROUND_COLOR", "render.background_color", ValueKind::Text),
    bind("LOG_PATH", "core.log.path", ValueKind::Text),
    bind("THINGIVERSE_TOKEN", "integrations.thingiverse.token", ValueKind::Text),
    bind("DATABASE_TYPE", "database.type", ValueKind::Text),
    bind("POSTGRES_HOST", "database.postgres.host", ValueKind::Text),
    bind("POSTGRES_PORT", "database.postgres.port", ValueKind::Port),
    bind("POSTGRES_USER", "database.postgres.user", ValueKind::Text),
    bind("POSTGRES_PASSWORD", "database.postgres.password", ValueKind::Text),
    bind("POSTGRES_DATABASE", "database.postgres.database", ValueKind::Text),
    bind("POSTGRES_SSLMODE", "database.postgres.sslmode", ValueKind::Text),
];

/// Look up the binding registered for a dotted key.
#[must_use]
pub fn binding_for_key(key: &str) -> Option<&'static EnvBinding> {
    ENV_BINDINGS.iter().find(|binding| binding.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn bindings_are_unique_per_variable_and_key() {
        let vars: HashSet<_> = ENV_BINDINGS.iter().map(|b| b.var).collect();
        let keys: HashSet<_> = ENV_BINDINGS.iter().map(|b| b.key).collect();
        assert_eq!(vars.len(), ENV_BINDINGS.len());
        assert_eq!(keys.len(), ENV_BINDINGS.len());
        assert!(!vars.contains(DATA_PATH_VAR));
    }

    #[test]
    fn unbound_keys_have_no_binding() {
        assert!(binding_for_key("library.blacklist").is_none());
        assert!(binding_for_key("library.ignore_dot_files").is_none());
        assert!(binding_for_key("core.log.enable_file").is_none());
        assert!(binding_for_key("server.hostname").is_none());
        assert_eq!(
            binding_for_key("database.postgres.port").map(|b| b.var),
            Some("POSTGRES_PORT")
        );
    }
}
