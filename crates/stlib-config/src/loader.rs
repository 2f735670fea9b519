//! Layered resolution of the configuration record.
//!
//! # Design
//! - Layers, lowest first: hardcoded constants, environment-substituted
//!   defaults, the settings file, allow-listed environment bindings.
//! - Every layer is folded into one `toml::Table` before a single decode, so a
//!   key missing from the file keeps the value from the layer below.
//! - An unreadable settings file is logged and skipped; resolution continues.
//! - A file value that does not decode is dropped on its own; the rest of the
//!   file still applies.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use toml::{Table, Value};
use tracing::{debug, instrument, warn};

use crate::defaults::{DATA_PATH_VAR, DEFAULT_DATA_PATH, ENV_BINDINGS, SETTINGS_FILE_NAME};
use crate::env::EnvSource;
use crate::error::{ConfigError, ConfigResult};
use crate::model::Config;
use crate::validate::{coerce_env_value, parse_port};

/// Outcome of resolving every layer for one process start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Merged record, reserved blacklist entries included.
    pub config: Config,
    /// Whether `config.toml` was present before resolution started.
    pub settings_existed: bool,
}

/// Data directory named by `DATA_PATH`, falling back to `/data`.
#[must_use]
pub fn resolve_data_path(env: &impl EnvSource) -> PathBuf {
    env.non_empty(DATA_PATH_VAR)
        .map_or_else(|| PathBuf::from(DEFAULT_DATA_PATH), PathBuf::from)
}

/// Create the data directory and any missing parents.
///
/// # Errors
///
/// Returns [`ConfigError::DataDirectory`] if the directory cannot be created.
pub fn ensure_data_dir(path: &Path) -> ConfigResult<()> {
    fs::create_dir_all(path).map_err(|source| ConfigError::DataDirectory {
        path: path.to_path_buf(),
        source,
    })
}

/// Location of the settings file inside `data_path`.
#[must_use]
pub fn settings_path(data_path: &Path) -> PathBuf {
    data_path.join(SETTINGS_FILE_NAME)
}

/// Hardcoded defaults with environment values substituted where the variable
/// is documented to seed the default.
#[must_use]
pub fn env_defaults(env: &impl EnvSource) -> Config {
    let mut config = Config::default();

    if let Some(port) = env_port(env, "PORT") {
        config.server.port = port;
    }
    if let Some(path) = env.non_empty("LIBRARY_PATH") {
        config.library.path = path;
    }
    if let Some(color) = env.non_empty("MODEL_RENDER_COLOR") {
        config.render.model_color = color;
    }
    if let Some(color) = env.non_empty("MODEL_BACKGROUND_COLOR") {
        config.render.background_color = color;
    }

    let database = &mut config.database;
    if let Some(kind) = env.non_empty("DATABASE_TYPE") {
        database.kind = kind;
    }
    if let Some(host) = env.non_empty("POSTGRES_HOST") {
        database.postgres.host = host;
    }
    if let Some(port) = env_port(env, "POSTGRES_PORT") {
        database.postgres.port = port;
    }
    if let Some(user) = env.non_empty("POSTGRES_USER") {
        database.postgres.user = user;
    }
    if let Some(password) = env.non_empty("POSTGRES_PASSWORD") {
        database.postgres.password = password;
    }
    if let Some(name) = env.non_empty("POSTGRES_DATABASE") {
        database.postgres.database = name;
    }
    if let Some(mode) = env.non_empty("POSTGRES_SSLMODE") {
        database.postgres.sslmode = mode;
    }

    config
}

fn env_port(env: &impl EnvSource, var: &'static str) -> Option<u16> {
    env.non_empty(var).and_then(|raw| parse_port(var, &raw).ok())
}

/// Resolve every layer for the settings file in `data_path`.
///
/// Does not touch the filesystem beyond reading `config.toml`.
///
/// # Errors
///
/// Returns an error only if the built-in defaults themselves cannot be
/// encoded or decoded; settings file problems are logged and skipped.
#[instrument(name = "config.load", skip(env), fields(data_path = %data_path.display()))]
pub fn load(data_path: &Path, env: &impl EnvSource) -> ConfigResult<Resolution> {
    let path = settings_path(data_path);
    let defaults = encode(&env_defaults(env))?;

    let (file_layer, settings_existed) = match read_settings(&path) {
        Ok(Some(table)) => (Some(table), true),
        Ok(None) => {
            debug!(path = %path.display(), "settings file not found");
            (None, false)
        }
        Err(err) => {
            warn!(error = %err, detail = ?err, "settings file ignored; using defaults");
            (None, true)
        }
    };

    let mut document = defaults.clone();
    if let Some(file_layer) = &file_layer {
        merge_tables(&mut document, file_layer.clone());
    }
    apply_env_bindings(&mut document, env);

    let mut config = match decode(document) {
        Ok(config) => config,
        Err(err) => {
            warn!(error = %err, detail = ?err, "settings file has rejected values; keeping the rest");
            let mut fallback = defaults;
            if let Some(file_layer) = file_layer {
                merge_decodable(&mut fallback, file_layer);
            }
            apply_env_bindings(&mut fallback, env);
            decode(fallback)?
        }
    };
    config.enforce_reserved_blacklist();

    Ok(Resolution {
        config,
        settings_existed,
    })
}

/// Read and parse the settings file, returning `None` when it does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or is not valid TOML.
pub fn read_settings(path: &Path) -> ConfigResult<Option<Table>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::SettingsRead {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    toml::from_str::<Table>(&contents)
        .map(Some)
        .map_err(|source| ConfigError::SettingsParse {
            path: path.to_path_buf(),
            source,
        })
}

/// Truncate and rewrite the settings file with `config`.
///
/// # Errors
///
/// Returns an error if the record cannot be encoded or the file cannot be
/// opened or written.
pub fn write_settings(path: &Path, config: &Config) -> ConfigResult<()> {
    let rendered =
        toml::to_string_pretty(config).map_err(|source| ConfigError::Encode { source })?;
    fs::write(path, rendered).map_err(|source| ConfigError::SettingsWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Fold `overlay` into `base`: tables merge key by key, everything else
/// (scalars and arrays) is replaced wholesale.
pub fn merge_tables(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        let Value::Table(incoming) = value else {
            base.insert(key, value);
            continue;
        };
        if let Some(Value::Table(existing)) = base.get_mut(&key) {
            merge_tables(existing, incoming);
            continue;
        }
        base.insert(key, Value::Table(incoming));
    }
}

/// Overwrite allow-listed keys with their non-empty environment values.
pub fn apply_env_bindings(document: &mut Table, env: &impl EnvSource) {
    for binding in ENV_BINDINGS {
        let Some(raw) = env.non_empty(binding.var) else {
            continue;
        };
        match coerce_env_value(binding, &raw) {
            Ok(value) => {
                debug!(var = binding.var, key = binding.key, "environment override applied");
                set_key(document, binding.key, value);
            }
            Err(err) => {
                warn!(var = binding.var, error = %err, detail = ?err, "environment override ignored");
            }
        }
    }
}

/// Fold `overlay` into `base` one leaf at a time, keeping only the leaves
/// that still decode into a [`Config`]. Arrays count as leaves.
fn merge_decodable(base: &mut Table, overlay: Table) {
    let mut leaves = Vec::new();
    collect_leaves(Vec::new(), overlay, &mut leaves);
    for (path, value) in leaves {
        let mut candidate = base.clone();
        set_path(&mut candidate, &path, value);
        match decode(candidate.clone()) {
            Ok(_) => *base = candidate,
            Err(err) => {
                warn!(key = %path.join("."), error = %err, "settings value rejected; keeping lower layer");
            }
        }
    }
}

fn collect_leaves(prefix: Vec<String>, table: Table, leaves: &mut Vec<(Vec<String>, Value)>) {
    for (key, value) in table {
        let mut path = prefix.clone();
        path.push(key);
        match value {
            Value::Table(nested) => collect_leaves(path, nested, leaves),
            other => leaves.push((path, other)),
        }
    }
}

fn set_key(document: &mut Table, dotted: &str, value: Value) {
    let path: Vec<String> = dotted.split('.').map(str::to_string).collect();
    set_path(document, &path, value);
}

fn set_path(document: &mut Table, path: &[String], value: Value) {
    let mut segments = path.iter().peekable();
    let mut current = document;
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.insert(segment.clone(), value);
            return;
        }
        let entry = current
            .entry(segment.clone())
            .or_insert(Value::Table(Table::new()));
        if !entry.is_table() {
            *entry = Value::Table(Table::new());
        }
        let Value::Table(next) = entry else {
            return;
        };
        current = next;
    }
}

fn encode(config: &Config) -> ConfigResult<Table> {
    match Value::try_from(config).map_err(|source| ConfigError::Encode { source })? {
        Value::Table(table) => Ok(table),
        _ => Ok(Table::new()),
    }
}

fn decode(document: Table) -> ConfigResult<Config> {
    Value::Table(document)
        .try_into::<Config>()
        .map_err(|source| ConfigError::Decode { source })
}
