//! Owning container for the resolved configuration.
//!
//! # Design
//! - `ConfigStore::resolve` runs the full startup sequence once per process.
//! - Readers get cheap `Arc<Config>` snapshots; `save` swaps the published
//!   record atomically after every attempted write.
//! - `save` is not serialized internally; concurrent callers must coordinate.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use once_cell::sync::OnceCell;
use tracing::{info, instrument, warn};

use crate::env::EnvSource;
use crate::error::{ConfigError, ConfigResult};
use crate::loader::{ensure_data_dir, load, resolve_data_path, settings_path, write_settings};
use crate::model::Config;

static GLOBAL: OnceCell<Arc<ConfigStore>> = OnceCell::new();

/// Resolved configuration plus the data directory it was resolved from.
#[derive(Debug)]
pub struct ConfigStore {
    data_path: PathBuf,
    current: ArcSwap<Config>,
}

impl ConfigStore {
    /// Resolve the data directory and every configuration layer from `env`.
    ///
    /// When no settings file existed, the resolved record is written to
    /// `<data_path>/config.toml`; a failed write is logged and the in-memory
    /// record stays authoritative.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DataDirectory`] if the data directory cannot be
    /// created.
    #[instrument(name = "config_store.resolve", skip(env))]
    pub fn resolve(env: &impl EnvSource) -> ConfigResult<Self> {
        let data_path = resolve_data_path(env);
        ensure_data_dir(&data_path)?;

        let resolution = load(&data_path, env)?;
        if !resolution.settings_existed {
            let path = settings_path(&data_path);
            info!(path = %path.display(), "settings file not found; creating");
            if let Err(err) = write_settings(&path, &resolution.config) {
                warn!(error = %err, detail = ?err, "failed to persist initial settings");
            }
        }

        Ok(Self::with_config(data_path, resolution.config))
    }

    /// Wrap an already resolved record without touching the filesystem.
    #[must_use]
    pub fn with_config(data_path: PathBuf, config: Config) -> Self {
        Self {
            data_path,
            current: ArcSwap::from_pointee(config),
        }
    }

    /// Directory holding the settings file and the embedded database.
    #[must_use]
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Path of the settings file.
    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        settings_path(&self.data_path)
    }

    /// Snapshot of the currently published record.
    #[must_use]
    pub fn current(&self) -> Arc<Config> {
        self.current.load_full()
    }

    /// Overwrite the settings file with `config` and publish it.
    ///
    /// The record is published even when the write fails, so memory and disk
    /// can diverge until the next successful save.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be encoded, opened or written.
    #[instrument(name = "config_store.save", skip(self, config))]
    pub fn save(&self, config: Config) -> ConfigResult<()> {
        let result = write_settings(&self.settings_path(), &config);
        if let Err(err) = &result {
            warn!(error = %err, detail = ?err, "settings file write failed; publishing in-memory record");
        }
        self.current.store(Arc::new(config));
        result
    }
}

/// Publish `store` as the process-wide configuration.
///
/// # Errors
///
/// Returns [`ConfigError::AlreadyPublished`] if a store was published before.
pub fn publish(store: Arc<ConfigStore>) -> ConfigResult<&'static Arc<ConfigStore>> {
    GLOBAL
        .set(store)
        .map_err(|_| ConfigError::AlreadyPublished)?;
    GLOBAL.get().ok_or(ConfigError::AlreadyPublished)
}

/// Process-wide configuration store, once published.
#[must_use]
pub fn global() -> Option<&'static Arc<ConfigStore>> {
    GLOBAL.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn save_publishes_even_when_write_fails() {
        let missing = std::env::temp_dir().join("stlib-missing-dir/definitely/absent");
        let store = ConfigStore::with_config(missing, Config::default());

        let mut updated = Config::default();
        updated.server.port = 9100;
        let err = store.save(updated).unwrap_err();
        assert!(matches!(err, ConfigError::SettingsWrite { .. }));
        assert_eq!(store.current().server.port, 9100);
    }

    #[test]
    fn snapshots_are_stable_across_saves() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ConfigStore::with_config(dir.path().to_path_buf(), Config::default());
        let before = store.current();

        let mut updated = Config::default();
        updated.render.max_workers = 9;
        store.save(updated).expect("save");

        assert_eq!(before.render.max_workers, 5);
        assert_eq!(store.current().render.max_workers, 9);
    }

    #[test]
    fn resolve_fails_when_data_path_is_a_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("occupied");
        std::fs::write(&file, b"x").expect("write");
        let env = HashMap::from([(
            "DATA_PATH".to_string(),
            file.join("nested").display().to_string(),
        )]);
        let err = ConfigStore::resolve(&env).unwrap_err();
        assert!(matches!(err, ConfigError::DataDirectory { .. }));
    }

    #[test]
    fn publish_is_single_shot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(ConfigStore::with_config(
            dir.path().to_path_buf(),
            Config::default(),
        ));
        let first = publish(Arc::clone(&store));
        let second = publish(store);
        assert!(first.is_ok());
        assert!(matches!(second, Err(ConfigError::AlreadyPublished)));
        assert!(global().is_some());
    }
}
