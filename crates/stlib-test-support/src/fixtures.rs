//! Temporary data directories and in-memory environments.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

/// Build an in-memory environment from `(name, value)` pairs.
#[must_use]
pub fn env_from(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
        .collect()
}

/// Disposable data directory removed on drop.
pub struct DataDir {
    root: TempDir,
    nested: PathBuf,
}

impl DataDir {
    /// Create an empty temporary directory. The data path itself points at a
    /// not-yet-existing child so tests observe its creation.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created.
    pub fn new() -> Result<Self> {
        let root = tempfile::tempdir().context("failed to create temporary directory")?;
        let nested = root.path().join("data");
        Ok(Self { root, nested })
    }

    /// Data directory handed to the resolver through `DATA_PATH`.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.nested
    }

    /// Root of the temporary tree.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Location of `config.toml` inside the data directory.
    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.nested.join("config.toml")
    }

    /// Environment with `DATA_PATH` pointing at this directory plus `extra`.
    #[must_use]
    pub fn env(&self, extra: &[(&str, &str)]) -> HashMap<String, String> {
        let mut env = env_from(extra);
        env.insert("DATA_PATH".to_string(), self.nested.display().to_string());
        env
    }

    /// Write raw TOML to `config.toml`, creating the data directory first.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn write_settings(&self, contents: &str) -> Result<()> {
        fs::create_dir_all(&self.nested).context("failed to create data directory")?;
        fs::write(self.settings_path(), contents).context("failed to write settings file")
    }

    /// Read `config.toml` back as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn read_settings(&self) -> Result<String> {
        fs::read_to_string(self.settings_path()).context("failed to read settings file")
    }
}
