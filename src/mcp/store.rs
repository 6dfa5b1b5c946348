//! The config file engine: strict reads and atomic writes of one file per scope.

use super::{ConfigFile, ConfigLayout};
use crate::core::{GateError, Result};
use crate::utils::fs::{self as gate_fs, ConfigFs, OsFs, atomic_replace};
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

/// Process-wide write locks keyed by config path.
///
/// Every store shares this registry so two stores pointed at the same file
/// still serialize their writes.
static WRITE_LOCKS: LazyLock<DashMap<PathBuf, Arc<Mutex<()>>>> = LazyLock::new(DashMap::new);

fn lock_for(path: &Path) -> Arc<Mutex<()>> {
    WRITE_LOCKS.entry(path.to_path_buf()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
}

/// Reads and writes the config file of a scope directory.
///
/// The store is the only component that writes config files. Reads are
/// strict: an absent file is an empty config, but a present file that does not
/// parse is a [`GateError::MalformedConfig`].
#[derive(Debug, Clone)]
pub struct ConfigStore {
    layout: ConfigLayout,
    fs: Arc<dyn ConfigFs>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(ConfigLayout::default())
    }
}

impl ConfigStore {
    /// Store for `layout` on the real filesystem.
    #[must_use]
    pub fn new(layout: ConfigLayout) -> Self {
        Self::with_fs(layout, Arc::new(OsFs))
    }

    /// Store using a custom filesystem (used to inject write failures).
    #[must_use]
    pub fn with_fs(layout: ConfigLayout, fs: Arc<dyn ConfigFs>) -> Self {
        Self {
            layout,
            fs,
        }
    }

    /// The layout this store reads and writes.
    #[must_use]
    pub const fn layout(&self) -> &ConfigLayout {
        &self.layout
    }

    /// Path of the live config file for `dir`.
    #[must_use]
    pub fn config_path(&self, dir: &Path) -> PathBuf {
        self.layout.config_path(dir)
    }

    /// Path of the transient backup sibling for `dir`.
    #[must_use]
    pub fn backup_path(&self, dir: &Path) -> PathBuf {
        gate_fs::backup_path(&self.config_path(dir))
    }

    /// Path of the transient temp sibling for `dir`.
    #[must_use]
    pub fn temp_path(&self, dir: &Path) -> PathBuf {
        gate_fs::temp_path(&self.config_path(dir))
    }

    /// Whether the config file for `dir` exists.
    #[must_use]
    pub fn exists(&self, dir: &Path) -> bool {
        self.fs.exists(&self.config_path(dir))
    }

    /// Read the config for `dir`.
    ///
    /// # Errors
    ///
    /// - [`GateError::MalformedConfig`] if the file exists but is not a valid config
    /// - [`GateError::Io`] if the file exists but cannot be read
    pub fn read(&self, dir: &Path) -> Result<ConfigFile> {
        let path = self.config_path(dir);
        let text = match self.fs.read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config at {}, using empty config", path.display());
                return Ok(ConfigFile::default());
            }
            Err(e) => return Err(GateError::io(&path, e)),
        };

        let value: serde_json::Value = gate_fs::parse(&text).map_err(|reason| GateError::MalformedConfig {
            path: path.clone(),
            reason,
        })?;
        ConfigFile::from_value(value, &self.layout.server_key, &path)
    }

    /// Write `config` for `dir` using the atomic replace protocol.
    ///
    /// Output is pretty-printed with 2-space indentation and a trailing
    /// newline. Writes to the same path are serialized.
    ///
    /// # Errors
    ///
    /// [`GateError::WriteFailure`] if any protocol step fails; the previous
    /// content has been restored by then.
    pub fn write(&self, dir: &Path, config: &ConfigFile) -> Result<()> {
        let path = self.config_path(dir);
        let lock = lock_for(&path);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.write_locked(&path, config)
    }

    /// Read, mutate, and write the config for `dir` while holding its write lock.
    ///
    /// Nothing is written when `mutate` fails.
    pub fn update<T, F>(&self, dir: &Path, mutate: F) -> Result<T>
    where
        F: FnOnce(&mut ConfigFile) -> Result<T>,
    {
        let path = self.config_path(dir);
        let lock = lock_for(&path);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut config = self.read(dir)?;
        let out = mutate(&mut config)?;
        self.write_locked(&path, &config)?;
        Ok(out)
    }

    fn write_locked(&self, path: &Path, config: &ConfigFile) -> Result<()> {
        if let Some(parent) = path.parent() {
            gate_fs::ensure_dir(parent)?;
        }

        let value = config.to_value(&self.layout.server_key)?;
        let mut text = gate_fs::stringify(&value, true).map_err(|reason| GateError::WriteFailure {
            path: path.to_path_buf(),
            reason,
            restored: false,
        })?;
        text.push('\n');

        atomic_replace(self.fs.as_ref(), path, text.as_bytes())?;
        tracing::debug!("Wrote {} ({} servers)", path.display(), config.servers.len());
        Ok(())
    }

    /// Create the namespace directory for `dir` if it is missing.
    pub fn ensure_directory(&self, dir: &Path) -> Result<()> {
        gate_fs::ensure_dir(&self.layout.config_dir(dir))
    }

    /// Create the directory and an empty config file for `dir` if missing.
    ///
    /// An existing file is left untouched.
    pub fn ensure_config_file(&self, dir: &Path) -> Result<()> {
        self.ensure_directory(dir)?;
        if self.exists(dir) {
            return Ok(());
        }
        tracing::debug!("Creating empty config at {}", self.config_path(dir).display());
        self.write(dir, &ConfigFile::default())
    }

    /// Rewrite the current config for `dir` and log each applied change.
    ///
    /// Returns `false` (after logging the reason) if the config cannot be read
    /// or written. The file is never left in a partial state.
    pub fn save_changes<S: AsRef<str>>(&self, dir: &Path, changes: &[S]) -> bool {
        let path = self.config_path(dir);
        let result = self.update(dir, |_| Ok(()));
        match result {
            Ok(()) => {
                for change in changes {
                    tracing::info!("{}: {}", path.display(), change.as_ref());
                }
                true
            }
            Err(e) => {
                tracing::warn!("Could not save {} change(s) to {}: {e}", changes.len(), path.display());
                false
            }
        }
    }
}
