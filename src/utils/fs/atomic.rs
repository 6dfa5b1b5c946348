//! Crash-safe file replacement using backup, temp file, and rename.
//!
//! [`atomic_replace`] runs the full protocol:
//!
//! 1. Copy the live file (if any) to a `.backup` sibling
//! 2. Write the new content to a `.tmp` sibling and sync it
//! 3. Rename the temp file over the live path
//! 4. Normalize permissions to `0644`
//! 5. Remove the backup
//!
//! If steps 2-4 fail, the backup is renamed back over the live path before the
//! error is returned, and the temp file is always removed on a best-effort
//! basis. At every observable point the live file holds either the previous
//! content or the new content.
//!
//! All filesystem calls go through the [`ConfigFs`] trait so tests can inject
//! failures at any step.

use crate::constants::{BACKUP_SUFFIX, TEMP_SUFFIX};
use crate::core::{GateError, Result};
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use crate::constants::CONFIG_FILE_MODE;

/// Filesystem primitives used by the write protocol.
pub trait ConfigFs: Send + Sync + fmt::Debug {
    /// Whether anything exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Read the whole file as UTF-8.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Copy `from` to `to`, replacing `to`.
    fn copy(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Create or truncate `path` and write `contents` durably.
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Atomically rename `from` over `to`.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Normalize permissions of the live file.
    fn normalize_permissions(&self, path: &Path) -> io::Result<()>;

    /// Remove a file.
    fn remove(&self, path: &Path) -> io::Result<()>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFs;

impl ConfigFs for OsFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::copy(from, to).map(|_| ())
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        use std::io::Write;

        let mut file = fs::File::create(path)?;
        file.write_all(contents)?;
        file.sync_all()
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    #[cfg(unix)]
    fn normalize_permissions(&self, path: &Path) -> io::Result<()> {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(CONFIG_FILE_MODE))
    }

    #[cfg(not(unix))]
    fn normalize_permissions(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

/// `path` with `suffix` appended to its final component.
///
/// ```rust
/// use mcp_gate::utils::fs::sibling_path;
/// use std::path::Path;
///
/// assert_eq!(
///     sibling_path(Path::new("/p/.claude/settings.local.json"), ".tmp"),
///     Path::new("/p/.claude/settings.local.json.tmp")
/// );
/// ```
#[must_use]
pub fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Backup sibling of `path`.
#[must_use]
pub fn backup_path(path: &Path) -> PathBuf {
    sibling_path(path, BACKUP_SUFFIX)
}

/// Temp sibling of `path`.
#[must_use]
pub fn temp_path(path: &Path) -> PathBuf {
    sibling_path(path, TEMP_SUFFIX)
}

/// Replace the file at `path` with `contents` using the backup/temp/rename protocol.
///
/// # Errors
///
/// Returns [`GateError::WriteFailure`] naming the failing step. `restored` is
/// `true` when a backup was put back over the live path.
pub fn atomic_replace(fs: &dyn ConfigFs, path: &Path, contents: &[u8]) -> Result<()> {
    let backup = backup_path(path);
    let temp = temp_path(path);

    let had_live = fs.exists(path);
    if had_live {
        tracing::debug!("Backing up {} to {}", path.display(), backup.display());
        if let Err(e) = fs.copy(path, &backup) {
            // A failed copy may still have created a partial backup
            remove_quietly(fs, &backup);
            return Err(GateError::WriteFailure {
                path: path.to_path_buf(),
                reason: format!("could not create backup: {e}"),
                restored: false,
            });
        }
    }

    let outcome = (|| -> std::result::Result<(), (&'static str, io::Error)> {
        tracing::debug!("Writing {}", temp.display());
        fs.write(&temp, contents).map_err(|e| ("writing temp file", e))?;
        tracing::debug!("Renaming {} over {}", temp.display(), path.display());
        fs.rename(&temp, path).map_err(|e| ("renaming temp file", e))?;
        fs.normalize_permissions(path).map_err(|e| ("setting permissions", e))?;
        Ok(())
    })();

    match outcome {
        Ok(()) => {
            if had_live && let Err(e) = fs.remove(&backup) {
                tracing::warn!("Could not remove backup {}: {e}", backup.display());
            }
            remove_quietly(fs, &temp);
            Ok(())
        }
        Err((step, e)) => {
            let restored = if had_live {
                match fs.rename(&backup, path) {
                    Ok(()) => {
                        tracing::debug!("Restored {} from backup", path.display());
                        true
                    }
                    Err(restore_err) => {
                        tracing::warn!(
                            "Could not restore {} from {}: {restore_err}",
                            path.display(),
                            backup.display()
                        );
                        false
                    }
                }
            } else {
                // Nothing existed before; don't leave a half-configured new file
                remove_quietly(fs, path);
                false
            };
            remove_quietly(fs, &temp);

            Err(GateError::WriteFailure {
                path: path.to_path_buf(),
                reason: format!("{step}: {e}"),
                restored,
            })
        }
    }
}

fn remove_quietly(fs: &dyn ConfigFs, path: &Path) {
    if fs.exists(path)
        && let Err(e) = fs.remove(path)
    {
        tracing::debug!("Could not remove {}: {e}", path.display());
    }
}
