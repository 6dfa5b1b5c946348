//! Directory scaffolding.

use crate::core::{GateError, Result};
use std::fs;
use std::path::Path;

#[cfg(unix)]
use crate::constants::NAMESPACE_DIR_MODE;

/// Ensures a directory exists, creating it and all parent directories if necessary.
///
/// Newly created directories get mode `0755` on Unix. Calling this on an
/// existing directory is a no-op.
///
/// # Errors
///
/// Fails with [`GateError::Io`] if the path exists but is not a directory, or
/// creation fails.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    if path.exists() {
        return Err(GateError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::AlreadyExists, "path exists but is not a directory"),
        ));
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(NAMESPACE_DIR_MODE);
    }
    builder.create(path).map_err(|e| GateError::io(path, e))?;
    tracing::debug!("Created directory {}", path.display());
    Ok(())
}
