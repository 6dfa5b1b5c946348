//! Conversion of the legacy `blocked.json` marker into per-entry metadata.
//!
//! Older releases recorded blocked names in `<project>/.claude/blocked.json`:
//!
//! ```json
//! { "servers": ["alpha", "beta"], "memory": [".claude/memory/notes.md"] }
//! ```
//!
//! Migration converts every listed server into an override entry and renames
//! every listed memory file to its `.blocked` form with the same rules as a
//! direct memory block. It is all-or-nothing: the
//! config is written once, memory renames are undone if anything fails, and
//! the marker is only deleted after everything is durable. Without a marker
//! the call is a no-op, so it is safe to run on every startup.

use super::ConfigStore;
use super::blocking::create_override;
use crate::constants::{BLOCKED_SUFFIX, LEGACY_MARKER_FILE, NAMESPACE_DIR};
use crate::core::{GateError, Result};
use crate::memory::block_memory_file;
use crate::models::{ServerConfig, ServerEntry};
use crate::utils::fs::{read_json_file, sibling_path};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Parsed contents of the legacy marker file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyMarker {
    /// Names of blocked servers
    #[serde(default)]
    pub servers: Vec<String>,
    /// Blocked memory files, relative to the project directory
    #[serde(default)]
    pub memory: Vec<PathBuf>,
}

/// Outcome of [`migrate_legacy`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    /// Whether a marker was found and converted
    pub migrated: bool,
    /// Servers now represented as overrides
    pub servers_count: usize,
    /// Memory files now carrying the blocked suffix
    pub memory_count: usize,
}

/// Location of the legacy marker for project directory `dir`.
#[must_use]
pub fn legacy_marker_path(dir: &Path) -> PathBuf {
    dir.join(NAMESPACE_DIR).join(LEGACY_MARKER_FILE)
}

/// Migrate the legacy marker of `dir`, looking servers up in the local file only.
pub fn migrate_legacy(store: &ConfigStore, dir: &Path) -> Result<MigrationReport> {
    migrate_legacy_with(store, dir, &BTreeMap::new())
}

/// Migrate the legacy marker of `dir`.
///
/// A listed server is looked up in the local file first, then in `inherited`
/// (definitions visible from ancestor scopes). Names found in neither are
/// skipped with a warning.
///
/// # Errors
///
/// - [`GateError::MalformedConfig`] if the marker or the local file cannot be parsed
/// - [`GateError::WriteFailure`] or [`GateError::Io`] if a step fails; every
///   memory rename has been undone and the marker is kept
pub fn migrate_legacy_with(
    store: &ConfigStore,
    dir: &Path,
    inherited: &BTreeMap<String, ServerConfig>,
) -> Result<MigrationReport> {
    let marker_path = legacy_marker_path(dir);
    if !marker_path.exists() {
        return Ok(MigrationReport::default());
    }
    let marker = load_marker(&marker_path)?;
    tracing::info!(
        "Migrating legacy marker {} ({} servers, {} memory files)",
        marker_path.display(),
        marker.servers.len(),
        marker.memory.len()
    );

    let mut config = store.read(dir)?;
    let mut changed = false;
    let mut servers_count = 0;
    for name in &marker.servers {
        let original = match config.get(name) {
            Some(ServerEntry::Blocked(_)) => {
                servers_count += 1;
                continue;
            }
            Some(ServerEntry::Plain(plain)) => plain.clone(),
            None => match inherited.get(name) {
                Some(definition) => definition.clone(),
                None => {
                    tracing::warn!("Legacy marker lists server '{name}', which no longer exists");
                    continue;
                }
            },
        };
        config.insert(name.clone(), create_override(name, &original));
        changed = true;
        servers_count += 1;
    }

    let mut renamed: Vec<(PathBuf, PathBuf)> = Vec::new();
    let mut memory_count = 0;
    let memory_result = (|| -> Result<()> {
        for relative in &marker.memory {
            let active = dir.join(relative);
            if active.symlink_metadata().is_ok() {
                let blocked = block_memory_file(&active)?;
                renamed.push((active, blocked));
                memory_count += 1;
            } else if sibling_path(&active, BLOCKED_SUFFIX).exists() {
                memory_count += 1;
            } else {
                tracing::warn!(
                    "Legacy marker lists memory file '{}', which no longer exists",
                    relative.display()
                );
            }
        }
        Ok(())
    })();

    let write_result = memory_result.and_then(|()| if changed { store.write(dir, &config) } else { Ok(()) });
    if let Err(e) = write_result {
        rollback_renames(&renamed);
        return Err(e);
    }

    std::fs::remove_file(&marker_path).map_err(|e| GateError::io(&marker_path, e))?;
    tracing::info!(
        "Legacy migration complete: {servers_count} servers, {memory_count} memory files"
    );
    Ok(MigrationReport {
        migrated: true,
        servers_count,
        memory_count,
    })
}

fn load_marker(path: &Path) -> Result<LegacyMarker> {
    let value = read_json_file(path).ok_or_else(|| GateError::MalformedConfig {
        path: path.to_path_buf(),
        reason: "legacy marker is unreadable or not valid JSON".to_string(),
    })?;
    serde_json::from_value(value).map_err(|e| GateError::MalformedConfig {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn rollback_renames(renamed: &[(PathBuf, PathBuf)]) {
    for (active, blocked) in renamed.iter().rev() {
        if let Err(e) = std::fs::rename(blocked, active) {
            tracing::warn!("Could not restore {}: {e}", active.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::ConfigLayout;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_marker(dir: &Path, marker: serde_json::Value) {
        let path = legacy_marker_path(dir);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, marker.to_string()).unwrap();
    }

    #[test]
    fn test_no_marker_is_noop() {
        let temp = TempDir::new().unwrap();
        let store = ConfigStore::new(ConfigLayout::local());

        let report = migrate_legacy(&store, temp.path()).unwrap();
        assert_eq!(report, MigrationReport::default());
        assert!(!store.exists(temp.path()));
    }

    #[test]
    fn test_malformed_marker_is_kept() {
        let temp = TempDir::new().unwrap();
        let store = ConfigStore::new(ConfigLayout::local());
        let path = legacy_marker_path(temp.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();

        let err = migrate_legacy(&store, temp.path()).unwrap_err();
        assert!(matches!(err, GateError::MalformedConfig { .. }));
        assert!(path.exists());
    }

    #[test]
    fn test_inherited_definitions_are_used() {
        let temp = TempDir::new().unwrap();
        let store = ConfigStore::new(ConfigLayout::local());
        write_marker(temp.path(), json!({"servers": ["remote"]}));

        let inherited =
            BTreeMap::from([("remote".to_string(), ServerConfig::new("uvx", ["remote-mcp"]))]);
        let report = migrate_legacy_with(&store, temp.path(), &inherited).unwrap();
        assert_eq!(report.servers_count, 1);

        let config = store.read(temp.path()).unwrap();
        let entry = config.get("remote").unwrap();
        assert!(entry.is_blocked());
        entry.validate().unwrap();
    }
}
