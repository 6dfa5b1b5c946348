//! Memory files: discovery and rename-based blocking.
//!
//! A memory file is a markdown note under a memory root. Blocking appends
//! `.blocked` to the file name and unblocking strips it, each with a single
//! rename. Whether a file is blocked is derived from its name alone, so
//! [`discover_memory_files`] never consults any other state.

use crate::constants::{BLOCKED_SUFFIX, MEMORY_FILE_SUFFIX, PREVIEW_CHARS};
use crate::core::{GateError, Result};
use crate::models::{MemoryFile, Provenance};
use crate::utils::fs::sibling_path;
use chrono::{DateTime, Utc};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Suffix state of a candidate file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuffixState {
    /// `name.md`
    Active,
    /// `name.md.blocked`
    Blocked,
}

/// Classify a file name as an active or blocked memory file.
///
/// Returns `None` for anything that is not a memory file.
#[must_use]
pub fn suffix_state(file_name: &str) -> Option<SuffixState> {
    let (logical, state) = match file_name.strip_suffix(BLOCKED_SUFFIX) {
        Some(logical) => (logical, SuffixState::Blocked),
        None => (file_name, SuffixState::Active),
    };
    (logical.len() > MEMORY_FILE_SUFFIX.len() && logical.ends_with(MEMORY_FILE_SUFFIX))
        .then_some(state)
}

/// List memory files under `root`, recursively.
///
/// Hidden directories are skipped and symlinks are reported, not followed.
/// A missing root yields an empty list. Results are sorted by path.
#[must_use]
pub fn discover_memory_files(root: &Path, provenance: &Provenance) -> Vec<MemoryFile> {
    if !root.is_dir() {
        return Vec::new();
    }

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden_dir(e));

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Skipping unreadable memory entry under {}: {e}", root.display());
                continue;
            }
        };
        if entry.file_type().is_dir() {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str() else {
            continue;
        };
        let Some(state) = suffix_state(file_name) else {
            continue;
        };

        match describe(root, entry.path(), state, provenance) {
            Ok(file) => files.push(file),
            Err(e) => tracing::debug!("Skipping {}: {e}", entry.path().display()),
        }
    }

    tracing::debug!("Found {} memory files under {}", files.len(), root.display());
    files
}

fn is_hidden_dir(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name().to_str().is_some_and(|n| n.starts_with('.'))
}

fn describe(
    root: &Path,
    path: &Path,
    state: SuffixState,
    provenance: &Provenance,
) -> Result<MemoryFile> {
    let link_meta = fs::symlink_metadata(path).map_err(|e| GateError::io(path, e))?;
    let is_symlink = link_meta.file_type().is_symlink();
    let symlink_target = if is_symlink {
        Some(fs::read_link(path).map_err(|e| GateError::io(path, e))?)
    } else {
        None
    };
    // A dangling symlink still gets listed with the link's own size
    let size_bytes = fs::metadata(path).map_or(link_meta.len(), |m| m.len());

    let blocked = state == SuffixState::Blocked;
    let blocked_at = blocked.then(|| {
        link_meta.modified().map(DateTime::<Utc>::from).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    });

    let logical_path = logical_path(path);
    let name = logical_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    let relative_path = logical_path.strip_prefix(root).unwrap_or(&logical_path).to_path_buf();

    Ok(MemoryFile {
        name,
        path: path.to_path_buf(),
        relative_path,
        provenance: provenance.clone(),
        size_bytes,
        preview: read_preview(path),
        is_symlink,
        symlink_target,
        blocked,
        blocked_at,
    })
}

/// `path` without a trailing `.blocked` marker.
fn logical_path(path: &Path) -> PathBuf {
    path.to_str()
        .and_then(|s| s.strip_suffix(BLOCKED_SUFFIX))
        .map_or_else(|| path.to_path_buf(), PathBuf::from)
}

fn read_preview(path: &Path) -> Option<String> {
    let file = fs::File::open(path).ok()?;
    let mut buf = Vec::new();
    // Four bytes covers the widest UTF-8 character
    file.take((PREVIEW_CHARS * 4) as u64).read_to_end(&mut buf).ok()?;
    let preview: String = String::from_utf8_lossy(&buf).chars().take(PREVIEW_CHARS).collect();
    Some(preview)
}

/// Block a memory file by renaming `name.md` to `name.md.blocked`.
///
/// Returns the new path.
///
/// # Errors
///
/// - [`GateError::NotFound`] if `path` does not exist
/// - [`GateError::ValidationFailure`] if `path` is not an active memory file
///   or the blocked name is already taken
pub fn block_memory_file(path: &Path) -> Result<PathBuf> {
    require_exists(path)?;
    if file_state(path) != Some(SuffixState::Active) {
        return Err(GateError::validation(
            format!("memory file '{}'", path.display()),
            "not an active markdown memory file",
        ));
    }
    let target = sibling_path(path, BLOCKED_SUFFIX);
    rename_exclusive(path, &target)?;
    tracing::info!("Blocked memory file {}", path.display());
    Ok(target)
}

/// Unblock a memory file by renaming `name.md.blocked` back to `name.md`.
///
/// Returns the new path.
///
/// # Errors
///
/// - [`GateError::NotFound`] if `path` does not exist
/// - [`GateError::ValidationFailure`] if `path` does not carry the blocked
///   marker or the unblocked name is already taken
pub fn unblock_memory_file(path: &Path) -> Result<PathBuf> {
    require_exists(path)?;
    if file_state(path) != Some(SuffixState::Blocked) {
        return Err(GateError::validation(
            format!("memory file '{}'", path.display()),
            "not a blocked memory file",
        ));
    }
    let target = logical_path(path);
    rename_exclusive(path, &target)?;
    tracing::info!("Unblocked memory file {}", target.display());
    Ok(target)
}

fn file_state(path: &Path) -> Option<SuffixState> {
    path.file_name().and_then(|n| n.to_str()).and_then(suffix_state)
}

fn require_exists(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(GateError::NotFound {
            kind: "memory file",
            name: path.display().to_string(),
        }),
        Err(e) => Err(GateError::io(path, e)),
    }
}

/// A single `rename`, refusing to replace an existing file.
fn rename_exclusive(from: &Path, to: &Path) -> Result<()> {
    if fs::symlink_metadata(to).is_ok() {
        return Err(GateError::validation(
            format!("memory file '{}'", from.display()),
            format!("'{}' already exists", to.display()),
        ));
    }
    fs::rename(from, to).map_err(|e| GateError::io(from, e))
}
