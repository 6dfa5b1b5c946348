//! Descriptors for the physical locations that contribute configuration.

use crate::core::{GateError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// What a [`ConfigSource`] contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// A JSON file holding MCP server definitions
    Mcp,
    /// A directory of markdown memory files
    Memory,
}

/// Relationship of a source to the working directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Defined in the current scope's own file
    Local,
    /// Defined in an ancestor (project or user) scope
    Inherited,
}

impl SourceType {
    /// Level 0 is local, every higher level is inherited.
    #[must_use]
    pub const fn for_level(hierarchy_level: u32) -> Self {
        if hierarchy_level == 0 { Self::Local } else { Self::Inherited }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Inherited => write!(f, "inherited"),
        }
    }
}

/// Where a merged entity came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    /// File (servers) or memory root (memory files) the entity was read from
    pub source_path: PathBuf,
    /// Local or inherited relative to the working directory
    pub source_type: SourceType,
    /// 0 = most local; larger = more global
    pub hierarchy_level: u32,
}

impl Provenance {
    /// Provenance for an entity found at `source_path` on `hierarchy_level`.
    pub fn new(source_path: impl Into<PathBuf>, hierarchy_level: u32) -> Self {
        Self {
            source_path: source_path.into(),
            source_type: SourceType::for_level(hierarchy_level),
            hierarchy_level,
        }
    }

    /// Shared shape check used by every merged entity.
    pub fn validate(&self, subject: &str) -> Result<()> {
        if !self.source_path.is_absolute() {
            return Err(GateError::validation(
                subject,
                format!("source path '{}' must be absolute", self.source_path.display()),
            ));
        }
        Ok(())
    }
}

/// One physical location contributing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSource {
    /// Absolute path of the file or directory
    pub path: PathBuf,
    /// MCP file or memory directory
    pub kind: SourceKind,
    /// Local or inherited
    pub source_type: SourceType,
    /// 0 = most local
    pub hierarchy_level: u32,
    /// Whether the path exists
    pub exists: bool,
    /// Whether the path could be read
    pub readable: bool,
    /// Modification time; present exactly when `exists` is true
    pub last_modified: Option<DateTime<Utc>>,
}

impl ConfigSource {
    /// Inspect `path` on disk and build a descriptor.
    ///
    /// Never fails: a missing or unreadable path is described, not reported.
    #[must_use]
    pub fn inspect(path: &Path, kind: SourceKind, hierarchy_level: u32) -> Self {
        let metadata = std::fs::metadata(path).ok();
        let exists = metadata.is_some();
        let readable = exists
            && match kind {
                SourceKind::Mcp => std::fs::File::open(path).is_ok(),
                SourceKind::Memory => std::fs::read_dir(path).is_ok(),
            };
        // Fall back to the epoch when the platform cannot report mtime
        let last_modified = metadata.map(|m| {
            m.modified().map(DateTime::<Utc>::from).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
        });

        Self {
            path: path.to_path_buf(),
            kind,
            source_type: SourceType::for_level(hierarchy_level),
            hierarchy_level,
            exists,
            readable,
            last_modified,
        }
    }

    /// Check the descriptor invariants.
    pub fn validate(&self) -> Result<()> {
        let subject = format!("config source '{}'", self.path.display());
        if !self.path.is_absolute() {
            return Err(GateError::validation(subject, "path must be absolute"));
        }
        if self.exists != self.last_modified.is_some() {
            return Err(GateError::validation(
                subject,
                "last-modified must be present exactly when the source exists",
            ));
        }
        if !self.exists && self.readable {
            return Err(GateError::validation(subject, "a missing source cannot be readable"));
        }
        if self.source_type != SourceType::for_level(self.hierarchy_level) {
            return Err(GateError::validation(
                subject,
                "only hierarchy level 0 is local",
            ));
        }
        Ok(())
    }
}
