//! Merged-view entities rebuilt on every scope-resolution pass.
//!
//! Neither type is persisted. Blocking a server changes config file entries;
//! blocking a memory file renames it on disk.

use crate::constants::{MEMORY_FILE_SUFFIX, PREVIEW_CHARS};
use crate::core::{GateError, Result};
use crate::models::server::{ServerConfig, validate_server_name};
use crate::models::source::{Provenance, SourceType};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// An MCP server as seen after merging every scope.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct McpServer {
    /// Server map key
    pub name: String,
    /// Launch command (the original one when blocked)
    pub command: String,
    /// Launch arguments
    pub args: Vec<String>,
    /// Environment variables
    pub env: BTreeMap<String, String>,
    /// Where the definition lives
    #[serde(flatten)]
    pub provenance: Provenance,
    /// Whether a local override currently suppresses it
    pub blocked: bool,
    /// When it was blocked; present exactly when `blocked`
    pub blocked_at: Option<DateTime<Utc>>,
    /// Rough context cost of the definition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_tokens: Option<usize>,
    /// Full definition, including fields this view does not model
    #[serde(skip)]
    pub definition: ServerConfig,
    /// Definition from a more global scope that this one hides
    #[serde(skip)]
    pub shadowed: Option<Box<McpServer>>,
}

impl McpServer {
    /// Build an unblocked view entity from a definition.
    pub fn from_config(name: impl Into<String>, config: &ServerConfig, provenance: Provenance) -> Self {
        Self {
            name: name.into(),
            command: config.command.clone(),
            args: config.args().to_vec(),
            env: config.env.clone().unwrap_or_default(),
            provenance,
            blocked: false,
            blocked_at: None,
            estimated_tokens: Some(crate::tokens::estimate_server_tokens(config)),
            definition: config.clone(),
            shadowed: None,
        }
    }

    /// The definition this view was built from, unknown fields included.
    #[must_use]
    pub fn to_config(&self) -> ServerConfig {
        self.definition.clone()
    }

    /// Shortcut for `provenance.source_type`.
    #[must_use]
    pub const fn source_type(&self) -> SourceType {
        self.provenance.source_type
    }

    /// Check the entity invariants.
    pub fn validate(&self) -> Result<()> {
        validate_server_name(&self.name)?;
        let subject = format!("server '{}'", self.name);
        if self.command.trim().is_empty() {
            return Err(GateError::validation(subject, "command must not be empty"));
        }
        if self.blocked != self.blocked_at.is_some() {
            return Err(GateError::validation(
                subject,
                "blocked timestamp must be present exactly when blocked",
            ));
        }
        self.provenance.validate(&subject)
    }
}

/// A discovered memory (markdown note) file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryFile {
    /// Logical file name, always ending in `.md`
    pub name: String,
    /// Absolute path on disk (including `.blocked` when blocked)
    pub path: PathBuf,
    /// Logical path relative to the memory root
    pub relative_path: PathBuf,
    /// Memory root and scope
    #[serde(flatten)]
    pub provenance: Provenance,
    /// Size on disk in bytes
    pub size_bytes: u64,
    /// First characters of the content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    /// Whether `path` is a symbolic link
    pub is_symlink: bool,
    /// Link target; present exactly when `is_symlink`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symlink_target: Option<PathBuf>,
    /// Whether the file carries the `.blocked` suffix
    pub blocked: bool,
    /// When the file was blocked; present exactly when `blocked`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked_at: Option<DateTime<Utc>>,
}

impl MemoryFile {
    /// Check the entity invariants.
    pub fn validate(&self) -> Result<()> {
        let subject = format!("memory file '{}'", self.path.display());
        if !self.name.ends_with(MEMORY_FILE_SUFFIX) || self.name.len() == MEMORY_FILE_SUFFIX.len() {
            return Err(GateError::validation(subject, "name must end in .md"));
        }
        if !self.path.is_absolute() {
            return Err(GateError::validation(subject, "path must be absolute"));
        }
        if self.is_symlink != self.symlink_target.is_some() {
            return Err(GateError::validation(
                subject,
                "symlink target must be present exactly when the file is a symlink",
            ));
        }
        if self.blocked != self.blocked_at.is_some() {
            return Err(GateError::validation(
                subject,
                "blocked timestamp must be present exactly when blocked",
            ));
        }
        if let Some(preview) = &self.preview
            && preview.chars().count() > PREVIEW_CHARS
        {
            return Err(GateError::validation(subject, "preview is longer than 200 characters"));
        }
        self.provenance.validate(&subject)
    }
}
