//! MCP server configuration: the config file engine and the operations built on it.
//!
//! This module handles:
//! - Strict reads and crash-safe writes of one config file per scope ([`ConfigStore`])
//! - Blocking and unblocking servers through override entries ([`blocking`])
//! - One-time conversion of the legacy `blocked.json` marker ([`legacy`])
//! - Promoting project servers to the user scope ([`promote`])
//!
//! A config file is a JSON object whose server map lives under a key named by
//! its [`ConfigLayout`]. Every other top-level key is carried through a
//! read/write cycle untouched.

pub mod blocking;
pub mod legacy;
pub mod promote;
pub mod store;

#[cfg(test)]
mod tests;

pub use blocking::{BlockingService, UnblockOutcome};
pub use legacy::{LegacyMarker, MigrationReport, migrate_legacy};
pub use promote::PromotionReport;
pub use store::ConfigStore;

use crate::constants::{
    LOCAL_CONFIG_FILE, MCP_SERVERS_KEY, NAMESPACE_DIR, PROJECT_CONFIG_FILE, USER_CONFIG_FILE,
};
use crate::core::{GateError, Result};
use crate::models::ServerEntry;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Where a config file lives relative to its scope directory, and which key holds servers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLayout {
    /// Namespacing subdirectory (`.claude`), or `None` for a file directly in the scope directory
    pub namespace_dir: Option<String>,
    /// File name inside the namespace directory
    pub file_name: String,
    /// Top-level key holding the server map
    pub server_key: String,
}

impl ConfigLayout {
    /// Build a layout from its parts.
    pub fn new(
        namespace_dir: Option<&str>,
        file_name: impl Into<String>,
        server_key: impl Into<String>,
    ) -> Self {
        Self {
            namespace_dir: namespace_dir.map(str::to_string),
            file_name: file_name.into(),
            server_key: server_key.into(),
        }
    }

    /// `<dir>/.claude/settings.local.json` (level 0).
    #[must_use]
    pub fn local() -> Self {
        Self::new(Some(NAMESPACE_DIR), LOCAL_CONFIG_FILE, MCP_SERVERS_KEY)
    }

    /// `<dir>/.mcp.json` (level 1).
    #[must_use]
    pub fn project() -> Self {
        Self::new(None, PROJECT_CONFIG_FILE, MCP_SERVERS_KEY)
    }

    /// `<home>/.claude.json` (level 2).
    #[must_use]
    pub fn user() -> Self {
        Self::new(None, USER_CONFIG_FILE, MCP_SERVERS_KEY)
    }

    /// Directory that holds the config file for scope directory `dir`.
    #[must_use]
    pub fn config_dir(&self, dir: &Path) -> PathBuf {
        match &self.namespace_dir {
            Some(ns) => dir.join(ns),
            None => dir.to_path_buf(),
        }
    }

    /// Full path of the config file for scope directory `dir`.
    #[must_use]
    pub fn config_path(&self, dir: &Path) -> PathBuf {
        self.config_dir(dir).join(&self.file_name)
    }
}

impl Default for ConfigLayout {
    fn default() -> Self {
        Self::local()
    }
}

/// In-memory form of one config file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    /// Server map, keyed by server name
    pub servers: BTreeMap<String, ServerEntry>,
    /// All other top-level keys, preserved verbatim
    pub other: Map<String, Value>,
}

impl ConfigFile {
    /// Split a parsed document into the server map and the remaining keys.
    ///
    /// A missing server key yields an empty map.
    pub fn from_value(value: Value, server_key: &str, path: &Path) -> Result<Self> {
        let Value::Object(mut other) = value else {
            return Err(GateError::MalformedConfig {
                path: path.to_path_buf(),
                reason: "top-level value is not a JSON object".to_string(),
            });
        };

        let servers = match other.remove(server_key) {
            None | Some(Value::Null) => BTreeMap::new(),
            Some(Value::Object(map)) => {
                let mut servers = BTreeMap::new();
                for (name, entry) in map {
                    let entry: ServerEntry = serde_json::from_value(entry).map_err(|e| {
                        GateError::MalformedConfig {
                            path: path.to_path_buf(),
                            reason: format!("server '{name}': {e}"),
                        }
                    })?;
                    servers.insert(name, entry);
                }
                servers
            }
            Some(_) => {
                return Err(GateError::MalformedConfig {
                    path: path.to_path_buf(),
                    reason: format!("'{server_key}' is not a JSON object"),
                });
            }
        };

        Ok(Self {
            servers,
            other,
        })
    }

    /// Rebuild the document, placing the server map under `server_key`.
    pub fn to_value(&self, server_key: &str) -> Result<Value> {
        let mut doc = self.other.clone();
        let servers = serde_json::to_value(&self.servers).map_err(|e| {
            GateError::validation("server map", format!("cannot serialize: {e}"))
        })?;
        doc.insert(server_key.to_string(), servers);
        Ok(Value::Object(doc))
    }

    /// Entry for `name`, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ServerEntry> {
        self.servers.get(name)
    }

    /// Insert or replace an entry.
    pub fn insert(&mut self, name: impl Into<String>, entry: impl Into<ServerEntry>) {
        self.servers.insert(name.into(), entry.into());
    }

    /// Remove and return the entry for `name`.
    pub fn remove(&mut self, name: &str) -> Option<ServerEntry> {
        self.servers.remove(name)
    }

    /// Whether an entry named `name` exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.servers.contains_key(name)
    }
}
