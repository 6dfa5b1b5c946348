//! Migration operations: promoting project-scoped servers to the user scope.

use crate::constants::{MAX_MIGRATION_SERVERS, MIN_MIGRATION_SERVERS, PROJECT_HIERARCHY_LEVEL};
use crate::core::{GateError, Result};
use crate::models::server::validate_server_name;
use crate::models::view::McpServer;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

/// How to handle a selected server whose name already exists in the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ConflictResolution {
    /// Leave the existing target entry and do not move this server
    Skip,
    /// Replace the existing target entry
    Overwrite,
    /// Move the server under a fresh name
    Rename {
        /// The replacement name
        new_name: String,
    },
}

impl FromStr for ConflictResolution {
    type Err = GateError;

    /// Parses `skip`, `overwrite`, or `rename:<new-name>`.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "skip" => Ok(Self::Skip),
            "overwrite" => Ok(Self::Overwrite),
            _ => match s.strip_prefix("rename:") {
                Some(new_name) => Ok(Self::Rename {
                    new_name: new_name.to_string(),
                }),
                None => Err(GateError::invalid_migration(format!(
                    "unknown conflict resolution '{s}' (expected skip, overwrite or rename:<name>)"
                ))),
            },
        }
    }
}

/// A name collision between a selected server and the target scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameConflict {
    /// Name of the selected server
    pub name: String,
    /// How to resolve it
    pub resolution: ConflictResolution,
}

/// A proposed batch of server moves.
#[derive(Debug, Clone, Default)]
pub struct MigrationPlan {
    /// Selected servers, in order
    pub servers: Vec<McpServer>,
    /// Conflicts with their resolutions
    pub conflicts: Vec<NameConflict>,
}

impl MigrationPlan {
    /// Create a plan for the given selection with no conflicts recorded.
    #[must_use]
    pub fn new(servers: Vec<McpServer>) -> Self {
        Self {
            servers,
            conflicts: Vec::new(),
        }
    }

    /// Attach a conflict resolution.
    #[must_use]
    pub fn with_conflict(mut self, name: impl Into<String>, resolution: ConflictResolution) -> Self {
        self.conflicts.push(NameConflict {
            name: name.into(),
            resolution,
        });
        self
    }

    /// Resolution recorded for `name`, if any.
    #[must_use]
    pub fn resolution_for(&self, name: &str) -> Option<&ConflictResolution> {
        self.conflicts.iter().find(|c| c.name == name).map(|c| &c.resolution)
    }

    /// Check every plan constraint.
    pub fn validate(&self) -> Result<()> {
        let count = self.servers.len();
        if !(MIN_MIGRATION_SERVERS..=MAX_MIGRATION_SERVERS).contains(&count) {
            return Err(GateError::invalid_migration(format!(
                "{count} servers selected; between {MIN_MIGRATION_SERVERS} and {MAX_MIGRATION_SERVERS} are allowed"
            )));
        }

        let mut selected = HashSet::new();
        for server in &self.servers {
            if server.provenance.hierarchy_level != PROJECT_HIERARCHY_LEVEL {
                return Err(GateError::invalid_migration(format!(
                    "server '{}' is at hierarchy level {}; only project-level servers can be migrated",
                    server.name, server.provenance.hierarchy_level
                )));
            }
            if !selected.insert(server.name.as_str()) {
                return Err(GateError::invalid_migration(format!(
                    "server '{}' is selected more than once",
                    server.name
                )));
            }
        }

        let mut seen_conflicts = HashSet::new();
        let mut new_names = HashSet::new();
        for conflict in &self.conflicts {
            if !selected.contains(conflict.name.as_str()) {
                return Err(GateError::invalid_migration(format!(
                    "conflict resolution for '{}' does not match a selected server",
                    conflict.name
                )));
            }
            if !seen_conflicts.insert(conflict.name.as_str()) {
                return Err(GateError::invalid_migration(format!(
                    "more than one resolution given for '{}'",
                    conflict.name
                )));
            }
            if let ConflictResolution::Rename { new_name } = &conflict.resolution {
                validate_server_name(new_name).map_err(|e| {
                    GateError::invalid_migration(format!("rename of '{}': {e}", conflict.name))
                })?;
                if new_name == &conflict.name
                    || selected.contains(new_name.as_str())
                    || !new_names.insert(new_name.as_str())
                {
                    return Err(GateError::invalid_migration(format!(
                        "rename of '{}' to '{new_name}' is not a fresh name",
                        conflict.name
                    )));
                }
            }
        }

        Ok(())
    }

    /// `true` when [`validate`](Self::validate) passes.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}
