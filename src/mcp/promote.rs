//! Promoting project servers (`.mcp.json`) into the user file (`~/.claude.json`).

use super::ConfigStore;
use super::blocking::strip_blocking_metadata;
use crate::core::{GateError, Result};
use crate::models::{ConflictResolution, MigrationPlan};
use serde::Serialize;
use std::path::Path;

/// What [`MigrationPlan::apply`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionReport {
    /// `(project name, user name)` for every moved server
    pub promoted: Vec<(String, String)>,
    /// Servers left in the project file because of a `skip` resolution
    pub skipped: Vec<String>,
}

impl MigrationPlan {
    /// Move the selected servers from the project file into the user file.
    ///
    /// A name already present in the user file needs a resolution: `skip`
    /// leaves both files alone for that server, `overwrite` replaces the user
    /// entry, `rename` stores it under a new name. Promoted servers are then
    /// removed from the project file. If the project write fails the user file
    /// is put back.
    ///
    /// # Errors
    ///
    /// - [`GateError::InvalidMigration`] if the plan is invalid or a conflict
    ///   has no resolution
    /// - [`GateError::NotFound`] if a selected server is missing from the project file
    /// - [`GateError::WriteFailure`] if a write fails
    pub fn apply(
        &self,
        project_store: &ConfigStore,
        user_store: &ConfigStore,
        project_dir: &Path,
        home: &Path,
    ) -> Result<PromotionReport> {
        self.validate()?;

        let mut project = project_store.read(project_dir)?;
        let user_before = user_store.read(home)?;
        let mut user = user_before.clone();
        let mut report = PromotionReport::default();

        for server in &self.servers {
            let entry = project.get(&server.name).ok_or_else(|| GateError::NotFound {
                kind: "server",
                name: server.name.clone(),
            })?;
            let definition = strip_blocking_metadata(entry)?;

            let target = match self.resolution_for(&server.name) {
                Some(ConflictResolution::Rename { new_name }) => new_name.clone(),
                _ => server.name.clone(),
            };
            if user.contains(&target) {
                match self.resolution_for(&server.name) {
                    Some(ConflictResolution::Skip) => {
                        tracing::info!("Skipping '{}': already defined for the user", server.name);
                        report.skipped.push(server.name.clone());
                        continue;
                    }
                    Some(ConflictResolution::Overwrite) => {
                        tracing::debug!("Overwriting user server '{target}'");
                    }
                    Some(ConflictResolution::Rename { .. }) => {
                        return Err(GateError::invalid_migration(format!(
                            "rename target '{target}' already exists in {}",
                            user_store.config_path(home).display()
                        )));
                    }
                    None => {
                        return Err(GateError::invalid_migration(format!(
                            "server '{}' already exists in {}; choose skip, overwrite or rename",
                            server.name,
                            user_store.config_path(home).display()
                        )));
                    }
                }
            }

            user.insert(target.clone(), definition);
            project.remove(&server.name);
            report.promoted.push((server.name.clone(), target));
        }

        if report.promoted.is_empty() {
            return Ok(report);
        }

        user_store.write(home, &user)?;
        if let Err(e) = project_store.write(project_dir, &project) {
            if let Err(restore_err) = user_store.write(home, &user_before) {
                tracing::warn!("Could not restore user config after failed promotion: {restore_err}");
            }
            return Err(e);
        }

        for (from, to) in &report.promoted {
            tracing::info!("Promoted '{from}' to user scope as '{to}'");
        }
        Ok(report)
    }
}
