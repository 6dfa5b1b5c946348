//! Move project servers into the user file.

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;

use super::common::CommandContext;
use crate::constants::PROJECT_HIERARCHY_LEVEL;
use crate::core::GateError;
use crate::mcp::{ConfigLayout, ConfigStore};
use crate::models::{ConflictResolution, MigrationPlan};

/// Promote servers from the project's `.mcp.json` to the user's `.claude.json`.
///
/// ```bash
/// mcp-gate promote github filesystem
/// mcp-gate promote github --on-conflict overwrite
/// mcp-gate promote github --on-conflict rename:github-work
/// ```
#[derive(Args, Debug)]
pub struct PromoteCommand {
    /// Names of project servers to move
    #[arg(required = true)]
    names: Vec<String>,

    /// What to do when a name already exists in the user file:
    /// `skip`, `overwrite`, or `rename:<new-name>`
    #[arg(long, value_name = "RESOLUTION")]
    on_conflict: Option<String>,
}

impl PromoteCommand {
    /// Execute the promote command.
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let resolution = self
            .on_conflict
            .as_deref()
            .map(str::parse::<ConflictResolution>)
            .transpose()?;

        let view = ctx.load_view().await;
        let mut selected = Vec::with_capacity(self.names.len());
        for name in &self.names {
            let Some(server) = view.server(name) else {
                return Err(GateError::NotFound {
                    kind: "server",
                    name: name.clone(),
                }
                .into());
            };
            if server.provenance.hierarchy_level != PROJECT_HIERARCHY_LEVEL {
                bail!(
                    "Server '{name}' is defined in {}, not in the project file",
                    server.provenance.source_path.display()
                );
            }
            selected.push(server.clone());
        }

        let user_config = ConfigStore::new(ConfigLayout::user()).read(&ctx.home_dir)?;
        let mut plan = MigrationPlan::new(selected);
        if let Some(resolution) = resolution {
            for name in &self.names {
                if user_config.contains(name) {
                    plan = plan.with_conflict(name.clone(), resolution.clone());
                }
            }
        }

        let project_dir = ctx.project_dir.clone();
        let home_dir = ctx.home_dir.clone();
        let report = tokio::task::spawn_blocking(move || {
            plan.apply(
                &ConfigStore::new(ConfigLayout::project()),
                &ConfigStore::new(ConfigLayout::user()),
                &project_dir,
                &home_dir,
            )
        })
        .await??;

        for (from, to) in &report.promoted {
            if from == to {
                println!("{} '{from}' to the user file", "Promoted".green());
            } else {
                println!("{} '{from}' to the user file as '{to}'", "Promoted".green());
            }
        }
        for name in &report.skipped {
            println!("{} '{name}' (already in the user file)", "Skipped".yellow());
        }
        Ok(())
    }
}
