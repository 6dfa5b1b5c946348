//! Convert a legacy `.claude/blocked.json` marker into the current representation.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::common::CommandContext;
use crate::mcp::{ConfigLayout, ConfigStore, legacy};

/// Convert the legacy block list of the project.
///
/// Listed servers become overrides in the local file; listed memory files get
/// the `.blocked` suffix. The marker is deleted only after everything
/// succeeded. This also runs automatically before every other command.
///
/// ```bash
/// mcp-gate migrate-legacy
/// ```
#[derive(Args, Debug)]
pub struct MigrateLegacyCommand {}

impl MigrateLegacyCommand {
    /// Execute the migrate-legacy command.
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let marker = legacy::legacy_marker_path(&ctx.project_dir);
        if !marker.exists() {
            println!("{}", "No legacy block list found.".green());
            return Ok(());
        }

        let inherited = ctx.load_view().await.inherited_definitions();
        let project_dir = ctx.project_dir.clone();
        let report = tokio::task::spawn_blocking(move || {
            legacy::migrate_legacy_with(
                &ConfigStore::new(ConfigLayout::local()),
                &project_dir,
                &inherited,
            )
        })
        .await??;

        println!(
            "{} {}: {} servers, {} memory files",
            "Migrated".green(),
            marker.display(),
            report.servers_count,
            report.memory_count
        );
        Ok(())
    }
}
