//! Common context shared by CLI commands

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::config::GateConfig;
use crate::mcp::{BlockingService, ConfigLayout, ConfigStore, legacy};
use crate::models::McpServer;
use crate::scopes::{MergedView, ScopeLoader};

/// Resolved directories and settings for one invocation.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Project directory (`P`)
    pub project_dir: PathBuf,
    /// Root of the user scope (`H`)
    pub home_dir: PathBuf,
    /// Loaded settings file
    pub settings: GateConfig,
}

impl CommandContext {
    /// Resolve directories from flags, settings, and the environment.
    ///
    /// The project directory defaults to the current directory.
    pub fn new(project: Option<PathBuf>, home: Option<PathBuf>, settings: GateConfig) -> Result<Self> {
        let project_dir = match project {
            Some(dir) => dir,
            None => std::env::current_dir().context("Failed to determine current directory")?,
        };
        let project_dir = project_dir
            .canonicalize()
            .with_context(|| format!("Project directory {} does not exist", project_dir.display()))?;
        let home_dir = settings.resolve_home(home.as_deref())?;

        tracing::debug!("Project: {}, home: {}", project_dir.display(), home_dir.display());
        Ok(Self {
            project_dir,
            home_dir,
            settings,
        })
    }

    /// Scope loader for this context.
    #[must_use]
    pub fn loader(&self) -> ScopeLoader {
        ScopeLoader::new(&self.project_dir, &self.home_dir)
    }

    /// Resolve and merge every scope.
    pub async fn load_view(&self) -> MergedView {
        self.loader().load().await
    }

    /// Blocking service writing the local file of the project.
    #[must_use]
    pub fn blocking(&self) -> BlockingService {
        BlockingService::new(ConfigStore::new(ConfigLayout::local()))
    }

    /// Look up a server in the merged view.
    pub async fn find_server(&self, name: &str) -> Option<McpServer> {
        self.load_view().await.server(name).cloned()
    }

    /// Resolve a user-supplied path against the project directory.
    #[must_use]
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() { path.to_path_buf() } else { self.project_dir.join(path) }
    }
}

/// Convert a legacy `blocked.json` marker, if present.
///
/// Runs before every command. Failures are reported but do not stop the
/// command; the marker is kept for the next run.
pub async fn run_startup_migration(ctx: &CommandContext) {
    if !legacy::legacy_marker_path(&ctx.project_dir).exists() {
        return;
    }

    let inherited = ctx.load_view().await.inherited_definitions();
    let project_dir = ctx.project_dir.clone();
    let result = tokio::task::spawn_blocking(move || {
        legacy::migrate_legacy_with(&ConfigStore::new(ConfigLayout::local()), &project_dir, &inherited)
    })
    .await;

    match result {
        Ok(Ok(report)) if report.migrated => {
            eprintln!(
                "{} legacy block list: {} servers, {} memory files",
                "Migrated".green(),
                report.servers_count,
                report.memory_count
            );
        }
        Ok(Ok(_)) => {}
        Ok(Err(e)) => {
            eprintln!("{} legacy block list could not be migrated: {e}", "warning:".yellow());
        }
        Err(e) => tracing::warn!("Legacy migration task failed: {e}"),
    }
}
