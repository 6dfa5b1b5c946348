//! Command-line interface for `mcp-gate`.
//!
//! Each command lives in its own module with its own argument struct and an
//! `execute` method taking the shared [`CommandContext`].
//!
//! # Commands
//!
//! - `list` - Show the effective servers and memory files
//! - `block` / `unblock` - Block or restore an MCP server
//! - `block-memory` / `unblock-memory` - Block or restore a memory file
//! - `promote` - Move project servers into the user file
//! - `migrate-legacy` - Convert a `.claude/blocked.json` marker
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug logging
//! - `--quiet` - Disable logging
//! - `--config` - Path to the settings file
//! - `--project` - Project directory (defaults to the current directory)
//! - `--home` - Root of the user scope (defaults to the home directory)
//!
//! ```bash
//! mcp-gate list
//! mcp-gate block github
//! mcp-gate --project ../other unblock github
//! ```

mod block;
pub mod common;
mod list;
mod memory;
mod migrate;
mod promote;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::GateConfig;
pub use common::CommandContext;

/// Manage which MCP servers and memory files a project loads.
#[derive(Parser, Debug)]
#[command(
    name = "mcp-gate",
    about = "Block and unblock MCP servers and memory files across config scopes",
    version,
    long_about = "mcp-gate merges the local, project and user configuration of a project and \
                  lets you block servers or memory files without losing their definitions."
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging on stderr.
    ///
    /// Equivalent to `RUST_LOG=debug`.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Disable logging; errors are still reported.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the settings file.
    ///
    /// Overrides `MCP_GATE_CONFIG` and `~/.mcp-gate/config.toml`.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Project directory.
    #[arg(long, global = true)]
    project: Option<PathBuf>,

    /// Root of the user scope.
    ///
    /// Overrides the `home` setting.
    #[arg(long, global = true)]
    home: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List servers and memory files from every scope
    List(list::ListCommand),

    /// Block an MCP server
    Block(block::BlockCommand),

    /// Unblock an MCP server
    Unblock(block::UnblockCommand),

    /// Block a memory file
    BlockMemory(memory::BlockMemoryCommand),

    /// Unblock a memory file
    UnblockMemory(memory::UnblockMemoryCommand),

    /// Move project servers into the user file
    Promote(promote::PromoteCommand),

    /// Convert a legacy `.claude/blocked.json` block list
    MigrateLegacy(migrate::MigrateLegacyCommand),
}

impl Cli {
    /// Log filter directive implied by the verbosity flags.
    ///
    /// `None` means the caller should honor `RUST_LOG`.
    #[must_use]
    pub fn log_filter(&self) -> Option<&'static str> {
        if self.verbose {
            Some("debug")
        } else if self.quiet {
            Some("off")
        } else {
            None
        }
    }

    /// Load settings, resolve directories, and run the selected command.
    ///
    /// A legacy block list is converted first, except when the command is
    /// `migrate-legacy` itself.
    pub async fn execute(self) -> Result<()> {
        let settings = GateConfig::load_with_optional(self.config).await?;
        let ctx = CommandContext::new(self.project, self.home, settings)?;

        if !matches!(self.command, Commands::MigrateLegacy(_)) {
            common::run_startup_migration(&ctx).await;
        }

        match self.command {
            Commands::List(cmd) => cmd.execute(&ctx).await,
            Commands::Block(cmd) => cmd.execute(&ctx).await,
            Commands::Unblock(cmd) => cmd.execute(&ctx).await,
            Commands::BlockMemory(cmd) => cmd.execute(&ctx).await,
            Commands::UnblockMemory(cmd) => cmd.execute(&ctx).await,
            Commands::Promote(cmd) => cmd.execute(&ctx).await,
            Commands::MigrateLegacy(cmd) => cmd.execute(&ctx).await,
        }
    }
}
