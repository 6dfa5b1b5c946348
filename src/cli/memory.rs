//! Block and unblock memory files.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::common::CommandContext;
use crate::memory::{block_memory_file, unblock_memory_file};

/// Block a memory file by appending `.blocked` to its name.
#[derive(Args, Debug)]
pub struct BlockMemoryCommand {
    /// Path to the `.md` file, relative to the project directory or absolute
    path: PathBuf,
}

impl BlockMemoryCommand {
    /// Execute the block-memory command.
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let path = ctx.resolve_path(&self.path);
        let target = tokio::task::spawn_blocking(move || block_memory_file(&path)).await??;
        println!("{} {}", "Blocked".green(), target.display());
        Ok(())
    }
}

/// Unblock a memory file by removing its `.blocked` suffix.
#[derive(Args, Debug)]
pub struct UnblockMemoryCommand {
    /// Path to the `.md.blocked` file, relative to the project directory or absolute
    path: PathBuf,
}

impl UnblockMemoryCommand {
    /// Execute the unblock-memory command.
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let path = ctx.resolve_path(&self.path);
        let target = tokio::task::spawn_blocking(move || unblock_memory_file(&path)).await??;
        println!("{} {}", "Unblocked".green(), target.display());
        Ok(())
    }
}
