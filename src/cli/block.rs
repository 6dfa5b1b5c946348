//! Block and unblock MCP servers.

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;

use super::common::CommandContext;
use crate::core::GateError;

/// Block a server so the client no longer starts it.
///
/// A server defined in the local file is removed from it. A server inherited
/// from the project or user file gets an override in the local file.
#[derive(Args, Debug)]
pub struct BlockCommand {
    /// Server name
    name: String,
}

impl BlockCommand {
    /// Execute the block command.
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let Some(server) = ctx.find_server(&self.name).await else {
            return Err(GateError::NotFound {
                kind: "server",
                name: self.name,
            }
            .into());
        };
        if server.blocked {
            println!("Server '{}' is already blocked", server.name);
            return Ok(());
        }

        let service = ctx.blocking();
        let dir = ctx.project_dir.clone();
        let name = server.name.clone();
        tokio::task::spawn_blocking(move || service.block(&dir, &server)).await??;

        println!("{} server '{}'", "Blocked".green(), name);
        Ok(())
    }
}

/// Undo a block.
///
/// An inherited server is restored by removing its override. A local server
/// was deleted when blocked and has to be added back by hand.
#[derive(Args, Debug)]
pub struct UnblockCommand {
    /// Server name
    name: String,
}

impl UnblockCommand {
    /// Execute the unblock command.
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let service = ctx.blocking();
        let dir = ctx.project_dir.clone();

        let outcome = match ctx.find_server(&self.name).await {
            Some(server) => {
                if !server.blocked {
                    bail!("Server '{}' is not blocked", server.name);
                }
                tokio::task::spawn_blocking(move || service.unblock(&dir, &server)).await??
            }
            // A blocked local server is gone from every file, and an orphan
            // override is hidden from the view; try the override path anyway
            None => {
                let name = self.name.clone();
                match tokio::task::spawn_blocking(move || service.unblock_inherited(&dir, &name))
                    .await?
                {
                    Ok(()) => {
                        println!("{} server '{}'", "Unblocked".green(), self.name);
                        return Ok(());
                    }
                    Err(e) if e.is_not_found() => ctx.blocking().unblock_local(&ctx.project_dir, &self.name),
                    Err(e) => return Err(e.into()),
                }
            }
        };

        if outcome.requires_manual_add {
            println!("{} {}", "note:".yellow(), outcome.message);
        } else {
            println!("{} {}", "Unblocked:".green(), outcome.message);
        }
        Ok(())
    }
}
