//! List the effective MCP servers and memory files of a project.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use super::common::CommandContext;
use crate::config::OutputFormat;
use crate::models::{McpServer, MemoryFile};
use crate::scopes::MergedView;
use crate::tokens::format_token_count;

/// Show every server and memory file after merging all scopes.
///
/// ```bash
/// mcp-gate list
/// mcp-gate list --format json
/// mcp-gate list --blocked
/// ```
#[derive(Args, Debug)]
pub struct ListCommand {
    /// Output format; defaults to the `output` setting
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Only show blocked servers and memory files
    #[arg(long)]
    blocked: bool,

    /// Hide memory files
    #[arg(long)]
    no_memory: bool,
}

impl ListCommand {
    /// Execute the list command.
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let mut view = ctx.load_view().await;
        if self.blocked {
            view.servers.retain(|s| s.blocked);
            view.memory_files.retain(|m| m.blocked);
        }
        if self.no_memory {
            view.memory_files.clear();
        }

        match self.format.unwrap_or(ctx.settings.output) {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&view)
                    .context("Failed to serialize listing")?;
                println!("{json}");
            }
            OutputFormat::Table => print_table(&view, ctx.settings.show_tokens),
        }
        Ok(())
    }
}

fn print_table(view: &MergedView, show_tokens: bool) {
    println!("{}", "MCP servers".bold());
    println!();
    if view.servers.is_empty() {
        println!("No MCP servers found.");
    } else {
        println!(
            "{:<32} {:<9} {:<10} {:>8}  {}",
            "Name".cyan().bold(),
            "Scope".cyan().bold(),
            "State".cyan().bold(),
            "Tokens".cyan().bold(),
            "Source".cyan().bold()
        );
        println!("{}", "-".repeat(92).bright_black());
        for server in &view.servers {
            print_server(server, show_tokens);
        }
    }

    if !view.memory_files.is_empty() {
        println!();
        println!("{}", "Memory files".bold());
        println!();
        for file in &view.memory_files {
            print_memory_file(file);
        }
    }
}

fn scope_label(level: u32) -> &'static str {
    match level {
        0 => "local",
        1 => "project",
        _ => "user",
    }
}

fn print_server(server: &McpServer, show_tokens: bool) {
    let state = if server.blocked { "blocked".red() } else { "active".green() };
    let tokens = match server.estimated_tokens {
        Some(count) if show_tokens => format_token_count(count),
        _ => "-".to_string(),
    };
    println!(
        "{:<32} {:<9} {:<10} {:>8}  {}",
        server.name,
        scope_label(server.provenance.hierarchy_level),
        state,
        tokens,
        server.provenance.source_path.display().to_string().bright_black()
    );
}

fn print_memory_file(file: &MemoryFile) {
    let state = if file.blocked { "blocked".red() } else { "active".green() };
    let link = match &file.symlink_target {
        Some(target) => format!(" -> {}", target.display()),
        None => String::new(),
    };
    println!(
        "  {:<40} {:<9} {:<10} {}{}",
        file.relative_path.display(),
        scope_label(file.provenance.hierarchy_level),
        state,
        file.path.display().to_string().bright_black(),
        link.bright_black()
    );
}
