//! mcp-gate - block and unblock MCP servers and memory files across config scopes
//!
//! A project sees MCP server definitions from three JSON files and memory
//! (markdown note) files from two directories. `mcp-gate` merges them into one
//! view and lets the user suppress individual servers or memory files without
//! editing shared configuration.
//!
//! # Scopes
//!
//! | level | scope   | config file                     | memory root        |
//! |-------|---------|---------------------------------|--------------------|
//! | 0     | local   | `P/.claude/settings.local.json` | `P/.claude/memory` |
//! | 1     | project | `P/.mcp.json`                   |                    |
//! | 2     | user    | `H/.claude.json`                | `H/.claude/memory` |
//!
//! # Blocking
//!
//! - A server defined in the local file is blocked by deleting it.
//! - A server inherited from the project or user file is blocked by writing an
//!   override into the local file. The override runs an inert command and keeps
//!   the original definition under `_original`.
//! - A memory file is blocked by renaming `name.md` to `name.md.blocked`.
//!
//! Every config write goes through an atomic replace with a backup, so a failed
//! write leaves the previous file in place.
//!
//! # Modules
//!
//! - [`mcp`] - Config store, blocking rules, legacy migration, and promotion
//! - [`memory`] - Memory file discovery and blocking renames
//! - [`scopes`] - Scope resolution and the merged view
//! - [`models`] - Server, provenance, view, and migration-plan types
//! - [`config`] - User settings for the command-line tool
//! - [`core`] - Error types
//! - [`utils`] - JSON parsing and atomic file replacement
//! - [`tokens`] - Token estimates for display
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod mcp;
pub mod memory;
pub mod models;
pub mod scopes;
pub mod tokens;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
