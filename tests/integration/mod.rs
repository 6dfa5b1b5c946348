//! Integration test suite for mcp-gate
//!
//! End-to-end tests over real temporary project and home directories.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **blocking**: block/unblock round trips across scopes
//! - **migration**: legacy marker conversion and promotion
//! - **scopes**: merged view resolution and leniency
//! - **cli**: the `mcp-gate` binary

#[path = "../common/mod.rs"]
mod common;

mod blocking;
mod cli;
mod migration;
mod scopes;
