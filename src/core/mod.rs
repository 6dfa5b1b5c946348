//! Core types shared by every layer of mcp-gate.
//!
//! ## Error Management
//! - **Strongly-typed errors** ([`GateError`]) for precise error handling in code
//! - **User-friendly contexts** ([`ErrorContext`]) with actionable suggestions for CLI users
//! - [`user_friendly_error`] converts any `anyhow` error into the CLI presentation

pub mod error;

pub use error::{ErrorContext, GateError, Result, user_friendly_error};
