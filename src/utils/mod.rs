//! Shared utilities
//!
//! # Modules
//!
//! - [`fs`] - Atomic file replacement, directory scaffolding, and safe JSON handling

pub mod fs;

pub use fs::{atomic_replace, ensure_dir, read_json_file};
