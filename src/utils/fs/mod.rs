//! File system helpers used by the config engine
//!
//! - [`atomic`]: backup/temp/rename replacement behind the [`ConfigFs`] seam
//! - [`dirs`]: directory scaffolding with fixed permissions
//! - [`formats`]: JSON parse/stringify that reports failures as values

pub mod atomic;
pub mod dirs;
pub mod formats;

pub use atomic::{ConfigFs, OsFs, atomic_replace, backup_path, sibling_path, temp_path};
pub use dirs::ensure_dir;
pub use formats::{ParseResult, parse, parse_and_validate, read_json_file, stringify};
