//! Test utilities for mcp-gate
//!
//! - [`init_test_logging`] installs a test-friendly tracing subscriber once
//! - [`FaultyFs`] injects a failure at one step of the atomic write protocol
//! - [`TestScopes`] lays out a throwaway project and home directory
//!
//! # Example
//!
//! ```rust,ignore
//! use mcp_gate::test_utils::TestScopes;
//! use serde_json::json;
//!
//! let scopes = TestScopes::new().unwrap();
//! scopes.write_project(&json!({"mcpServers": {"beta": {"command": "npx"}}})).unwrap();
//! ```

pub mod fixtures;

pub use fixtures::TestScopes;

use crate::utils::fs::{ConfigFs, OsFs};
use std::io;
use std::path::Path;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has any effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}

/// Step of the write protocol at which [`FaultyFs`] fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPoint {
    /// Reading the live file
    Read,
    /// Creating the backup copy (half the content is copied first)
    Copy,
    /// Writing the temp file (half the content is written first)
    Write,
    /// Renaming the temp file over the live file
    Rename,
    /// Normalizing permissions after the rename
    Permissions,
}

/// A [`ConfigFs`] that fails once at a chosen step and otherwise uses the real filesystem.
#[derive(Debug)]
pub struct FaultyFs {
    point: FaultPoint,
    tripped: AtomicBool,
}

impl FaultyFs {
    /// Fail the first call at `point`.
    #[must_use]
    pub const fn new(point: FaultPoint) -> Self {
        Self {
            point,
            tripped: AtomicBool::new(false),
        }
    }

    /// Whether the fault has fired.
    #[must_use]
    pub fn tripped(&self) -> bool {
        self.tripped.load(Ordering::SeqCst)
    }

    fn should_fail(&self, point: FaultPoint) -> bool {
        point == self.point && !self.tripped.swap(true, Ordering::SeqCst)
    }

    fn injected(point: FaultPoint) -> io::Error {
        io::Error::other(format!("injected failure at {point:?}"))
    }
}

impl ConfigFs for FaultyFs {
    fn exists(&self, path: &Path) -> bool {
        OsFs.exists(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        if self.should_fail(FaultPoint::Read) {
            return Err(Self::injected(FaultPoint::Read));
        }
        OsFs.read_to_string(path)
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
        if self.should_fail(FaultPoint::Copy) {
            let contents = std::fs::read(from)?;
            OsFs.write(to, &contents[..contents.len() / 2])?;
            return Err(Self::injected(FaultPoint::Copy));
        }
        OsFs.copy(from, to)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        if self.should_fail(FaultPoint::Write) {
            OsFs.write(path, &contents[..contents.len() / 2])?;
            return Err(Self::injected(FaultPoint::Write));
        }
        OsFs.write(path, contents)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        if self.should_fail(FaultPoint::Rename) {
            return Err(Self::injected(FaultPoint::Rename));
        }
        OsFs.rename(from, to)
    }

    fn normalize_permissions(&self, path: &Path) -> io::Result<()> {
        if self.should_fail(FaultPoint::Permissions) {
            return Err(Self::injected(FaultPoint::Permissions));
        }
        OsFs.normalize_permissions(path)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        OsFs.remove(path)
    }
}
