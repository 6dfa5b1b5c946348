//! Common helpers for mcp-gate integration tests
//!
//! Wraps a [`TestScopes`] pair of directories and runs the binary against it
//! with `--project` and `--home`, isolated from any real settings file.

// Not every helper is used by every test file
#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use mcp_gate::test_utils::TestScopes;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Project and home directories plus a way to run the binary against them.
pub struct TestEnv {
    pub scopes: TestScopes,
}

impl TestEnv {
    /// Create empty project and home directories.
    pub fn new() -> Result<Self> {
        Ok(Self {
            scopes: TestScopes::new()?,
        })
    }

    /// Project directory.
    pub fn project(&self) -> &Path {
        self.scopes.project()
    }

    /// Home directory.
    pub fn home(&self) -> &Path {
        self.scopes.home()
    }

    /// A command for the binary with both scope roots set.
    ///
    /// The settings file points at a path that does not exist so defaults apply.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("mcp-gate").unwrap();
        cmd.arg("--project")
            .arg(self.project())
            .arg("--home")
            .arg(self.home())
            .env("MCP_GATE_CONFIG", self.home().join("no-settings.toml"))
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Write a markdown memory file below `root` and return its path.
    pub fn memory_file(&self, root: &Path, relative: &str, content: &str) -> Result<PathBuf> {
        self.scopes.write_memory(root, relative, content)
    }

    /// Path to the legacy marker.
    pub fn legacy_marker(&self) -> PathBuf {
        self.project().join(".claude").join("blocked.json")
    }

    /// Write the legacy marker.
    pub fn write_legacy_marker(&self, value: &Value) -> Result<()> {
        let path = self.legacy_marker();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_string_pretty(value)?)?;
        Ok(())
    }
}

/// File assertion helpers
pub struct FileAssert;

impl FileAssert {
    /// Assert a file exists
    pub fn exists(path: impl AsRef<Path>) {
        let path = path.as_ref();
        assert!(path.exists(), "Expected file to exist: {}", path.display());
    }

    /// Assert a file does not exist
    pub fn not_exists(path: impl AsRef<Path>) {
        let path = path.as_ref();
        assert!(!path.exists(), "Expected file to not exist: {}", path.display());
    }

    /// Assert a file is byte-for-byte equal to `expected`
    pub fn equals(path: impl AsRef<Path>, expected: &str) {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("Failed to read file {}: {}", path.display(), e));
        assert_eq!(content, expected, "File {} content mismatch", path.display());
    }
}
