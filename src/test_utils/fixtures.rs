//! A throwaway project directory and home directory laid out like real scopes.

use crate::constants::{
    LOCAL_CONFIG_FILE, MEMORY_DIR, NAMESPACE_DIR, PROJECT_CONFIG_FILE, USER_CONFIG_FILE,
};
use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary project and home directories, removed on drop.
#[derive(Debug)]
pub struct TestScopes {
    project: TempDir,
    home: TempDir,
}

impl TestScopes {
    /// Create empty project and home directories.
    pub fn new() -> Result<Self> {
        Ok(Self {
            project: TempDir::new().context("Failed to create project dir")?,
            home: TempDir::new().context("Failed to create home dir")?,
        })
    }

    /// Project directory (`P`).
    #[must_use]
    pub fn project(&self) -> &Path {
        self.project.path()
    }

    /// Home directory (`H`).
    #[must_use]
    pub fn home(&self) -> &Path {
        self.home.path()
    }

    /// `P/.claude/settings.local.json`
    #[must_use]
    pub fn local_config(&self) -> PathBuf {
        self.project().join(NAMESPACE_DIR).join(LOCAL_CONFIG_FILE)
    }

    /// `P/.mcp.json`
    #[must_use]
    pub fn project_config(&self) -> PathBuf {
        self.project().join(PROJECT_CONFIG_FILE)
    }

    /// `H/.claude.json`
    #[must_use]
    pub fn user_config(&self) -> PathBuf {
        self.home().join(USER_CONFIG_FILE)
    }

    /// `P/.claude/memory`
    #[must_use]
    pub fn local_memory(&self) -> PathBuf {
        self.project().join(NAMESPACE_DIR).join(MEMORY_DIR)
    }

    /// `H/.claude/memory`
    #[must_use]
    pub fn user_memory(&self) -> PathBuf {
        self.home().join(NAMESPACE_DIR).join(MEMORY_DIR)
    }

    /// Write the local config file.
    pub fn write_local(&self, value: &Value) -> Result<()> {
        write_json(&self.local_config(), value)
    }

    /// Write the project config file.
    pub fn write_project(&self, value: &Value) -> Result<()> {
        write_json(&self.project_config(), value)
    }

    /// Write the user config file.
    pub fn write_user(&self, value: &Value) -> Result<()> {
        write_json(&self.user_config(), value)
    }

    /// Parse the local config file.
    pub fn read_local(&self) -> Result<Value> {
        read_json(&self.local_config())
    }

    /// Create a memory file under `root`, returning its path.
    pub fn write_memory(&self, root: &Path, relative: &str, content: &str) -> Result<PathBuf> {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}

/// Write `value` as pretty JSON, creating parent directories.
pub fn write_json(path: &Path, value: &Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let text = serde_json::to_string_pretty(value)?;
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}

/// Read and parse a JSON file.
pub fn read_json(path: &Path) -> Result<Value> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}
