//! User settings for the `mcp-gate` command.
//!
//! Settings live in an optional TOML file. The location is resolved in order:
//!
//! 1. An explicit path (`--config`)
//! 2. The `MCP_GATE_CONFIG` environment variable
//! 3. `~/.mcp-gate/config.toml`
//!
//! A missing file yields defaults; a file that does not parse is an error.
//!
//! ```toml
//! # ~/.mcp-gate/config.toml
//! home = "~/alt-home"   # root of the user scope
//! output = "json"       # table | json
//! show_tokens = false
//! ```
//!
//! The library core never reads these settings. The CLI resolves them and
//! passes concrete paths down.

use crate::constants::CONFIG_ENV_VAR;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Output style for listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned, colored text
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}

/// Settings file contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Root of the user scope, `~` and `$VARS` expanded; defaults to the home directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home: Option<String>,

    /// Default listing format
    pub output: OutputFormat,

    /// Whether listings include token estimates
    pub show_tokens: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            home: None,
            output: OutputFormat::Table,
            show_tokens: true,
        }
    }
}

impl GateConfig {
    /// Load settings from `path`, or from the resolved default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => match Self::resolve_path() {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };
        if path.exists() {
            Self::load_from(&path).await
        } else {
            tracing::debug!("No settings file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load settings from a specific file.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))
    }

    /// Settings path from `MCP_GATE_CONFIG`, falling back to [`Self::default_path`].
    #[must_use]
    pub fn resolve_path() -> Option<PathBuf> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
            _ => Self::default_path(),
        }
    }

    /// `~/.mcp-gate/config.toml`, if a home directory can be determined.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".mcp-gate").join("config.toml"))
    }

    /// The user-scope root: `explicit`, else the `home` setting, else the home directory.
    ///
    /// # Errors
    ///
    /// Returns an error if `home` references an undefined variable, or no home
    /// directory can be determined.
    pub fn resolve_home(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        if let Some(raw) = &self.home {
            let expanded = shellexpand::full(raw)
                .with_context(|| format!("Failed to expand home setting '{raw}'"))?;
            return Ok(PathBuf::from(expanded.as_ref()));
        }
        dirs::home_dir().context("Unable to determine home directory")
    }
}
