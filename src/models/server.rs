//! Server definition records as they appear inside a config file.
//!
//! An entry in a server map is either a plain [`ServerConfig`] or a
//! [`BlockedServerConfig`] override. The `_blocked: true` marker is the only
//! discriminator between the two; the sentinel command is never consulted.

use crate::constants::MAX_SERVER_NAME_LEN;
use crate::core::{GateError, Result};
use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// JSON key carrying the blocked marker.
pub const BLOCKED_KEY: &str = "_blocked";

const SERVER_NAME_PATTERN: &str = r"^[A-Za-z0-9_-]+$";

/// One MCP server definition.
///
/// Fields this crate does not interpret (`type`, `cwd`, ...) are kept in
/// `extra` so a read/write cycle never drops user data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Executable launched for the server
    pub command: String,

    /// Ordered arguments passed to `command`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,

    /// Environment variables set for the server process
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<BTreeMap<String, String>>,

    /// Unrecognized fields, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Override entry that suppresses an inherited server.
///
/// Serialized shape:
/// `{ "command": "echo", "args": [notice], "_blocked": true, "_blockedAt": ISO-8601, "_original": {...} }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockedServerConfig {
    /// Inert sentinel command
    pub command: String,

    /// Informational notice arguments
    #[serde(default)]
    pub args: Vec<String>,

    /// Always `true` for this variant
    #[serde(rename = "_blocked")]
    pub blocked: bool,

    /// When the override was created (RFC 3339)
    #[serde(rename = "_blockedAt")]
    pub blocked_at: String,

    /// Definition that was active before blocking
    #[serde(rename = "_original", default, skip_serializing_if = "Option::is_none")]
    pub original: Option<ServerConfig>,
}

/// A server map entry: plain definition or blocked override.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ServerEntry {
    /// Blocked override (`_blocked: true`)
    Blocked(BlockedServerConfig),
    /// Regular definition
    Plain(ServerConfig),
}

impl<'de> Deserialize<'de> for ServerEntry {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        if is_blocked_value(&value) {
            serde_json::from_value(value).map(Self::Blocked).map_err(D::Error::custom)
        } else {
            serde_json::from_value(value).map(Self::Plain).map_err(D::Error::custom)
        }
    }
}

/// Raw-JSON form of the blocked discriminator.
///
/// `true` iff `value` is an object whose `_blocked` member is the boolean `true`.
#[must_use]
pub fn is_blocked_value(value: &Value) -> bool {
    value.get(BLOCKED_KEY).and_then(Value::as_bool) == Some(true)
}

impl ServerConfig {
    /// Create a definition with a command and arguments.
    pub fn new<I, S>(command: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        Self {
            command: command.into(),
            args: if args.is_empty() { None } else { Some(args) },
            env: None,
            extra: Map::new(),
        }
    }

    /// Check the model invariants: `command` must be non-empty after trimming.
    pub fn validate(&self) -> Result<()> {
        if self.command.trim().is_empty() {
            return Err(GateError::validation("server config", "command must not be empty"));
        }
        if let Some(env) = &self.env
            && env.keys().any(|k| k.trim().is_empty())
        {
            return Err(GateError::validation("server config", "env keys must not be empty"));
        }
        Ok(())
    }

    /// Arguments as a slice, empty when absent.
    #[must_use]
    pub fn args(&self) -> &[String] {
        self.args.as_deref().unwrap_or_default()
    }
}

impl BlockedServerConfig {
    /// Check the model invariants of an override entry.
    pub fn validate(&self) -> Result<()> {
        if !self.blocked {
            return Err(GateError::validation("blocked server config", "_blocked must be true"));
        }
        if self.command.trim().is_empty() {
            return Err(GateError::validation("blocked server config", "command must not be empty"));
        }
        chrono::DateTime::parse_from_rfc3339(&self.blocked_at).map_err(|e| {
            GateError::validation(
                "blocked server config",
                format!("_blockedAt '{}' is not an ISO-8601 instant: {e}", self.blocked_at),
            )
        })?;
        match &self.original {
            Some(original) => original.validate(),
            None => Err(GateError::validation("blocked server config", "_original is missing")),
        }
    }
}

impl ServerEntry {
    /// `true` iff this entry carries `_blocked: true`.
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked(_))
    }

    /// Validate whichever variant this entry holds.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Blocked(blocked) => blocked.validate(),
            Self::Plain(plain) => plain.validate(),
        }
    }
}

impl From<ServerConfig> for ServerEntry {
    fn from(config: ServerConfig) -> Self {
        Self::Plain(config)
    }
}

impl From<BlockedServerConfig> for ServerEntry {
    fn from(config: BlockedServerConfig) -> Self {
        Self::Blocked(config)
    }
}

fn name_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(SERVER_NAME_PATTERN).ok()).as_ref()
}

/// Validate a server map key: `[A-Za-z0-9_-]+`, at most 64 characters.
pub fn validate_server_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > MAX_SERVER_NAME_LEN {
        return Err(GateError::validation(
            format!("server name '{name}'"),
            format!("length must be between 1 and {MAX_SERVER_NAME_LEN}"),
        ));
    }
    if !name_pattern().is_some_and(|re| re.is_match(name)) {
        return Err(GateError::validation(
            format!("server name '{name}'"),
            "only letters, digits, '_' and '-' are allowed",
        ));
    }
    Ok(())
}
