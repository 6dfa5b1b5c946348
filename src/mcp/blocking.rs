//! Turning block/unblock intents into config file mutations.
//!
//! A server's state has two axes:
//!
//! | origin \ state | unblocked                        | blocked                              |
//! |----------------|----------------------------------|--------------------------------------|
//! | local          | plain entry in the local file    | entry removed from the local file    |
//! | inherited      | no entry in the local file       | override entry in the local file     |
//!
//! Blocking a local server discards its definition. Unblocking it only tells
//! the caller to re-add it by hand. When the local definition hides one from
//! a more global scope, the local entry is swapped for an override of that
//! inherited definition so it stays suppressed as well.

use super::{ConfigFile, ConfigStore};
use crate::constants::SENTINEL_COMMAND;
use crate::core::{GateError, Result};
use crate::models::{
    BlockedServerConfig, McpServer, ServerConfig, ServerEntry, SourceType, validate_server_name,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::path::Path;

/// Result of an unblock request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnblockOutcome {
    /// The server must be re-authored by the user; nothing was written
    pub requires_manual_add: bool,
    /// Human-readable description of what happened
    pub message: String,
}

/// Informational argument placed in an override's `args`.
#[must_use]
pub fn blocked_notice(name: &str) -> String {
    format!("[mcp-gate] server '{name}' is blocked")
}

/// Build the override entry that suppresses `original` under `name`.
///
/// The override runs the inert sentinel command and keeps a copy of the
/// original definition for later restoration.
#[must_use]
pub fn create_override(name: &str, original: &ServerConfig) -> BlockedServerConfig {
    BlockedServerConfig {
        command: SENTINEL_COMMAND.to_string(),
        args: vec![blocked_notice(name)],
        blocked: true,
        blocked_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        original: Some(original.clone()),
    }
}

/// `true` iff the entry carries `_blocked: true`.
#[must_use]
pub const fn is_blocked(entry: &ServerEntry) -> bool {
    entry.is_blocked()
}

/// The definition saved inside an override.
///
/// # Errors
///
/// [`GateError::NotBlocked`] if `entry` is not an override or has no `_original`.
pub fn extract_original(name: &str, entry: &ServerEntry) -> Result<ServerConfig> {
    match entry {
        ServerEntry::Blocked(BlockedServerConfig {
            original: Some(original),
            ..
        }) => Ok(original.clone()),
        _ => Err(GateError::NotBlocked {
            name: name.to_string(),
        }),
    }
}

/// The effective definition of an entry with blocking metadata removed.
///
/// Plain entries are returned unchanged; overrides yield their `_original`.
///
/// # Errors
///
/// [`GateError::ValidationFailure`] for an override without `_original`.
pub fn strip_blocking_metadata(entry: &ServerEntry) -> Result<ServerConfig> {
    match entry {
        ServerEntry::Plain(config) => Ok(config.clone()),
        ServerEntry::Blocked(blocked) => blocked.original.clone().ok_or_else(|| {
            GateError::validation("blocked server config", "_original is missing")
        }),
    }
}

/// Applies block/unblock requests to the config file of one scope directory.
#[derive(Debug, Clone, Default)]
pub struct BlockingService {
    store: ConfigStore,
}

impl BlockingService {
    /// Service writing through `store`.
    #[must_use]
    pub const fn new(store: ConfigStore) -> Self {
        Self {
            store,
        }
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Block `server`, choosing the local or inherited rule from its provenance.
    pub fn block(&self, dir: &Path, server: &McpServer) -> Result<()> {
        match (server.source_type(), &server.shadowed) {
            (SourceType::Local, Some(inherited)) => self.block_shadowing(dir, &server.name, inherited),
            (SourceType::Local, None) => self.block_local(dir, &server.name),
            (SourceType::Inherited, _) => self.block_inherited(dir, server),
        }
    }

    /// Unblock `server`, choosing the local or inherited rule from its provenance.
    pub fn unblock(&self, dir: &Path, server: &McpServer) -> Result<UnblockOutcome> {
        match server.source_type() {
            SourceType::Local => Ok(self.unblock_local(dir, &server.name)),
            SourceType::Inherited => {
                self.unblock_inherited(dir, &server.name)?;
                Ok(UnblockOutcome {
                    requires_manual_add: false,
                    message: format!(
                        "Server '{}' is enabled again from {}",
                        server.name,
                        server.provenance.source_path.display()
                    ),
                })
            }
        }
    }

    /// Remove the local definition of `name`.
    ///
    /// The definition is not kept anywhere.
    ///
    /// # Errors
    ///
    /// [`GateError::NotFound`] if the local file has no entry named `name`.
    pub fn block_local(&self, dir: &Path, name: &str) -> Result<()> {
        self.store.update(dir, |config: &mut ConfigFile| {
            config.remove(name).map(|_| ()).ok_or_else(|| GateError::NotFound {
                kind: "server",
                name: name.to_string(),
            })
        })?;
        tracing::info!("Blocked local server '{name}' (definition removed)");
        Ok(())
    }

    /// Replace the local definition of `name` with an override of `inherited`.
    ///
    /// Removing the local entry alone would let `inherited` take effect again.
    ///
    /// # Errors
    ///
    /// [`GateError::NotFound`] if the local file has no plain entry named `name`.
    pub fn block_shadowing(&self, dir: &Path, name: &str, inherited: &McpServer) -> Result<()> {
        validate_server_name(name)?;
        let original = inherited.to_config();
        original.validate()?;

        let blocked = create_override(name, &original);
        self.store.update(dir, |config: &mut ConfigFile| {
            if !config.get(name).is_some_and(|entry| !entry.is_blocked()) {
                return Err(GateError::NotFound {
                    kind: "server",
                    name: name.to_string(),
                });
            }
            config.insert(name.to_string(), blocked);
            Ok(())
        })?;
        tracing::info!(
            "Blocked local server '{name}' (definition removed) and its definition from {}",
            inherited.provenance.source_path.display()
        );
        Ok(())
    }

    /// Write an override for the inherited `server` into the local file.
    ///
    /// An existing local entry with the same name is replaced.
    pub fn block_inherited(&self, dir: &Path, server: &McpServer) -> Result<()> {
        validate_server_name(&server.name)?;
        let original = server.to_config();
        original.validate()?;

        let blocked = create_override(&server.name, &original);
        self.store.update(dir, |config| {
            config.insert(server.name.clone(), blocked);
            Ok(())
        })?;
        tracing::info!(
            "Blocked inherited server '{}' from {}",
            server.name,
            server.provenance.source_path.display()
        );
        Ok(())
    }

    /// Report that a locally blocked server must be re-added by hand.
    ///
    /// Never touches the filesystem.
    #[must_use]
    pub fn unblock_local(&self, dir: &Path, name: &str) -> UnblockOutcome {
        UnblockOutcome {
            requires_manual_add: true,
            message: format!(
                "Server '{name}' was removed from {} when it was blocked; add its definition back manually",
                self.store.config_path(dir).display()
            ),
        }
    }

    /// Remove the override for `name` so the inherited definition applies again.
    ///
    /// # Errors
    ///
    /// [`GateError::NotFound`] if the local file has no override named `name`.
    pub fn unblock_inherited(&self, dir: &Path, name: &str) -> Result<()> {
        self.store.update(dir, |config| {
            if !config.get(name).is_some_and(ServerEntry::is_blocked) {
                return Err(GateError::NotFound {
                    kind: "override",
                    name: name.to_string(),
                });
            }
            config.remove(name);
            Ok(())
        })?;
        tracing::info!("Unblocked inherited server '{name}'");
        Ok(())
    }
}
