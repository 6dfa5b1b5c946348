use crate::mcp::{ConfigLayout, ConfigStore};
use crate::models::{McpServer, Provenance, ServerConfig};
use std::path::Path;

/// Layout with the file directly in the scope directory and servers under `servers`.
pub(crate) fn servers_layout() -> ConfigLayout {
    ConfigLayout::new(None, "config.json", "servers")
}

pub(crate) fn servers_store() -> ConfigStore {
    ConfigStore::new(servers_layout())
}

/// A server view as the scope loader would produce it.
pub(crate) fn server_at(name: &str, config: &ServerConfig, source: &Path, level: u32) -> McpServer {
    McpServer::from_config(name, config, Provenance::new(source, level))
}
