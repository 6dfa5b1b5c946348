//! Global constants used throughout the mcp-gate codebase.
//!
//! File names, marker suffixes, and numeric limits live here so that the
//! on-disk conventions are discoverable in one place.

/// Namespacing subdirectory that holds the local-scope config file.
pub const NAMESPACE_DIR: &str = ".claude";

/// Local-scope (hierarchy level 0) config file name inside [`NAMESPACE_DIR`].
pub const LOCAL_CONFIG_FILE: &str = "settings.local.json";

/// Project-scope (hierarchy level 1) config file, at the project root.
pub const PROJECT_CONFIG_FILE: &str = ".mcp.json";

/// User-scope (hierarchy level 2) config file, at the home directory root.
pub const USER_CONFIG_FILE: &str = ".claude.json";

/// Key holding the server map in Claude Code config files.
pub const MCP_SERVERS_KEY: &str = "mcpServers";

/// Memory directory name inside [`NAMESPACE_DIR`].
pub const MEMORY_DIR: &str = "memory";

/// Suffix appended to the live config filename for the pre-write backup.
pub const BACKUP_SUFFIX: &str = ".backup";

/// Suffix appended to the live config filename for the staged write.
pub const TEMP_SUFFIX: &str = ".tmp";

/// Reserved suffix every memory file name must end with.
pub const MEMORY_FILE_SUFFIX: &str = ".md";

/// Marker suffix appended to a memory file to block it.
pub const BLOCKED_SUFFIX: &str = ".blocked";

/// Legacy blocking marker file (inside [`NAMESPACE_DIR`]).
pub const LEGACY_MARKER_FILE: &str = "blocked.json";

/// Inert command substituted for a blocked inherited server.
pub const SENTINEL_COMMAND: &str = "echo";

/// Maximum length of a server name.
pub const MAX_SERVER_NAME_LEN: usize = 64;

/// Number of characters kept in a memory file content preview.
pub const PREVIEW_CHARS: usize = 200;

/// Minimum number of servers in a migration operation.
pub const MIN_MIGRATION_SERVERS: usize = 1;

/// Maximum number of servers in a migration operation.
pub const MAX_MIGRATION_SERVERS: usize = 50;

/// Hierarchy level of project-scoped definitions (the only promotable level).
pub const PROJECT_HIERARCHY_LEVEL: u32 = 1;

/// Environment variable overriding the settings file location.
pub const CONFIG_ENV_VAR: &str = "MCP_GATE_CONFIG";

/// Unix permission bits applied to a freshly written config file.
#[cfg(unix)]
pub const CONFIG_FILE_MODE: u32 = 0o644;

/// Unix permission bits applied to a freshly created namespace directory.
#[cfg(unix)]
pub const NAMESPACE_DIR_MODE: u32 = 0o755;
