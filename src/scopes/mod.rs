//! Scope resolution: reading every scope and merging it into one view.
//!
//! The hierarchy is fixed, with the project directory `P` and the home
//! directory `H` passed in explicitly:
//!
//! | level | scope   | config file                     | memory root        |
//! |-------|---------|---------------------------------|--------------------|
//! | 0     | local   | `P/.claude/settings.local.json` | `P/.claude/memory` |
//! | 1     | project | `P/.mcp.json`                   |                    |
//! | 2     | user    | `H/.claude.json`                | `H/.claude/memory` |
//!
//! A lower level wins when two scopes define the same server. An override
//! entry (`_blocked: true`) marks the nearest definition above it as blocked
//! instead of replacing it, so the view keeps the definition's provenance.
//!
//! Loading is lenient: a scope whose file cannot be read or parsed
//! contributes nothing and is reported with a warning.

use crate::constants::{MEMORY_DIR, NAMESPACE_DIR};
use crate::mcp::{ConfigFile, ConfigLayout, ConfigStore};
use crate::memory::discover_memory_files;
use crate::models::{
    ConfigSource, McpServer, MemoryFile, Provenance, ServerConfig, ServerEntry, SourceKind,
};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// One level of the configuration hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// The project's private settings (`P/.claude/settings.local.json`)
    Local,
    /// The shared project file (`P/.mcp.json`)
    Project,
    /// The user's global file (`H/.claude.json`)
    User,
}

impl Scope {
    /// Every scope, most local first.
    pub const ALL: [Self; 3] = [Self::Local, Self::Project, Self::User];

    /// Hierarchy level (0 = most local).
    #[must_use]
    pub const fn level(self) -> u32 {
        match self {
            Self::Local => 0,
            Self::Project => 1,
            Self::User => 2,
        }
    }

    /// Layout of this scope's config file.
    #[must_use]
    pub fn layout(self) -> ConfigLayout {
        match self {
            Self::Local => ConfigLayout::local(),
            Self::Project => ConfigLayout::project(),
            Self::User => ConfigLayout::user(),
        }
    }

    /// Scope directory the layout is resolved against.
    #[must_use]
    pub fn dir<'a>(self, project: &'a Path, home: &'a Path) -> &'a Path {
        match self {
            Self::Local | Self::Project => project,
            Self::User => home,
        }
    }

    /// Memory root of this scope, if it has one.
    #[must_use]
    pub fn memory_root(self, project: &Path, home: &Path) -> Option<PathBuf> {
        match self {
            Self::Local => Some(project.join(NAMESPACE_DIR).join(MEMORY_DIR)),
            Self::Project => None,
            Self::User => Some(home.join(NAMESPACE_DIR).join(MEMORY_DIR)),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Project => write!(f, "project"),
            Self::User => write!(f, "user"),
        }
    }
}

/// Result of one resolution pass.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedView {
    /// Every config file and memory root that was inspected
    pub sources: Vec<ConfigSource>,
    /// Effective servers, sorted by name
    pub servers: Vec<McpServer>,
    /// Discovered memory files, most local scope first
    pub memory_files: Vec<MemoryFile>,
}

impl MergedView {
    /// Effective server named `name`.
    #[must_use]
    pub fn server(&self, name: &str) -> Option<&McpServer> {
        self.servers.iter().find(|s| s.name == name)
    }

    /// Definitions visible from ancestor scopes (level > 0), keyed by name.
    #[must_use]
    pub fn inherited_definitions(&self) -> BTreeMap<String, ServerConfig> {
        self.servers
            .iter()
            .filter(|s| s.provenance.hierarchy_level > 0)
            .map(|s| (s.name.clone(), s.to_config()))
            .collect()
    }
}

/// Everything read from one scope.
#[derive(Debug)]
struct ScopeSnapshot {
    scope: Scope,
    sources: Vec<ConfigSource>,
    config_path: PathBuf,
    config: Option<ConfigFile>,
    memory_files: Vec<MemoryFile>,
}

/// Resolves the fixed scope hierarchy for one project and home directory.
#[derive(Debug, Clone)]
pub struct ScopeLoader {
    project: PathBuf,
    home: PathBuf,
}

impl ScopeLoader {
    /// Loader for project directory `project` and user home `home`.
    pub fn new(project: impl Into<PathBuf>, home: impl Into<PathBuf>) -> Self {
        Self {
            project: project.into(),
            home: home.into(),
        }
    }

    /// The project directory.
    #[must_use]
    pub fn project(&self) -> &Path {
        &self.project
    }

    /// The home directory.
    #[must_use]
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Read every scope concurrently and merge the results.
    ///
    /// Never fails: unreadable scopes contribute nothing.
    pub async fn load(&self) -> MergedView {
        let tasks = Scope::ALL.map(|scope| {
            let project = self.project.clone();
            let home = self.home.clone();
            tokio::task::spawn_blocking(move || load_scope(scope, &project, &home))
        });

        let mut snapshots = Vec::with_capacity(tasks.len());
        for result in join_all(tasks).await {
            match result {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(e) => tracing::warn!("Scope loading task failed: {e}"),
            }
        }
        merge(snapshots)
    }
}

fn load_scope(scope: Scope, project: &Path, home: &Path) -> ScopeSnapshot {
    let level = scope.level();
    let dir = scope.dir(project, home);
    let store = ConfigStore::new(scope.layout());
    let config_path = store.config_path(dir);

    let mut sources = vec![ConfigSource::inspect(&config_path, SourceKind::Mcp, level)];

    let config = match store.read(dir) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Ignoring {scope} scope: {e}");
            None
        }
    };

    let mut memory_files = Vec::new();
    if let Some(root) = scope.memory_root(project, home) {
        sources.push(ConfigSource::inspect(&root, SourceKind::Memory, level));
        memory_files = discover_memory_files(&root, &Provenance::new(&root, level));
    }

    tracing::debug!(
        "Loaded {scope} scope: {} servers, {} memory files",
        config.as_ref().map_or(0, |c| c.servers.len()),
        memory_files.len()
    );

    ScopeSnapshot {
        scope,
        sources,
        config_path,
        config,
        memory_files,
    }
}

fn merge(mut snapshots: Vec<ScopeSnapshot>) -> MergedView {
    snapshots.sort_by_key(|s| s.scope.level());

    let mut view = MergedView::default();
    let mut servers: BTreeMap<String, McpServer> = BTreeMap::new();

    // Most global first so lower levels overwrite or block what is above them
    for snapshot in snapshots.iter().rev() {
        let Some(config) = &snapshot.config else {
            continue;
        };
        let level = snapshot.scope.level();
        for (name, entry) in &config.servers {
            match entry {
                ServerEntry::Plain(definition) => {
                    let provenance = Provenance::new(&snapshot.config_path, level);
                    let mut server = McpServer::from_config(name, definition, provenance);
                    server.shadowed = servers.remove(name).map(Box::new);
                    servers.insert(name.clone(), server);
                }
                ServerEntry::Blocked(blocked) => match servers.get_mut(name) {
                    Some(server) => {
                        server.blocked = true;
                        server.blocked_at = Some(parse_blocked_at(name, &blocked.blocked_at));
                    }
                    None => tracing::debug!(
                        "Override for '{name}' in {} has no inherited definition",
                        snapshot.config_path.display()
                    ),
                },
            }
        }
    }

    for snapshot in snapshots {
        view.sources.extend(snapshot.sources);
        view.memory_files.extend(snapshot.memory_files);
    }
    view.servers = servers.into_values().collect();
    view
}

fn parse_blocked_at(name: &str, raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw).map(|t| t.with_timezone(&Utc)).unwrap_or_else(|e| {
        tracing::warn!("Override for '{name}' has an invalid _blockedAt '{raw}': {e}");
        DateTime::<Utc>::UNIX_EPOCH
    })
}
