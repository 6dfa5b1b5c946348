//! Legacy marker conversion and project-to-user promotion.

use mcp_gate::mcp::{ConfigLayout, ConfigStore, legacy};
use mcp_gate::models::{ConflictResolution, MigrationPlan};
use mcp_gate::scopes::ScopeLoader;
use serde_json::json;

use crate::common::{FileAssert, TestEnv};

#[tokio::test]
async fn test_legacy_marker_with_inherited_server() {
    let env = TestEnv::new().unwrap();
    env.scopes
        .write_project(&json!({"mcpServers": {"shared": {"command": "uvx", "args": ["shared"]}}}))
        .unwrap();
    env.scopes
        .write_local(&json!({"mcpServers": {"mine": {"command": "node"}}}))
        .unwrap();
    let memory = env.memory_file(&env.scopes.local_memory(), "old.md", "stale").unwrap();
    env.write_legacy_marker(&json!({
        "servers": ["shared", "mine", "vanished"],
        "memory": [".claude/memory/old.md"]
    }))
    .unwrap();

    let loader = ScopeLoader::new(env.project(), env.home());
    let inherited = loader.load().await.inherited_definitions();
    let store = ConfigStore::new(ConfigLayout::local());
    let report = legacy::migrate_legacy_with(&store, env.project(), &inherited).unwrap();

    assert!(report.migrated);
    assert_eq!(report.servers_count, 2);
    assert_eq!(report.memory_count, 1);
    FileAssert::not_exists(env.legacy_marker());
    FileAssert::not_exists(&memory);
    FileAssert::exists(memory.with_file_name("old.md.blocked"));

    let local = env.scopes.read_local().unwrap();
    assert_eq!(local["mcpServers"]["shared"]["_original"]["command"], "uvx");
    assert_eq!(local["mcpServers"]["mine"]["_blocked"], true);

    let view = loader.load().await;
    assert!(view.server("shared").unwrap().blocked);
    // The override for a local-only server has nothing to mark
    assert!(view.server("mine").is_none());
    assert!(view.memory_files.iter().any(|m| m.blocked && m.name == "old.md"));
}

#[tokio::test]
async fn test_legacy_marker_keeps_full_definition() {
    let env = TestEnv::new().unwrap();
    let definition = json!({"type": "stdio", "command": "uvx", "cwd": "/srv"});
    env.scopes.write_user(&json!({"mcpServers": {"beta": definition}})).unwrap();
    env.write_legacy_marker(&json!({"servers": ["beta"]})).unwrap();

    let inherited = ScopeLoader::new(env.project(), env.home()).load().await.inherited_definitions();
    let store = ConfigStore::new(ConfigLayout::local());
    legacy::migrate_legacy_with(&store, env.project(), &inherited).unwrap();

    let local = env.scopes.read_local().unwrap();
    assert_eq!(local["mcpServers"]["beta"]["_original"], definition);
}

#[test]
fn test_malformed_marker_is_kept() {
    let env = TestEnv::new().unwrap();
    std::fs::create_dir_all(env.project().join(".claude")).unwrap();
    std::fs::write(env.legacy_marker(), "{ not json").unwrap();

    let store = ConfigStore::new(ConfigLayout::local());
    assert!(legacy::migrate_legacy(&store, env.project()).is_err());
    FileAssert::exists(env.legacy_marker());
}

#[tokio::test]
async fn test_promote_with_rename() {
    let env = TestEnv::new().unwrap();
    env.scopes
        .write_project(&json!({"mcpServers": {
            "db": {"command": "pg-mcp", "env": {"PGHOST": "localhost"}},
            "keep": {"command": "keep"}
        }}))
        .unwrap();
    env.scopes.write_user(&json!({"mcpServers": {"db": {"command": "other"}}})).unwrap();

    let view = ScopeLoader::new(env.project(), env.home()).load().await;
    let plan = MigrationPlan::new(vec![view.server("db").cloned().unwrap()]).with_conflict(
        "db",
        ConflictResolution::Rename {
            new_name: "db-project".into(),
        },
    );
    let report = plan
        .apply(
            &ConfigStore::new(ConfigLayout::project()),
            &ConfigStore::new(ConfigLayout::user()),
            env.project(),
            env.home(),
        )
        .unwrap();
    assert_eq!(report.promoted, vec![("db".to_string(), "db-project".to_string())]);

    let view = ScopeLoader::new(env.project(), env.home()).load().await;
    let db = view.server("db").unwrap();
    assert_eq!(db.command, "other");
    assert_eq!(db.provenance.hierarchy_level, 2);
    let promoted = view.server("db-project").unwrap();
    assert_eq!(promoted.env.get("PGHOST").map(String::as_str), Some("localhost"));
    assert_eq!(view.server("keep").unwrap().provenance.hierarchy_level, 1);
}
