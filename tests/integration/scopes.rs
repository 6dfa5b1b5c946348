//! Merged view resolution across all three scopes.

use mcp_gate::core::GateError;
use mcp_gate::mcp::{ConfigLayout, ConfigStore};
use mcp_gate::models::SourceType;
use mcp_gate::scopes::ScopeLoader;
use serde_json::json;
use std::fs;

use crate::common::TestEnv;

#[tokio::test]
async fn test_three_scopes_merge() {
    let env = TestEnv::new().unwrap();
    env.scopes
        .write_user(&json!({
            "numStartups": 12,
            "mcpServers": {
                "github": {"command": "gh-mcp"},
                "shared": {"command": "user-shared"}
            }
        }))
        .unwrap();
    env.scopes
        .write_project(&json!({"mcpServers": {"shared": {"command": "project-shared"}}}))
        .unwrap();
    env.scopes
        .write_local(&json!({"mcpServers": {"scratch": {"command": "python", "args": ["s.py"]}}}))
        .unwrap();
    env.memory_file(&env.scopes.user_memory(), "style.md", "Prefer tabs").unwrap();
    env.memory_file(&env.scopes.local_memory(), "todo.md.blocked", "later").unwrap();

    let view = ScopeLoader::new(env.project(), env.home()).load().await;

    let names: Vec<_> = view.servers.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["github", "scratch", "shared"]);
    assert_eq!(view.server("shared").unwrap().command, "project-shared");
    assert_eq!(view.server("scratch").unwrap().source_type(), SourceType::Local);
    assert_eq!(view.server("github").unwrap().source_type(), SourceType::Inherited);
    for server in &view.servers {
        server.validate().unwrap();
        assert!(server.estimated_tokens.unwrap() > 0);
    }

    assert_eq!(view.memory_files.len(), 2);
    let todo = view.memory_files.iter().find(|m| m.name == "todo.md").unwrap();
    assert!(todo.blocked);
    assert_eq!(todo.provenance.hierarchy_level, 0);
    let style = view.memory_files.iter().find(|m| m.name == "style.md").unwrap();
    assert!(!style.blocked);
    assert_eq!(style.preview.as_deref(), Some("Prefer tabs"));
    assert_eq!(style.provenance.hierarchy_level, 2);
}

#[tokio::test]
async fn test_malformed_scope_contributes_nothing() {
    let env = TestEnv::new().unwrap();
    env.scopes.write_user(&json!({"mcpServers": {"github": {"command": "gh-mcp"}}})).unwrap();
    fs::write(env.scopes.project_config(), "{\"mcpServers\": {").unwrap();

    let view = ScopeLoader::new(env.project(), env.home()).load().await;
    assert_eq!(view.servers.len(), 1);
    assert!(view.server("github").is_some());

    // A direct read of the same file is strict
    let err = ConfigStore::new(ConfigLayout::project()).read(env.project()).unwrap_err();
    assert!(matches!(err, GateError::MalformedConfig { .. }));
}

#[tokio::test]
async fn test_empty_environment() {
    let env = TestEnv::new().unwrap();
    let view = ScopeLoader::new(env.project(), env.home()).load().await;
    assert!(view.servers.is_empty());
    assert!(view.memory_files.is_empty());
    assert!(view.sources.iter().all(|s| !s.exists));
}

#[tokio::test]
async fn test_view_serializes_to_json() {
    let env = TestEnv::new().unwrap();
    env.scopes.write_user(&json!({"mcpServers": {"github": {"command": "gh-mcp"}}})).unwrap();

    let view = ScopeLoader::new(env.project(), env.home()).load().await;
    let value = serde_json::to_value(&view).unwrap();
    assert_eq!(value["servers"][0]["name"], "github");
    assert_eq!(value["servers"][0]["blocked"], false);
    assert_eq!(value["servers"][0]["hierarchyLevel"], 2);
}
