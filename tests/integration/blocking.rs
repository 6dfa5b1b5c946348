//! Blocking round trips through the merged view.

use mcp_gate::core::GateError;
use mcp_gate::mcp::{BlockingService, ConfigLayout, ConfigStore};
use mcp_gate::memory::{block_memory_file, unblock_memory_file};
use mcp_gate::scopes::ScopeLoader;
use mcp_gate::test_utils::TestScopes;
use serde_json::json;
use std::fs;

fn service() -> BlockingService {
    BlockingService::new(ConfigStore::new(ConfigLayout::local()))
}

#[tokio::test]
async fn test_block_and_unblock_inherited_server() {
    let scopes = TestScopes::new().unwrap();
    scopes
        .write_user(&json!({"mcpServers": {"beta": {"command": "npx", "args": ["-y", "beta"]}}}))
        .unwrap();
    let loader = ScopeLoader::new(scopes.project(), scopes.home());

    let beta = loader.load().await.server("beta").cloned().unwrap();
    assert!(!beta.blocked);
    service().block(scopes.project(), &beta).unwrap();

    let local = scopes.read_local().unwrap();
    assert_eq!(local["mcpServers"]["beta"]["command"], "echo");
    assert_eq!(local["mcpServers"]["beta"]["_blocked"], true);
    assert_eq!(local["mcpServers"]["beta"]["_original"]["command"], "npx");

    let view = loader.load().await;
    let blocked = view.server("beta").unwrap();
    assert!(blocked.blocked);
    assert_eq!(blocked.command, "npx");
    assert_eq!(blocked.provenance.source_path, scopes.user_config());

    let outcome = service().unblock(scopes.project(), blocked).unwrap();
    assert!(!outcome.requires_manual_add);
    let local = scopes.read_local().unwrap();
    assert_eq!(local["mcpServers"], json!({}));

    let view = loader.load().await;
    assert!(!view.server("beta").unwrap().blocked);

    // The user file was never touched
    let user = mcp_gate::test_utils::fixtures::read_json(&scopes.user_config()).unwrap();
    assert_eq!(user["mcpServers"]["beta"]["args"], json!(["-y", "beta"]));
}

#[tokio::test]
async fn test_block_local_server_removes_it() {
    let scopes = TestScopes::new().unwrap();
    scopes
        .write_local(&json!({
            "permissions": {"allow": []},
            "mcpServers": {"alpha": {"command": "node", "args": ["a.js"]}}
        }))
        .unwrap();
    let loader = ScopeLoader::new(scopes.project(), scopes.home());

    let alpha = loader.load().await.server("alpha").cloned().unwrap();
    service().block(scopes.project(), &alpha).unwrap();

    let local = scopes.read_local().unwrap();
    assert_eq!(local["mcpServers"], json!({}));
    assert_eq!(local["permissions"], json!({"allow": []}));
    assert!(loader.load().await.server("alpha").is_none());

    let outcome = service().unblock(scopes.project(), &alpha).unwrap();
    assert!(outcome.requires_manual_add);
    assert_eq!(scopes.read_local().unwrap()["mcpServers"], json!({}));
}

#[tokio::test]
async fn test_block_inherited_keeps_full_definition() {
    let scopes = TestScopes::new().unwrap();
    let definition = json!({"type": "stdio", "command": "uvx", "cwd": "/srv", "timeout": 30});
    scopes.write_user(&json!({"mcpServers": {"beta": definition}})).unwrap();
    let loader = ScopeLoader::new(scopes.project(), scopes.home());

    let beta = loader.load().await.server("beta").cloned().unwrap();
    service().block(scopes.project(), &beta).unwrap();

    let local = scopes.read_local().unwrap();
    assert_eq!(local["mcpServers"]["beta"]["_original"], definition);
}

#[tokio::test]
async fn test_block_local_server_that_hides_project_definition() {
    let scopes = TestScopes::new().unwrap();
    scopes.write_local(&json!({"mcpServers": {"alpha": {"command": "local-cmd"}}})).unwrap();
    scopes
        .write_project(&json!({"mcpServers": {"alpha": {"command": "project-cmd", "args": ["--p"]}}}))
        .unwrap();
    let loader = ScopeLoader::new(scopes.project(), scopes.home());

    let alpha = loader.load().await.server("alpha").cloned().unwrap();
    assert_eq!(alpha.command, "local-cmd");
    assert_eq!(alpha.shadowed.as_ref().unwrap().command, "project-cmd");
    service().block(scopes.project(), &alpha).unwrap();

    let local = scopes.read_local().unwrap();
    assert_eq!(local["mcpServers"]["alpha"]["_blocked"], true);
    assert_eq!(local["mcpServers"]["alpha"]["_original"]["command"], "project-cmd");

    // The project definition does not resurface
    let view = loader.load().await;
    let blocked = view.server("alpha").unwrap();
    assert!(blocked.blocked);
    assert_eq!(blocked.command, "project-cmd");
    assert_eq!(blocked.provenance.hierarchy_level, 1);

    let outcome = service().unblock(scopes.project(), blocked).unwrap();
    assert!(!outcome.requires_manual_add);
    let view = loader.load().await;
    let restored = view.server("alpha").unwrap();
    assert!(!restored.blocked);
    assert_eq!(restored.command, "project-cmd");

    let project = mcp_gate::test_utils::fixtures::read_json(&scopes.project_config()).unwrap();
    assert_eq!(project["mcpServers"]["alpha"]["command"], "project-cmd");
}

#[tokio::test]
async fn test_block_stale_shadowing_view_fails() {
    let scopes = TestScopes::new().unwrap();
    scopes.write_local(&json!({"mcpServers": {"alpha": {"command": "local-cmd"}}})).unwrap();
    scopes.write_user(&json!({"mcpServers": {"alpha": {"command": "user-cmd"}}})).unwrap();
    let loader = ScopeLoader::new(scopes.project(), scopes.home());
    let alpha = loader.load().await.server("alpha").cloned().unwrap();

    scopes.write_local(&json!({"mcpServers": {}})).unwrap();
    let err = service().block(scopes.project(), &alpha).unwrap_err();
    assert!(matches!(err, GateError::NotFound { kind: "server", .. }));
    assert_eq!(scopes.read_local().unwrap()["mcpServers"], json!({}));
}

#[test]
fn test_unblock_inherited_without_override() {
    let scopes = TestScopes::new().unwrap();
    scopes.write_local(&json!({"mcpServers": {"beta": {"command": "npx"}}})).unwrap();

    let err = service().unblock_inherited(scopes.project(), "beta").unwrap_err();
    assert!(matches!(err, GateError::NotFound { kind: "override", .. }));
    assert!(scopes.read_local().unwrap()["mcpServers"]["beta"].is_object());
}

#[test]
fn test_memory_block_round_trip() {
    let scopes = TestScopes::new().unwrap();
    let path = scopes.write_memory(&scopes.local_memory(), "notes/a.md", "# A\n").unwrap();

    let blocked = block_memory_file(&path).unwrap();
    assert_eq!(blocked, scopes.local_memory().join("notes/a.md.blocked"));
    assert!(!path.exists());
    assert_eq!(fs::read_to_string(&blocked).unwrap(), "# A\n");

    let restored = unblock_memory_file(&blocked).unwrap();
    assert_eq!(restored, path);
    assert!(!blocked.exists());
}

#[test]
fn test_memory_block_refuses_existing_target() {
    let scopes = TestScopes::new().unwrap();
    let path = scopes.write_memory(&scopes.local_memory(), "a.md", "new").unwrap();
    scopes.write_memory(&scopes.local_memory(), "a.md.blocked", "old").unwrap();

    let err = block_memory_file(&path).unwrap_err();
    assert!(matches!(err, GateError::ValidationFailure { .. }));
    assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    assert_eq!(fs::read_to_string(scopes.local_memory().join("a.md.blocked")).unwrap(), "old");
}

#[test]
fn test_memory_block_missing_file() {
    let scopes = TestScopes::new().unwrap();
    let err = block_memory_file(&scopes.local_memory().join("ghost.md")).unwrap_err();
    assert!(err.is_not_found());
}
