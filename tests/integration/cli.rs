//! Tests for the `mcp-gate` binary.

use predicates::prelude::*;
use serde_json::{Value, json};
use std::fs;

use crate::common::{FileAssert, TestEnv};

#[test]
fn test_list_empty() {
    let env = TestEnv::new().unwrap();
    env.command()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No MCP servers found."));
}

#[test]
fn test_list_table_shows_scopes() {
    let env = TestEnv::new().unwrap();
    env.scopes.write_user(&json!({"mcpServers": {"github": {"command": "gh-mcp"}}})).unwrap();
    env.scopes
        .write_project(&json!({"mcpServers": {"postgres": {"command": "pg-mcp"}}}))
        .unwrap();

    env.command()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("github"))
        .stdout(predicate::str::contains("postgres"))
        .stdout(predicate::str::contains("project"))
        .stdout(predicate::str::contains("user"));
}

#[test]
fn test_list_json() {
    let env = TestEnv::new().unwrap();
    env.scopes.write_user(&json!({"mcpServers": {"github": {"command": "gh-mcp"}}})).unwrap();

    let output = env.command().args(["list", "--format", "json"]).output().unwrap();
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["servers"][0]["name"], "github");
    assert_eq!(value["servers"][0]["sourceType"], "inherited");
}

#[test]
fn test_block_then_unblock_inherited() {
    let env = TestEnv::new().unwrap();
    env.scopes.write_user(&json!({"mcpServers": {"github": {"command": "gh-mcp"}}})).unwrap();

    env.command()
        .args(["block", "github"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Blocked server 'github'"));
    let local = env.scopes.read_local().unwrap();
    assert_eq!(local["mcpServers"]["github"]["_blocked"], true);

    let output = env.command().args(["list", "--format", "json", "--blocked"]).output().unwrap();
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["servers"].as_array().unwrap().len(), 1);

    env.command().args(["unblock", "github"]).assert().success();
    assert_eq!(env.scopes.read_local().unwrap()["mcpServers"], json!({}));
}

#[test]
fn test_block_unknown_server_fails() {
    let env = TestEnv::new().unwrap();
    env.command()
        .args(["block", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("server 'ghost' not found"));
    FileAssert::not_exists(env.scopes.local_config());
}

#[test]
fn test_unblock_local_server_needs_manual_add() {
    let env = TestEnv::new().unwrap();
    env.scopes.write_local(&json!({"mcpServers": {"scratch": {"command": "python"}}})).unwrap();

    env.command().args(["block", "scratch"]).assert().success();
    env.command()
        .args(["unblock", "scratch"])
        .assert()
        .success()
        .stdout(predicate::str::contains("add its definition back manually"));
    assert_eq!(env.scopes.read_local().unwrap()["mcpServers"], json!({}));
}

#[test]
fn test_malformed_local_file_is_not_modified() {
    let env = TestEnv::new().unwrap();
    env.scopes.write_user(&json!({"mcpServers": {"github": {"command": "gh-mcp"}}})).unwrap();
    let local = env.scopes.local_config();
    fs::create_dir_all(local.parent().unwrap()).unwrap();
    fs::write(&local, "{ broken").unwrap();

    env.command()
        .args(["block", "github"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed config file"));
    FileAssert::equals(&local, "{ broken");
}

#[test]
fn test_memory_commands() {
    let env = TestEnv::new().unwrap();
    let path = env.memory_file(&env.scopes.local_memory(), "notes.md", "# Notes").unwrap();

    env.command().args(["block-memory", ".claude/memory/notes.md"]).assert().success();
    FileAssert::not_exists(&path);
    FileAssert::exists(path.with_file_name("notes.md.blocked"));

    env.command()
        .args(["unblock-memory", ".claude/memory/notes.md.blocked"])
        .assert()
        .success();
    FileAssert::exists(&path);

    env.command()
        .args(["unblock-memory", ".claude/memory/notes.md"])
        .assert()
        .failure();
}

#[test]
fn test_legacy_marker_migrates_on_startup() {
    let env = TestEnv::new().unwrap();
    env.scopes.write_user(&json!({"mcpServers": {"github": {"command": "gh-mcp"}}})).unwrap();
    env.write_legacy_marker(&json!({"servers": ["github"]})).unwrap();

    env.command()
        .arg("list")
        .assert()
        .success()
        .stderr(predicate::str::contains("Migrated legacy block list"));
    FileAssert::not_exists(env.legacy_marker());
    assert_eq!(env.scopes.read_local().unwrap()["mcpServers"]["github"]["_blocked"], true);
}

#[test]
fn test_migrate_legacy_without_marker() {
    let env = TestEnv::new().unwrap();
    env.command()
        .arg("migrate-legacy")
        .assert()
        .success()
        .stdout(predicate::str::contains("No legacy block list found."));
}

#[test]
fn test_promote_command() {
    let env = TestEnv::new().unwrap();
    env.scopes
        .write_project(&json!({"mcpServers": {"postgres": {"command": "pg-mcp"}}}))
        .unwrap();
    env.scopes.write_user(&json!({"mcpServers": {"postgres": {"command": "old"}}})).unwrap();

    env.command()
        .args(["promote", "postgres"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    env.command()
        .args(["promote", "postgres", "--on-conflict", "overwrite"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Promoted 'postgres'"));

    let user = mcp_gate::test_utils::fixtures::read_json(&env.scopes.user_config()).unwrap();
    assert_eq!(user["mcpServers"]["postgres"]["command"], "pg-mcp");
    let project = mcp_gate::test_utils::fixtures::read_json(&env.scopes.project_config()).unwrap();
    assert_eq!(project["mcpServers"], json!({}));
}

#[test]
fn test_promote_rejects_bad_resolution() {
    let env = TestEnv::new().unwrap();
    env.scopes
        .write_project(&json!({"mcpServers": {"postgres": {"command": "pg-mcp"}}}))
        .unwrap();

    env.command()
        .args(["promote", "postgres", "--on-conflict", "merge"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown conflict resolution"));
}

#[test]
fn test_settings_file_selects_json_output() {
    let env = TestEnv::new().unwrap();
    let settings = env.home().join("settings.toml");
    fs::write(&settings, "output = \"json\"\n").unwrap();

    let output = env.command().env("MCP_GATE_CONFIG", &settings).arg("list").output().unwrap();
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(value["servers"].as_array().unwrap().is_empty());
}
