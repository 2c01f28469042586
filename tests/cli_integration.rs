//! Integration tests for the `dragboard` CLI.
//!
//! Each test writes its inputs into a temp directory, runs `dragboard` as a
//! subprocess, and verifies stdout and/or file contents.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use pretty_assertions::assert_eq;
use serde_json::Value;

/// Get the path to the built `dragboard` binary.
fn dragboard_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("dragboard");
    path
}

/// Run `dragboard` with args in the given directory, return (stdout, stderr, success).
fn run(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(dragboard_bin())
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run dragboard");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `dragboard` expecting success, return stdout.
fn run_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run(dir, args);
    if !success {
        panic!(
            "dragboard {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

fn write_scenario(root: &Path) -> PathBuf {
    let path = root.join("scenario.json");
    fs::write(
        &path,
        r#"{
  "entities": {
    "tasks": [
      { "id": "t1", "title": "Pay rent", "status": "Active", "folderId": "f1" },
      { "id": "t2", "title": "Call bank", "status": "Active", "labels": ["work"] }
    ],
    "labels": [{ "id": "l2", "name": "urgent", "color": "red" }],
    "folders": [{ "id": "f1", "name": "Home" }]
  },
  "steps": [
    {
      "op": "drop",
      "source": { "kind": "task", "id": "t1", "container": { "list": "main" } },
      "target": { "kind": "systemTarget", "target": "active" }
    },
    {
      "op": "drop",
      "source": { "kind": "sidebarLabel", "id": "l2", "name": "urgent" },
      "target": { "kind": "task", "id": "t2", "container": { "list": "main" } }
    },
    { "op": "flush" }
  ]
}"#,
    )
    .unwrap();
    path
}

// ---------------------------------------------------------------------------
// replay
// ---------------------------------------------------------------------------

#[test]
fn test_replay_json() {
    let tmp = tempfile::TempDir::new().unwrap();
    let scenario = write_scenario(tmp.path());

    let out = run_ok(tmp.path(), &["replay", scenario.to_str().unwrap(), "--json"]);
    let report: Value = serde_json::from_str(&out).unwrap();

    let outcomes: Vec<&str> = report["steps"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["outcome"].as_str().unwrap())
        .collect();
    assert_eq!(
        outcomes,
        vec!["status t1 -> active", "retag t2 +urgent", "flush"]
    );

    let calls = report["calls"].as_array().unwrap();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0]["kind"], "updateTask");
    assert_eq!(
        calls[0]["body"]["patch"],
        serde_json::json!({ "status": "Active", "folderId": null })
    );
    assert_eq!(
        calls[1]["body"]["patch"],
        serde_json::json!({ "labels": ["work", "urgent"] })
    );

    let tasks = report["finalState"]["tasks"].as_array().unwrap();
    assert_eq!(tasks[0]["folderId"], Value::Null);
    assert!(report["failures"].as_array().unwrap().is_empty());
}

#[test]
fn test_replay_text() {
    let tmp = tempfile::TempDir::new().unwrap();
    let scenario = write_scenario(tmp.path());

    let out = run_ok(tmp.path(), &["replay", scenario.to_str().unwrap()]);
    assert!(out.contains("  0  status t1 -> active"));
    assert!(out.contains("ok   updateTask"));
    assert!(out.contains("[ ] t2 Call bank #work #urgent"));
}

#[test]
fn test_replay_missing_file_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    let (_, stderr, success) = run(tmp.path(), &["replay", "nope.json"]);
    assert!(!success);
    assert!(stderr.contains("error:"));
}

// ---------------------------------------------------------------------------
// sidebar
// ---------------------------------------------------------------------------

#[test]
fn test_sidebar_reconcile_and_write() {
    let tmp = tempfile::TempDir::new().unwrap();
    let state = tmp.path().join("sidebar.json");
    fs::write(&state, r#"["folder:gone", "system:trash"]"#).unwrap();

    let out = run_ok(
        tmp.path(),
        &[
            "sidebar",
            state.to_str().unwrap(),
            "--folders",
            "f1,f2",
            "--write",
        ],
    );
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(
        lines,
        vec![
            "system:trash",
            "system:active",
            "system:closed",
            "system:assistant",
            "folder:f1",
            "folder:f2",
        ]
    );

    let stored: Vec<String> = serde_json::from_str(&fs::read_to_string(&state).unwrap()).unwrap();
    assert_eq!(stored, lines);
}

#[test]
fn test_sidebar_uses_config_system_targets() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = tmp.path().join("dragboard.toml");
    fs::write(&config, "[sidebar]\nsystem_targets = [\"active\"]\n").unwrap();
    let state = tmp.path().join("missing.json");

    let out = run_ok(
        tmp.path(),
        &[
            "-c",
            config.to_str().unwrap(),
            "sidebar",
            state.to_str().unwrap(),
            "--folders",
            "f1",
            "--json",
        ],
    );
    let report: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(
        report,
        serde_json::json!({ "order": ["system:active", "folder:f1"], "changed": true })
    );
    // without --write nothing is stored
    assert!(!state.exists());
}
