//! Integration tests for the `tasktree` CLI.
//!
//! Each test points `tasktree` at a document and config inside a temp
//! directory, runs it as a subprocess, and checks stdout and the saved file.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn tasktree_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_tasktree"))
}

fn data_file(dir: &Path) -> PathBuf {
    dir.join("data/tasktree-data.json")
}

fn run(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(tasktree_bin())
        .arg("--file")
        .arg(data_file(dir))
        .arg("--config")
        .arg(dir.join("config.toml"))
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run tasktree");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn run_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run(dir, args);
    if !success {
        panic!(
            "tasktree {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

fn run_err(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run(dir, args);
    if success {
        panic!("tasktree {:?} should have failed:\nstdout: {}", args, stdout);
    }
    stderr
}

/// Document with a parent, two leaves and a link
fn write_document(dir: &Path) {
    let path = data_file(dir);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        &path,
        r#"{
  "root": {
    "id": "root",
    "text": "Home",
    "children": [
      {"id": "a", "text": "Groceries", "children": [
        {"id": "m", "text": "Milk", "children": [], "completed": true},
        {"id": "e", "text": "Eggs", "children": []}
      ]},
      {"id": "b", "text": "Review https://github.com/acme/api/pull/42", "children": []}
    ]
  },
  "viewOffset": {"x": 0, "y": 0},
  "zoom": 1.0,
  "savedAt": "2025-05-14T10:00:00Z"
}"#,
    )
    .unwrap();
}

fn saved(dir: &Path) -> serde_json::Value {
    let text = fs::read_to_string(data_file(dir)).unwrap();
    serde_json::from_str(&text).unwrap()
}

// ============================================================================
// Read commands
// ============================================================================

#[test]
fn test_show_without_saved_document() {
    let tmp = TempDir::new().unwrap();
    let out = run_ok(tmp.path(), &["show"]);
    assert_eq!(out, "Root (0/1)\n[ ] initial-task New task\n");
    assert!(!data_file(tmp.path()).exists());
}

#[test]
fn test_show_outline() {
    let tmp = TempDir::new().unwrap();
    write_document(tmp.path());
    let out = run_ok(tmp.path(), &["show"]);
    assert_eq!(
        out,
        "Home (0/2)\n\
         [ ] a Groceries (1/2)\n  \
         [x] m Milk\n  \
         [ ] e Eggs\n\
         [ ] b Review https://github.com/acme/api/pull/42\n"
    );
}

#[test]
fn test_show_json() {
    let tmp = TempDir::new().unwrap();
    write_document(tmp.path());
    let out = run_ok(tmp.path(), &["show", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["text"], "Home");
    assert_eq!(parsed["stats"]["total"], 2);
    assert_eq!(parsed["tasks"][0]["stats"]["completed"], 1);
    assert_eq!(parsed["tasks"][0]["children"][0]["completed"], true);
}

#[test]
fn test_leaves_open_and_all() {
    let tmp = TempDir::new().unwrap();
    write_document(tmp.path());

    let out = run_ok(tmp.path(), &["leaves"]);
    assert!(!out.contains("Milk"));
    assert!(out.contains("[ ] e Eggs"));
    assert!(out.contains("[ ] b Review"));

    let out = run_ok(tmp.path(), &["leaves", "--all", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    let ids: Vec<&str> = parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["m", "e", "b"]);
}

#[test]
fn test_urls_json() {
    let tmp = TempDir::new().unwrap();
    write_document(tmp.path());
    let out = run_ok(tmp.path(), &["urls", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 1);
    assert_eq!(parsed[0]["task_id"], "b");
    assert_eq!(parsed[0]["kind"], "github");
    assert_eq!(parsed[0]["preview"]["type"], "github");
    assert_eq!(parsed[0]["preview"]["repo"], "api");
    assert_eq!(parsed[0]["preview"]["number"], 42);
}

// ============================================================================
// Write commands
// ============================================================================

#[test]
fn test_add_top_level_and_child() {
    let tmp = TempDir::new().unwrap();
    write_document(tmp.path());

    let top = run_ok(tmp.path(), &["add", "Call mom"]).trim().to_string();
    assert_eq!(top.len(), 9);
    let child = run_ok(tmp.path(), &["add", "Bread", "--parent", "a"])
        .trim()
        .to_string();

    let doc = saved(tmp.path());
    assert_eq!(doc["root"]["children"][2]["id"], top.as_str());
    assert_eq!(doc["root"]["children"][2]["text"], "Call mom");
    assert_eq!(doc["root"]["children"][0]["children"][2]["id"], child.as_str());
}

#[test]
fn test_add_under_unknown_parent_fails() {
    let tmp = TempDir::new().unwrap();
    write_document(tmp.path());
    let err = run_err(tmp.path(), &["add", "x", "--parent", "nope"]);
    assert!(err.contains("task not found: nope"));
}

#[test]
fn test_toggle_leaf_and_parent() {
    let tmp = TempDir::new().unwrap();
    write_document(tmp.path());

    let out = run_ok(tmp.path(), &["toggle", "e"]);
    assert_eq!(out, "[x] e Eggs\n");
    let out = run_ok(tmp.path(), &["show"]);
    assert!(out.contains("[x] a Groceries (2/2)"));

    let err = run_err(tmp.path(), &["toggle", "a"]);
    assert!(err.contains("has subtasks"));
}

#[test]
fn test_rm_task_and_root() {
    let tmp = TempDir::new().unwrap();
    write_document(tmp.path());

    run_ok(tmp.path(), &["rm", "a"]);
    let out = run_ok(tmp.path(), &["show"]);
    assert!(!out.contains("Groceries"));
    assert!(!out.contains("Milk"));

    let err = run_err(tmp.path(), &["rm", "root"]);
    assert!(err.contains("cannot remove the root"));
}

#[test]
fn test_mv_positions() {
    let tmp = TempDir::new().unwrap();
    write_document(tmp.path());

    run_ok(tmp.path(), &["mv", "b", "a", "--before"]);
    assert_eq!(saved(tmp.path())["root"]["children"][0]["id"], "b");

    run_ok(tmp.path(), &["mv", "b", "m", "--child"]);
    let doc = saved(tmp.path());
    assert_eq!(doc["root"]["children"][0]["children"][0]["children"][0]["id"], "b");
    assert!(doc["root"]["children"][0]["children"][0].get("completed").is_none());
}

#[test]
fn test_mv_into_own_subtree_fails() {
    let tmp = TempDir::new().unwrap();
    write_document(tmp.path());
    let before = fs::read_to_string(data_file(tmp.path())).unwrap();
    let err = run_err(tmp.path(), &["mv", "a", "e", "--child"]);
    assert!(err.contains("own subtree"));
    assert_eq!(fs::read_to_string(data_file(tmp.path())).unwrap(), before);
}

#[test]
fn test_mv_requires_a_position() {
    let tmp = TempDir::new().unwrap();
    write_document(tmp.path());
    run_err(tmp.path(), &["mv", "b", "a"]);
}

#[test]
fn test_attach_copies_image() {
    let tmp = TempDir::new().unwrap();
    write_document(tmp.path());
    let image = tmp.path().join("shot.png");
    fs::write(&image, b"\x89PNG fake").unwrap();

    let out = run_ok(tmp.path(), &["attach", "e", image.to_str().unwrap()]);
    assert_eq!(out.trim(), "e/1.png");
    let stored = tmp.path().join("data/images/e/1.png");
    assert_eq!(fs::read(stored).unwrap(), b"\x89PNG fake");

    let doc = saved(tmp.path());
    let attached = &doc["root"]["children"][0]["children"][1]["images"][0];
    assert_eq!(attached["s3Key"], "e/1.png");
}

// ============================================================================
// Export / import
// ============================================================================

#[test]
fn test_export_then_import() {
    let tmp = TempDir::new().unwrap();
    write_document(tmp.path());

    let out = run_ok(tmp.path(), &["export", "backup.json"]);
    assert_eq!(out.trim(), "backup.json");
    let exported = tmp.path().join("backup.json");
    assert!(exported.exists());

    run_ok(tmp.path(), &["rm", "a"]);
    let out = run_ok(tmp.path(), &["import", exported.to_str().unwrap()]);
    assert!(out.starts_with("imported 4 tasks"));
    assert!(run_ok(tmp.path(), &["show"]).contains("Groceries"));
}

#[test]
fn test_export_default_name() {
    let tmp = TempDir::new().unwrap();
    write_document(tmp.path());
    let out = run_ok(tmp.path(), &["export"]);
    let name = out.trim();
    assert!(name.starts_with("task-tree-"));
    assert!(name.ends_with(".json"));
    assert!(tmp.path().join(name).exists());
}

#[test]
fn test_import_invalid_keeps_document() {
    let tmp = TempDir::new().unwrap();
    write_document(tmp.path());
    let before = fs::read_to_string(data_file(tmp.path())).unwrap();

    let bad = tmp.path().join("bad.json");
    fs::write(&bad, r#"{"root":{"id":"root","children":[{"id":"x"},{"id":"x"}]}}"#).unwrap();
    let err = run_err(tmp.path(), &["import", bad.to_str().unwrap()]);
    assert!(err.contains("duplicate task ids"));
    assert_eq!(fs::read_to_string(data_file(tmp.path())).unwrap(), before);
}

#[test]
fn test_bad_config_is_reported() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("config.toml"), "[storage\n").unwrap();
    let err = run_err(tmp.path(), &["show"]);
    assert!(err.starts_with("error: could not parse"));
}
