//! End-to-end tests for the CLI commands.
//!
//! Each test:
//! 1. Creates a temp directory
//! 2. Indexes the fixture submissions into it
//! 3. Runs the specific command
//! 4. Asserts exit code + JSON output

// Allow deprecated cargo_bin usage until assert_cmd updates API
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

/// Manifest directory (project root).
fn manifest_dir() -> &'static str {
    env!("CARGO_MANIFEST_DIR")
}

fn fixture(name: &str) -> String {
    format!("{}/fixtures/submissions/{name}", manifest_dir())
}

/// Build a command pointing at the tempdir.
fn kbase(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("kbase").unwrap();
    cmd.current_dir(dir.path()).env("RUST_LOG", "warn");
    cmd
}

/// Run a command expected to succeed and parse its stdout.
fn json_of(cmd: &mut Command) -> Value {
    let out = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&out).expect("stdout is JSON")
}

/// Temp directory with the batch fixture indexed.
fn setup_indexed() -> TempDir {
    let dir = tempfile::tempdir().expect("create tempdir");
    kbase(&dir)
        .arg("index")
        .arg(fixture("batch.json"))
        .assert()
        .success();
    dir
}

// ─── index ──────────────────────────────────────────────────────

#[test]
fn index_batch_reports_counts_and_failures() {
    let dir = tempfile::tempdir().unwrap();
    let v = json_of(kbase(&dir).arg("index").arg(fixture("batch.json")));
    assert_eq!(v["status"], "success");
    assert_eq!(v["success_count"], 3);
    assert_eq!(v["failed_count"], 1);
    assert_eq!(v["failures"][0]["index"], 3);
    assert_eq!(v["failures"][0]["path"], "/intake-api/Services/Broken.cs");
    assert_eq!(v["message"], "Indexed 3 files, 1 failed");
    assert!(dir.path().join(".kb/knowledge.db").exists());
}

#[test]
fn index_single_yaml_record() {
    let dir = tempfile::tempdir().unwrap();
    let v = json_of(kbase(&dir).arg("index").arg(fixture("single.yaml")));
    assert_eq!(v["status"], "success");
    assert_eq!(v["path"], "/web-portal/src/Login.tsx");
    assert_eq!(v["message"], "Successfully indexed /web-portal/src/Login.tsx");
}

#[test]
fn index_from_stdin() {
    let dir = tempfile::tempdir().unwrap();
    let v = json_of(
        kbase(&dir)
            .args(["index", "-", "--format", "json"])
            .write_stdin(
                r#"{"path":"/ops/deploy.sh","repo":"ops","file_type":"bash","technology":"devops","summary":"Deploys the stack","content_hash":"1"}"#,
            ),
    );
    assert_eq!(v["path"], "/ops/deploy.sh");
}

#[test]
fn index_invalid_single_record_fails_with_field() {
    let dir = tempfile::tempdir().unwrap();
    kbase(&dir)
        .args(["index", "-", "--format", "json"])
        .write_stdin(r#"{"path":"/x.py","repo":"r","file_type":"python","technology":"cloud","summary":"s","content_hash":"1"}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"field\":\"technology\""))
        .stderr(predicate::str::contains("\"kind\":\"validation\""));
}

#[test]
fn index_list_isolates_wrong_typed_record() {
    let dir = tempfile::tempdir().unwrap();
    let v = json_of(
        kbase(&dir)
            .args(["index", "-", "--format", "json"])
            .write_stdin(
                r#"[
                  {"path":"/a.sh","repo":"ops","file_type":"bash","technology":"devops","summary":"a","content_hash":"1"},
                  {"path":"/b.sh","repo":"ops","file_type":"bash","technology":"devops","summary":"b","content_hash":"1","tags":"oops"},
                  {"path":"/c.sh","repo":"ops","file_type":"bash","technology":"devops","summary":"c","content_hash":"1"}
                ]"#,
            ),
    );
    assert_eq!(v["success_count"], 2);
    assert_eq!(v["failed_count"], 1);
    assert_eq!(v["failures"][0]["index"], 1);
    assert_eq!(v["failures"][0]["path"], "/b.sh");
}

#[test]
fn init_creates_store_and_config() {
    let dir = tempfile::tempdir().unwrap();
    let v = json_of(kbase(&dir).arg("init"));
    assert_eq!(v["status"], "success");
    assert_eq!(v["created_config"], true);
    assert_eq!(v["store_existed"], false);
    assert!(dir.path().join(".kb/config.toml").exists());
    assert!(dir.path().join(".kb/knowledge.db").exists());

    let v = json_of(kbase(&dir).arg("init"));
    assert_eq!(v["created_config"], false);
    assert_eq!(v["store_existed"], true);
}

#[test]
fn reindex_replaces_record() {
    let dir = setup_indexed();
    kbase(&dir)
        .args(["index", "-", "--format", "yaml"])
        .write_stdin(
            "path: /intake-api/Services/AuthService.cs\nrepo: intake-api\nfile_type: csharp\n\
             technology: backend\nsummary: Rewritten auth\ncontent_hash: beef\n",
        )
        .assert()
        .success();
    let v = json_of(kbase(&dir).args(["context", "/intake-api/Services/AuthService.cs"]));
    assert_eq!(v["file"]["summary"], "Rewritten auth");
    assert_eq!(v["file"]["tags"], serde_json::json!([]));

    let stats = json_of(kbase(&dir).arg("stats"));
    assert_eq!(stats["stats"]["total_files"], 3);
}

// ─── search ─────────────────────────────────────────────────────

#[test]
fn search_matches_case_insensitively() {
    let dir = setup_indexed();
    let v = json_of(kbase(&dir).args(["search", "STORAGE"]));
    assert_eq!(v["status"], "success");
    assert_eq!(v["count"], 2);
}

#[test]
fn search_applies_filters() {
    let dir = setup_indexed();
    let v = json_of(kbase(&dir).args(["search", "", "--technology", "backend"]));
    assert_eq!(v["count"], 1);
    assert_eq!(v["results"][0]["repo"], "intake-api");

    let v = json_of(kbase(&dir).args(["search", "", "--tag", "jwt", "--tag", "storage"]));
    assert_eq!(v["count"], 2);

    let v = json_of(kbase(&dir).args(["search", "azure", "--limit", "1"]));
    assert_eq!(v["count"], 1);
}

#[test]
fn search_rejects_unknown_filter() {
    let dir = setup_indexed();
    kbase(&dir)
        .args(["search", "x", "--file-type", "cobol"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"operation\":\"search_knowledge\""));
}

// ─── context / related / by-type ────────────────────────────────

#[test]
fn context_found_and_not_found() {
    let dir = setup_indexed();
    let v = json_of(kbase(&dir).args(["context", "/azure-iac/modules/storage/main.tf"]));
    assert_eq!(v["status"], "success");
    assert_eq!(v["file"]["metadata"]["lines"], 84);
    assert_eq!(v["file"]["technology"], "infrastructure-as-code");

    let v = json_of(kbase(&dir).args(["context", "/nowhere.tf"]));
    assert_eq!(v["status"], "not_found");
    assert_eq!(v["message"], "File not found: /nowhere.tf");
}

#[test]
fn related_stays_in_repo_and_excludes_source() {
    let dir = setup_indexed();
    let v = json_of(kbase(&dir).args(["related", "/azure-iac/modules/storage/main.tf"]));
    assert_eq!(v["count"], 1);
    assert_eq!(
        v["related_files"][0]["path"],
        "/azure-iac/modules/storage/variables.tf"
    );
}

#[test]
fn by_type_lists_one_type() {
    let dir = setup_indexed();
    let v = json_of(kbase(&dir).args(["by-type", "terraform", "--repo", "azure-iac"]));
    assert_eq!(v["file_type"], "terraform");
    assert_eq!(v["count"], 2);

    let v = json_of(kbase(&dir).args(["by-type", "bicep"]));
    assert_eq!(v["count"], 0);
}

// ─── stats / deps / health ──────────────────────────────────────

#[test]
fn stats_groupings_sum_to_total() {
    let dir = setup_indexed();
    let v = json_of(kbase(&dir).arg("stats"));
    let stats = &v["stats"];
    assert_eq!(stats["total_files"], 3);
    assert_eq!(stats["files_by_type"]["terraform"], 2);
    assert_eq!(stats["files_by_repo"]["intake-api"], 1);
    assert_eq!(stats["total_dependencies"], 2);
    assert!(stats["last_indexed"].is_string());
}

#[test]
fn deps_follow_stored_edges() {
    let dir = setup_indexed();
    let v = json_of(kbase(&dir).args(["deps", "/azure-iac/modules/storage/main.tf"]));
    let graph = &v["dependency_graph"];
    assert_eq!(graph["root"], "/azure-iac/modules/storage/main.tf");
    assert_eq!(
        graph["dependencies"],
        serde_json::json!(["/azure-iac/modules/storage/variables.tf"])
    );
    assert_eq!(graph["dependents"], serde_json::json!([]));
    assert_eq!(graph["depth"], 1);
    assert_eq!(graph["upstream"][0]["indexed"], true);
}

#[test]
fn deps_unknown_root_is_an_error() {
    let dir = setup_indexed();
    kbase(&dir)
        .args(["deps", "/nowhere.tf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"kind\":\"not_found\""))
        .stderr(predicate::str::contains("File not found: /nowhere.tf"));
}

#[test]
fn health_reports_connected_store() {
    let dir = setup_indexed();
    let v = json_of(kbase(&dir).arg("health"));
    assert_eq!(v["status"], "healthy");
    assert_eq!(v["database"], "connected");
    assert_eq!(v["total_files"], 3);
}

#[test]
fn db_override_uses_given_file() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("elsewhere/kb.sqlite");
    kbase(&dir)
        .arg("--db")
        .arg(&db)
        .arg("index")
        .arg(fixture("single.yaml"))
        .assert()
        .success();
    assert!(db.exists());
    assert!(!dir.path().join(".kb/knowledge.db").exists());
}

#[test]
fn help_lists_commands() {
    let dir = tempfile::tempdir().unwrap();
    kbase(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("deps"))
        .stdout(predicate::str::contains("mcp"));
}
