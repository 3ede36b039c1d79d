use assert_cmd::Command;
use boxup_test_utils::builders::{ProjectTreeBuilder, locked_entry, read_manifest_packages};
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// `boxup` running in `dir` with an isolated, empty configuration
fn boxup(dir: &Path, config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("boxup").unwrap();
    cmd.current_dir(dir)
        .env("XDG_CONFIG_HOME", config_home.path())
        .env("HOME", config_home.path())
        .env("NO_COLOR", "1")
        .env_remove("BOXUP_PROJECT__DIR")
        .env_remove("BOXUP_PROJECT__ENVIRONMENT")
        .env_remove("BOXUP_RESOLVER__INDEX_PATH");
    cmd
}

fn write_index(dir: &TempDir, entries: serde_json::Value) -> std::path::PathBuf {
    let path = dir.path().join("index.json");
    fs::write(&path, entries.to_string()).unwrap();
    path
}

#[test]
fn test_version() {
    let mut cmd = Command::cargo_bin("boxup").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_packages_with_sync_is_usage_error() {
    let tree = ProjectTreeBuilder::new().project("", &["go@1.22"]);
    let config_home = TempDir::new().unwrap();

    boxup(tree.path(), &config_home)
        .args(["update", "go", "--sync-lock"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "cannot specify both a package and --sync-lock",
        ));

    // Nothing was touched
    assert!(!tree.path().join("boxup.lock").exists());
}

#[test]
fn test_invalid_environment_is_usage_error() {
    let tree = ProjectTreeBuilder::new().project("", &["go@1.22"]);
    let config_home = TempDir::new().unwrap();

    boxup(tree.path(), &config_home)
        .args(["update", "-e", "staging"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid environment 'staging'"));
}

#[test]
fn test_missing_project_is_filesystem_error() {
    let empty = TempDir::new().unwrap();
    let config_home = TempDir::new().unwrap();

    boxup(empty.path(), &config_home)
        .arg("update")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("No boxup.json found"));
}

#[test]
fn test_undeclared_package_fails() {
    let tree = ProjectTreeBuilder::new().project("api", &["go@1.22"]).locked(
        "api",
        "go@1.22",
        "1.22.3",
        "2024-05-01T00:00:00Z",
    );
    let config_home = TempDir::new().unwrap();

    boxup(tree.path(), &config_home)
        .args(["update", "python", "-c", "api"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("'python' is not declared"));
}

#[test]
fn test_update_pins_legacy_package_from_index() {
    let tree = ProjectTreeBuilder::new().project("", &["go"]);
    let config_home = TempDir::new().unwrap();
    let index = write_index(
        &config_home,
        serde_json::json!({
            "go@latest": { "last_modified": "2024-05-01T00:00:00Z", "version": "1.22.3" }
        }),
    );

    boxup(tree.path(), &config_home)
        .arg("update")
        .env("BOXUP_RESOLVER__INDEX_PATH", &index)
        .assert()
        .success();

    assert_eq!(read_manifest_packages(tree.path()), vec!["go@latest"]);
    let entry = locked_entry(tree.path(), "go@latest").unwrap();
    assert_eq!(entry["version"], "1.22.3");
}

#[test]
fn test_unresolvable_package_suggests_index() {
    let tree = ProjectTreeBuilder::new().project("", &["go@1.22"]);
    let config_home = TempDir::new().unwrap();

    boxup(tree.path(), &config_home)
        .arg("update")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Could not resolve 'go@1.22'"))
        .stderr(predicate::str::contains("resolver.index_path"));
}

#[test]
fn test_all_projects_skips_undeclared_and_syncs() {
    let tree = ProjectTreeBuilder::new()
        .project("api", &["go@latest"])
        .locked("api", "go@latest", "1.21.0", "2024-01-01T00:00:00Z")
        .project("web", &["python@3.12"])
        .locked("web", "python@3.12", "3.12.1", "2024-01-01T00:00:00Z");
    let config_home = TempDir::new().unwrap();
    let index = write_index(
        &config_home,
        serde_json::json!({
            "go@latest": { "last_modified": "2024-05-01T00:00:00Z", "version": "1.22.3" }
        }),
    );

    boxup(tree.path(), &config_home)
        .args(["update", "go", "--all-projects"])
        .env("BOXUP_RESOLVER__INDEX_PATH", &index)
        .assert()
        .success();

    let api = tree.project_dir("api");
    let web = tree.project_dir("web");
    assert_eq!(locked_entry(&api, "go@latest").unwrap()["version"], "1.22.3");
    assert_eq!(locked_entry(&web, "python@3.12").unwrap()["version"], "3.12.1");
    assert!(locked_entry(&web, "go@latest").is_none());
}

#[test]
fn test_sync_lock_aligns_lockfiles() {
    let tree = ProjectTreeBuilder::new()
        .project("api", &["go@latest"])
        .locked("api", "go@latest", "1.21.0", "2024-01-01T00:00:00Z")
        .project("web", &["go@latest"])
        .locked("web", "go@latest", "1.22.3", "2024-05-01T00:00:00Z");
    let config_home = TempDir::new().unwrap();

    boxup(tree.path(), &config_home)
        .args(["update", "--sync-lock"])
        .assert()
        .success();

    let api = tree.project_dir("api");
    assert_eq!(locked_entry(&api, "go@latest").unwrap()["version"], "1.22.3");
}

#[test]
fn test_all_projects_reports_progress() {
    let tree = ProjectTreeBuilder::new()
        .project("api", &["go@latest"])
        .locked("api", "go@latest", "1.22.3", "2024-05-01T00:00:00Z")
        .project("web", &["go@latest"])
        .locked("web", "go@latest", "1.22.3", "2024-05-01T00:00:00Z");
    let config_home = TempDir::new().unwrap();

    boxup(tree.path(), &config_home)
        .args(["update", "--all-projects"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Finding projects under"))
        .stderr(predicate::str::contains("Found 2 projects"))
        .stderr(predicate::str::contains(format!(
            "Updating project at {}",
            tree.project_dir("api").display()
        )))
        .stderr(predicate::str::contains(format!(
            "Updating project at {}",
            tree.project_dir("web").display()
        )))
        .stderr(predicate::str::contains("\x1b[").not());
}

#[test]
fn test_invalid_environment_does_not_block_sync_lock() {
    let tree = ProjectTreeBuilder::new()
        .project("api", &["go@latest"])
        .locked("api", "go@latest", "1.21.0", "2024-01-01T00:00:00Z")
        .project("web", &["go@latest"])
        .locked("web", "go@latest", "1.22.3", "2024-05-01T00:00:00Z");
    let config_home = TempDir::new().unwrap();

    boxup(tree.path(), &config_home)
        .args(["update", "--sync-lock"])
        .env("BOXUP_PROJECT__ENVIRONMENT", "staging")
        .assert()
        .success();

    let api = tree.project_dir("api");
    assert_eq!(locked_entry(&api, "go@latest").unwrap()["version"], "1.22.3");
}

#[test]
fn test_paths_in_lockfile_backfills_every_project() {
    let tree = ProjectTreeBuilder::new()
        .project("api", &["go@latest"])
        .locked_with_outputs(
            "api",
            "go@latest",
            "1.22.3",
            "x86_64-linux",
            &[("out", "/store/abc-go-1.22.3")],
        )
        .project("web", &["python@3.12"])
        .locked_with_outputs(
            "web",
            "python@3.12",
            "3.12.3",
            "x86_64-linux",
            &[("dev", "/store/def-python-dev"), ("out", "/store/def-python")],
        );
    let config_home = TempDir::new().unwrap();

    boxup(tree.path(), &config_home)
        .args(["update", "--paths-in-lockfile"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Found 2 projects"))
        .stderr(predicate::str::contains("Processing project at"));

    let go = locked_entry(&tree.project_dir("api"), "go@latest").unwrap();
    assert_eq!(
        go["systems"]["x86_64-linux"]["store_path"],
        "/store/abc-go-1.22.3"
    );
    let python = locked_entry(&tree.project_dir("web"), "python@3.12").unwrap();
    assert_eq!(
        python["systems"]["x86_64-linux"]["store_path"],
        "/store/def-python"
    );
}

#[test]
fn test_paths_in_lockfile_reports_missing_outputs() {
    let tree = ProjectTreeBuilder::new()
        .project("api", &["go@latest"])
        .locked_with_outputs("api", "go@latest", "1.22.3", "x86_64-linux", &[]);
    let config_home = TempDir::new().unwrap();

    boxup(tree.path(), &config_home)
        .args(["update", "--paths-in-lockfile"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Failed to backfill store paths"))
        .stderr(predicate::str::contains(
            "No outputs recorded for go@latest on x86_64-linux",
        ));
}

#[test]
fn test_config_set_and_get() {
    let dir = TempDir::new().unwrap();
    let config_home = TempDir::new().unwrap();

    boxup(dir.path(), &config_home)
        .args(["config", "set", "project.environment", "prod"])
        .assert()
        .success();

    boxup(dir.path(), &config_home)
        .args(["config", "get", "project.environment"])
        .assert()
        .success()
        .stdout(predicate::str::diff("prod\n"));
}

#[test]
fn test_config_unknown_key_suggests_closest() {
    let dir = TempDir::new().unwrap();
    let config_home = TempDir::new().unwrap();

    boxup(dir.path(), &config_home)
        .args(["config", "get", "projct.dir"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Did you mean 'project.dir'?"));
}

#[test]
fn test_completions() {
    let mut cmd = Command::cargo_bin("boxup").unwrap();
    cmd.args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("boxup"));
}
