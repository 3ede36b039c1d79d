//! Builder for temporary directory trees of boxup projects

use boxup_core::{LOCKFILE_NAME, MANIFEST_FILE_NAME};
use serde_json::{Map, Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Builder for a temporary tree of projects
///
/// Each call writes straight to disk, so the tree can be inspected at any
/// point while it is being built.
pub struct ProjectTreeBuilder {
    root: TempDir,
}

impl Default for ProjectTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectTreeBuilder {
    /// Create a builder over a fresh temporary directory
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Absolute path of a project directory inside the tree
    pub fn project_dir(&self, relative: &str) -> PathBuf {
        if relative.is_empty() || relative == "." {
            self.root.path().to_path_buf()
        } else {
            self.root.path().join(relative)
        }
    }

    /// Write a `boxup.json` declaring `packages`
    pub fn project(self, relative: &str, packages: &[&str]) -> Self {
        let dir = self.project_dir(relative);
        fs::create_dir_all(&dir).expect("Failed to create project dir");
        let manifest = json!({ "packages": packages });
        write_json(&dir.join(MANIFEST_FILE_NAME), &manifest);
        self
    }

    /// Lock `key` at `version` without any system outputs
    pub fn locked(self, relative: &str, key: &str, version: &str, last_modified: &str) -> Self {
        let entry = json!({ "last_modified": last_modified, "version": version });
        self.lock_entry(relative, key, entry)
    }

    /// Lock `key` with outputs for `system` but no recorded store path
    pub fn locked_with_outputs(
        self,
        relative: &str,
        key: &str,
        version: &str,
        system: &str,
        outputs: &[(&str, &str)],
    ) -> Self {
        let outputs: Vec<Value> = outputs
            .iter()
            .map(|(name, path)| json!({ "name": name, "path": path }))
            .collect();
        let entry = json!({
            "last_modified": "2024-01-01T00:00:00Z",
            "version": version,
            "systems": { system: { "outputs": outputs } },
        });
        self.lock_entry(relative, key, entry)
    }

    /// Write an arbitrary file relative to the tree root
    pub fn file(self, relative: &str, contents: &str) -> Self {
        let path = self.root.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(path, contents).expect("Failed to write file");
        self
    }

    /// Finish building and hand over the temporary directory
    pub fn build(self) -> TempDir {
        self.root
    }

    fn lock_entry(self, relative: &str, key: &str, entry: Value) -> Self {
        let dir = self.project_dir(relative);
        fs::create_dir_all(&dir).expect("Failed to create project dir");
        let path = dir.join(LOCKFILE_NAME);

        let mut lockfile = if path.exists() {
            read_json(&path)
        } else {
            json!({ "lockfile_version": "1", "packages": {} })
        };
        if let Some(packages) = lockfile
            .get_mut("packages")
            .and_then(Value::as_object_mut)
        {
            packages.insert(key.to_string(), entry);
        }
        write_json(&path, &lockfile);
        self
    }
}

/// Read a project's lockfile as raw JSON
pub fn read_lockfile(dir: &Path) -> Value {
    read_json(&dir.join(LOCKFILE_NAME))
}

/// Read a project's manifest package list
pub fn read_manifest_packages(dir: &Path) -> Vec<String> {
    read_json(&dir.join(MANIFEST_FILE_NAME))
        .get("packages")
        .and_then(Value::as_array)
        .map(|packages| {
            packages
                .iter()
                .filter_map(|p| p.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Locked entry for `key`, if present
pub fn locked_entry(dir: &Path, key: &str) -> Option<Map<String, Value>> {
    read_lockfile(dir)
        .get("packages")
        .and_then(|p| p.get(key))
        .and_then(Value::as_object)
        .cloned()
}

fn read_json(path: &Path) -> Value {
    let contents = fs::read_to_string(path).expect("Failed to read JSON file");
    serde_json::from_str(&contents).expect("Failed to parse JSON file")
}

fn write_json(path: &Path, value: &Value) {
    let contents = serde_json::to_string_pretty(value).expect("Failed to serialize JSON");
    fs::write(path, contents).expect("Failed to write JSON file");
}
