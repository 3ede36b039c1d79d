//! Project lockfile (`boxup.lock`)
//!
//! A lockfile records, per package key, the resolved version and the store
//! outputs for each system. It is mutated in memory and only reaches disk
//! through [`LockfileHandle::save`].

use crate::error::{FileRole, LockfileError, Result};
use crate::persist;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File name of a project lockfile
pub const LOCKFILE_NAME: &str = "boxup.lock";

/// Lockfile format version written by this crate
pub const LOCKFILE_VERSION: &str = "1";

/// Name of the conventional default output
const DEFAULT_OUTPUT: &str = "out";

/// One build output of a package on a system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageOutput {
    pub name: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub default: bool,
}

/// Per-system lock information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    #[serde(default)]
    pub outputs: Vec<PackageOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<String>,
}

impl SystemInfo {
    /// Store path derived from the outputs
    ///
    /// Prefers the output flagged as default, then the one named `out`, then
    /// whichever output is listed first.
    pub fn derived_store_path(&self) -> Option<&str> {
        self.outputs
            .iter()
            .find(|o| o.default)
            .or_else(|| self.outputs.iter().find(|o| o.name == DEFAULT_OUTPUT))
            .or_else(|| self.outputs.first())
            .map(|o| o.path.as_str())
    }
}

/// A locked package entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedPackage {
    pub last_modified: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<String>,
    pub version: String,
    #[serde(default)]
    pub systems: BTreeMap<String, SystemInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct LockfileData {
    lockfile_version: String,
    #[serde(default)]
    packages: BTreeMap<String, LockedPackage>,
}

impl Default for LockfileData {
    fn default() -> Self {
        Self {
            lockfile_version: LOCKFILE_VERSION.to_string(),
            packages: BTreeMap::new(),
        }
    }
}

/// Operations the update orchestrator performs on a project's lockfile
pub trait LockfileHandle: Send {
    /// Fill in `store_path` for every system entry that lacks one
    fn backfill_store_paths(&mut self) -> Result<()>;

    /// Persist the lockfile
    fn save(&self) -> Result<()>;
}

/// A lockfile loaded from disk
#[derive(Debug, Clone)]
pub struct Lockfile {
    path: PathBuf,
    data: LockfileData,
}

impl Lockfile {
    /// Load the lockfile in `dir`, or start an empty one if none exists
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(LOCKFILE_NAME);
        let data = match persist::read_optional(&path, FileRole::Lockfile)? {
            Some(contents) => {
                let data: LockfileData =
                    serde_json::from_str(&contents).map_err(|source| LockfileError::Parse {
                        path: path.clone(),
                        source,
                    })?;
                if data.lockfile_version != LOCKFILE_VERSION {
                    return Err(LockfileError::UnsupportedVersion {
                        path,
                        version: data.lockfile_version,
                    }
                    .into());
                }
                data
            }
            None => {
                log::debug!("No lockfile at {}, starting empty", path.display());
                LockfileData::default()
            }
        };

        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&LockedPackage> {
        self.data.packages.get(key)
    }

    /// Locked packages keyed by `name@version`
    pub fn packages(&self) -> &BTreeMap<String, LockedPackage> {
        &self.data.packages
    }

    /// Insert or replace an entry, returning whether anything changed
    pub fn upsert(&mut self, key: &str, package: LockedPackage) -> bool {
        if self.data.packages.get(key) == Some(&package) {
            return false;
        }
        self.data.packages.insert(key.to_string(), package);
        true
    }

    /// Drop entries whose key is not in `keep`, returning the removed keys
    pub fn retain_keys(&mut self, keep: &[String]) -> Vec<String> {
        let removed: Vec<String> = self
            .data
            .packages
            .keys()
            .filter(|k| !keep.contains(k))
            .cloned()
            .collect();
        for key in &removed {
            self.data.packages.remove(key);
        }
        removed
    }

    /// Number of system entries without a store path
    pub fn missing_store_paths(&self) -> usize {
        self.data
            .packages
            .values()
            .flat_map(|p| p.systems.values())
            .filter(|s| s.store_path.is_none())
            .count()
    }
}

impl LockfileHandle for Lockfile {
    fn backfill_store_paths(&mut self) -> Result<()> {
        for (key, package) in self.data.packages.iter_mut() {
            for (system, info) in package.systems.iter_mut() {
                if info.store_path.is_some() {
                    continue;
                }
                let store_path = info
                    .derived_store_path()
                    .ok_or_else(|| LockfileError::MissingOutputs {
                        package: key.clone(),
                        system: system.clone(),
                    })?
                    .to_string();
                log::debug!("Backfilled store path for {key} on {system}: {store_path}");
                info.store_path = Some(store_path);
            }
        }
        Ok(())
    }

    fn save(&self) -> Result<()> {
        let mut contents =
            serde_json::to_string_pretty(&self.data).map_err(|source| LockfileError::Serialize {
                path: self.path.clone(),
                source,
            })?;
        contents.push('\n');
        persist::write_atomic(&self.path, FileRole::Lockfile, &contents)?;
        Ok(())
    }
}
