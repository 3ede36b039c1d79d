//! Project manifest (`boxup.json`)
//!
//! The manifest lists the packages a project declares. Entries are either
//! `name@version` or a bare legacy `name`, which an update pins to
//! `name@latest`. Keys other than `packages` are carried through untouched.

use crate::error::{FileRole, ManifestError, Result};
use crate::persist;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// File name of a project manifest
pub const MANIFEST_FILE_NAME: &str = "boxup.json";

/// Version used when a legacy package is pinned
pub const LATEST_VERSION: &str = "latest";

/// A package reference as written in a manifest or on the command line
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageRef {
    pub name: String,
    pub version: Option<String>,
}

impl PackageRef {
    /// Parse `name` or `name@version`
    ///
    /// A leading `@` belongs to the name, so `@scope/tool@1.2` has the name
    /// `@scope/tool`.
    pub fn parse(raw: &str) -> Self {
        match raw.rsplit_once('@') {
            Some((name, version)) if !name.is_empty() && !version.is_empty() => Self {
                name: name.to_string(),
                version: Some(version.to_string()),
            },
            _ => Self {
                name: raw.to_string(),
                version: None,
            },
        }
    }

    /// Whether the package was declared without a version
    pub fn is_legacy(&self) -> bool {
        self.version.is_none()
    }

    /// Key used for this package in a lockfile
    pub fn lock_key(&self) -> String {
        format!(
            "{}@{}",
            self.name,
            self.version.as_deref().unwrap_or(LATEST_VERSION)
        )
    }
}

impl fmt::Display for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}@{}", self.name, version),
            None => write!(f, "{}", self.name),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ManifestData {
    #[serde(default)]
    packages: Vec<String>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

/// A loaded project manifest
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    data: ManifestData,
    dirty: bool,
}

impl Manifest {
    /// Load the manifest in `dir`
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_FILE_NAME);
        let contents = persist::read_required(&path, FileRole::Manifest)?;
        let data = serde_json::from_str(&contents).map_err(|source| ManifestError::Parse {
            path: path.clone(),
            source,
        })?;

        Ok(Self {
            path,
            data,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Declared packages in manifest order
    pub fn packages(&self) -> Vec<PackageRef> {
        self.data
            .packages
            .iter()
            .map(|raw| PackageRef::parse(raw))
            .collect()
    }

    /// Find the declared package with the given name, ignoring versions
    pub fn find(&self, name: &str) -> Option<PackageRef> {
        self.packages().into_iter().find(|p| p.name == name)
    }

    /// Rewrite a legacy entry to `name@latest` and return the pinned reference
    pub fn pin_latest(&mut self, name: &str) -> PackageRef {
        let pinned = PackageRef {
            name: name.to_string(),
            version: Some(LATEST_VERSION.to_string()),
        };

        for entry in self.data.packages.iter_mut() {
            if entry == name {
                *entry = pinned.to_string();
                self.dirty = true;
            }
        }

        pinned
    }

    /// Whether the manifest has unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Persist the manifest if it changed
    pub fn save(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        let mut contents =
            serde_json::to_string_pretty(&self.data).map_err(|source| ManifestError::Serialize {
                path: self.path.clone(),
                source,
            })?;
        contents.push('\n');
        persist::write_atomic(&self.path, FileRole::Manifest, &contents)?;
        self.dirty = false;
        Ok(())
    }
}
