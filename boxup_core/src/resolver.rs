//! Package resolution
//!
//! Resolvers turn a declared package into a lock entry. The orchestrator never
//! talks to a resolver directly; projects consult one during `update`.

use crate::error::{FileRole, ResolveError, Result};
use crate::lockfile::LockedPackage;
use crate::manifest::PackageRef;
use crate::persist;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

/// Trait for package resolvers
#[async_trait]
pub trait PackageResolver: Send + Sync {
    /// Resolve a package to its newest known lock entry
    ///
    /// Returns `Ok(None)` when the resolver has nothing to offer, in which
    /// case the caller keeps whatever is already locked.
    async fn resolve(&self, package: &PackageRef) -> Result<Option<LockedPackage>>;
}

/// Resolver that never proposes anything new
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineResolver;

#[async_trait]
impl PackageResolver for OfflineResolver {
    async fn resolve(&self, package: &PackageRef) -> Result<Option<LockedPackage>> {
        log::debug!("Offline resolver has no candidate for {package}");
        Ok(None)
    }
}

/// Resolver backed by a JSON index of `name@version` to lock entries
#[derive(Debug, Default, Clone)]
pub struct IndexResolver {
    entries: HashMap<String, LockedPackage>,
}

impl IndexResolver {
    /// Load an index file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = persist::read_required(path, FileRole::Index)?;
        let entries: HashMap<String, LockedPackage> =
            serde_json::from_str(&contents).map_err(|source| ResolveError::IndexParse {
                path: path.to_path_buf(),
                source,
            })?;

        for key in entries.keys() {
            if PackageRef::parse(key).is_legacy() {
                return Err(ResolveError::InvalidIndexKey { key: key.clone() }.into());
            }
        }

        log::debug!("Loaded {} index entries from {}", entries.len(), path.display());
        Ok(Self { entries })
    }

    /// Build a resolver from in-memory entries
    pub fn from_entries(entries: HashMap<String, LockedPackage>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl PackageResolver for IndexResolver {
    async fn resolve(&self, package: &PackageRef) -> Result<Option<LockedPackage>> {
        Ok(self.entries.get(&package.lock_key()).cloned())
    }
}
