//! Workspace collaborator: opening, discovering and syncing projects
//!
//! The update orchestrator only ever sees the [`Workspace`] trait. The
//! filesystem implementation wires discovery, projects and lockfile sync
//! together for real directory trees.

use crate::discovery::{DiscoveryOptions, discover_projects};
use crate::error::Result;
use crate::lockfile::{Lockfile, LockfileHandle};
use crate::project::{FsProject, Project, ProjectOptions};
use crate::resolver::{OfflineResolver, PackageResolver};
use crate::sync::reconcile;
use async_trait::async_trait;
use log::{debug, info};
use std::path::Path;
use std::sync::Arc;

/// Source of projects for the update orchestrator
#[async_trait]
pub trait Workspace: Send + Sync {
    type Project: Project;

    /// Open the single project described by `options`
    async fn open(&self, options: &ProjectOptions) -> Result<Self::Project>;

    /// Open every project below `root`, in discovery order
    async fn discover(&self, root: &Path) -> Result<Vec<Self::Project>>;

    /// Make every lockfile below `root` agree on the newest entries
    ///
    /// An empty `packages` slice syncs every locked package.
    async fn sync_lockfiles(&self, root: &Path, packages: &[String]) -> Result<()>;
}

/// Workspace backed by the local filesystem
#[derive(Clone)]
pub struct FsWorkspace {
    discovery: DiscoveryOptions,
    resolver: Arc<dyn PackageResolver>,
}

impl Default for FsWorkspace {
    fn default() -> Self {
        Self::new(DiscoveryOptions::default(), Arc::new(OfflineResolver))
    }
}

impl FsWorkspace {
    pub fn new(discovery: DiscoveryOptions, resolver: Arc<dyn PackageResolver>) -> Self {
        Self {
            discovery,
            resolver,
        }
    }

    pub fn discovery_options(&self) -> &DiscoveryOptions {
        &self.discovery
    }
}

#[async_trait]
impl Workspace for FsWorkspace {
    type Project = FsProject;

    async fn open(&self, options: &ProjectOptions) -> Result<FsProject> {
        FsProject::open(options, self.resolver.clone())
    }

    async fn discover(&self, root: &Path) -> Result<Vec<FsProject>> {
        let dirs = discover_projects(root, &self.discovery)?;
        dirs.iter()
            .map(|dir| FsProject::open(&ProjectOptions::new(dir), self.resolver.clone()))
            .collect()
    }

    async fn sync_lockfiles(&self, root: &Path, packages: &[String]) -> Result<()> {
        let dirs = discover_projects(root, &self.discovery)?;
        let mut lockfiles = dirs
            .iter()
            .map(|dir| Lockfile::load(dir))
            .collect::<Result<Vec<_>>>()?;

        let report = reconcile(&mut lockfiles, packages);
        for index in &report.changed {
            let lockfile = &lockfiles[*index];
            lockfile.save()?;
            debug!("Saved {}", lockfile.path().display());
        }

        info!(
            "Synced {} entr{} across {} of {} lockfile(s)",
            report.entries_updated,
            if report.entries_updated == 1 { "y" } else { "ies" },
            report.changed.len(),
            report.scanned
        );
        Ok(())
    }
}
