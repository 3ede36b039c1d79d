//! Projects and their update operation
//!
//! A project is a directory holding a `boxup.json` manifest and, once
//! anything has been resolved, a `boxup.lock` lockfile.

use crate::error::{ProjectError, Result};
use crate::lockfile::{Lockfile, LockfileHandle};
use crate::manifest::{MANIFEST_FILE_NAME, Manifest, PackageRef};
use crate::resolver::PackageResolver;
use async_trait::async_trait;
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Environment used when none is configured
pub const DEFAULT_ENVIRONMENT: &str = "dev";

/// Environments a project can be opened in
pub const SUPPORTED_ENVIRONMENTS: &[&str] = &["dev", "prod"];

/// Options identifying a single project to open
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectOptions {
    pub dir: PathBuf,
    pub environment: String,
}

impl ProjectOptions {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            environment: DEFAULT_ENVIRONMENT.to_string(),
        }
    }

    pub fn with_environment(mut self, environment: &str) -> Self {
        self.environment = environment.to_string();
        self
    }

    /// Reject environments the project layer does not know about
    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_ENVIRONMENTS.contains(&self.environment.as_str()) {
            return Err(ProjectError::InvalidEnvironment {
                environment: self.environment.clone(),
            }
            .into());
        }
        Ok(())
    }
}

/// Options for a project update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateOpts {
    /// Packages to update; empty means every declared package
    pub packages: Vec<String>,
    /// Skip requested packages the project does not declare instead of failing
    pub ignore_missing_packages: bool,
}

/// A project the update orchestrator can act on
#[async_trait]
pub trait Project: Send {
    type Lockfile: LockfileHandle;

    /// Directory the project is rooted at
    fn root_dir(&self) -> &Path;

    /// Refresh package versions and persist the result
    async fn update(&mut self, opts: &UpdateOpts) -> Result<()>;

    /// The project's lockfile
    fn lockfile_mut(&mut self) -> &mut Self::Lockfile;
}

/// Filesystem-backed project
pub struct FsProject {
    root: PathBuf,
    environment: String,
    manifest: Manifest,
    lockfile: Lockfile,
    resolver: Arc<dyn PackageResolver>,
}

impl std::fmt::Debug for FsProject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsProject")
            .field("root", &self.root)
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}

impl FsProject {
    /// Open the project described by `options`
    pub fn open(options: &ProjectOptions, resolver: Arc<dyn PackageResolver>) -> Result<Self> {
        options.validate()?;

        if !options.dir.join(MANIFEST_FILE_NAME).is_file() {
            return Err(ProjectError::NotFound {
                dir: options.dir.clone(),
            }
            .into());
        }

        let manifest = Manifest::load(&options.dir)?;
        let lockfile = Lockfile::load(&options.dir)?;
        debug!(
            "Opened project {} ({} packages, environment {})",
            options.dir.display(),
            manifest.packages().len(),
            options.environment
        );

        Ok(Self {
            root: options.dir.clone(),
            environment: options.environment.clone(),
            manifest,
            lockfile,
            resolver,
        })
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn lockfile(&self) -> &Lockfile {
        &self.lockfile
    }

    /// Work out which declared packages an update touches
    fn select_targets(&self, opts: &UpdateOpts) -> Result<Vec<PackageRef>> {
        if opts.packages.is_empty() {
            return Ok(self.manifest.packages());
        }

        let mut targets = Vec::with_capacity(opts.packages.len());
        for raw in &opts.packages {
            let requested = PackageRef::parse(raw);
            match self.manifest.find(&requested.name) {
                Some(declared) => targets.push(declared),
                None if opts.ignore_missing_packages => {
                    debug!("Skipping {raw}: not declared in {}", self.root.display());
                }
                None => return Err(ProjectError::not_declared(raw, &self.root).into()),
            }
        }
        Ok(targets)
    }
}

#[async_trait]
impl Project for FsProject {
    type Lockfile = Lockfile;

    fn root_dir(&self) -> &Path {
        &self.root
    }

    async fn update(&mut self, opts: &UpdateOpts) -> Result<()> {
        let targets = self.select_targets(opts)?;
        if targets.is_empty() {
            info!("Nothing to update in {}", self.root.display());
            return Ok(());
        }

        let mut lock_changed = false;
        for target in targets {
            let package = if target.is_legacy() {
                let pinned = self.manifest.pin_latest(&target.name);
                info!("Pinned legacy package {} to {pinned}", target.name);
                pinned
            } else {
                target
            };

            let key = package.lock_key();
            let current = self.lockfile.get(&key).cloned();
            match (self.resolver.resolve(&package).await?, current) {
                (Some(resolved), current) => {
                    let from = current.map(|c| c.version);
                    let to = resolved.version.clone();
                    if self.lockfile.upsert(&key, resolved) {
                        lock_changed = true;
                        match from {
                            Some(from) => info!("Updated {key}: {from} -> {to}"),
                            None => info!("Locked {key} at {to}"),
                        }
                    } else {
                        debug!("{key} is already up-to-date");
                    }
                }
                (None, Some(_)) => debug!("No newer version of {key} available"),
                (None, None) => {
                    return Err(ProjectError::UnresolvedPackage {
                        package: package.to_string(),
                        project: self.root.clone(),
                    }
                    .into());
                }
            }
        }

        // A full update also drops entries for packages no longer declared
        if opts.packages.is_empty() {
            let declared: Vec<String> = self
                .manifest
                .packages()
                .iter()
                .map(PackageRef::lock_key)
                .collect();
            for key in self.lockfile.retain_keys(&declared) {
                info!("Removed stale lock entry {key}");
                lock_changed = true;
            }
        }

        if self.manifest.is_dirty() {
            self.manifest.save()?;
        }
        if lock_changed {
            self.lockfile.save()?;
        }
        Ok(())
    }

    fn lockfile_mut(&mut self) -> &mut Lockfile {
        &mut self.lockfile
    }
}
