//! Mock workspace, project and lockfile
//!
//! Every mock records into a shared [`CallLog`] so tests can assert exactly
//! which collaborator operations ran and in what order. Failures are
//! configured per project through [`MockProjectSpec`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use boxup_test_utils::{MockProjectSpec, MockWorkspace};
//!
//! let workspace = MockWorkspace::new()
//!     .with_project(MockProjectSpec::new("/work/api"))
//!     .with_project(MockProjectSpec::new("/work/web").failing_update("resolver offline"));
//! let log = workspace.log();
//! assert!(log.is_empty());
//! ```

use super::calls::{Call, CallLog};
use async_trait::async_trait;
use boxup_core::error::{DiscoveryError, FileOp, FileRole, IoError, LockfileError, ProjectError};
use boxup_core::{
    LOCKFILE_NAME, LockfileHandle, PackageRef, Project, ProjectOptions, Result, UpdateOpts,
    Workspace,
};
use std::io;
use std::path::{Path, PathBuf};

/// Configured behavior of one mock project
#[derive(Debug, Clone)]
pub struct MockProjectSpec {
    root: PathBuf,
    declared: Option<Vec<String>>,
    update_failure: Option<String>,
    backfill_fails: bool,
    save_fails: bool,
}

impl MockProjectSpec {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            declared: None,
            update_failure: None,
            backfill_fails: false,
            save_fails: false,
        }
    }

    /// Declare packages; strict updates naming anything else fail
    pub fn declaring(mut self, packages: &[&str]) -> Self {
        self.declared = Some(packages.iter().map(|p| p.to_string()).collect());
        self
    }

    /// Make the update operation fail with an I/O error carrying `message`
    pub fn failing_update(mut self, message: &str) -> Self {
        self.update_failure = Some(message.to_string());
        self
    }

    pub fn failing_backfill(mut self) -> Self {
        self.backfill_fails = true;
        self
    }

    pub fn failing_save(mut self) -> Self {
        self.save_fails = true;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_declared(&self, package: &str) -> bool {
        match &self.declared {
            None => true,
            Some(declared) => {
                let wanted = PackageRef::parse(package).name;
                declared.iter().any(|d| PackageRef::parse(d).name == wanted)
            }
        }
    }
}

/// Mock lockfile handle
#[derive(Debug)]
pub struct MockLockfile {
    root: PathBuf,
    log: CallLog,
    backfill_fails: bool,
    save_fails: bool,
}

impl LockfileHandle for MockLockfile {
    fn backfill_store_paths(&mut self) -> Result<()> {
        self.log.record(Call::Backfill {
            project: self.root.clone(),
        });
        if self.backfill_fails {
            return Err(LockfileError::MissingOutputs {
                package: "mock@latest".to_string(),
                system: "x86_64-linux".to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn save(&self) -> Result<()> {
        self.log.record(Call::Save {
            project: self.root.clone(),
        });
        if self.save_fails {
            let source = io::Error::new(io::ErrorKind::PermissionDenied, "read-only filesystem");
            let path = self.root.join(LOCKFILE_NAME);
            return Err(IoError::new(FileOp::Replace, FileRole::Lockfile, &path, source).into());
        }
        Ok(())
    }
}

/// Mock project
#[derive(Debug)]
pub struct MockProject {
    spec: MockProjectSpec,
    log: CallLog,
    lockfile: MockLockfile,
}

impl MockProject {
    pub fn new(spec: MockProjectSpec, log: CallLog) -> Self {
        let lockfile = MockLockfile {
            root: spec.root.clone(),
            log: log.clone(),
            backfill_fails: spec.backfill_fails,
            save_fails: spec.save_fails,
        };
        Self {
            spec,
            log,
            lockfile,
        }
    }
}

#[async_trait]
impl Project for MockProject {
    type Lockfile = MockLockfile;

    fn root_dir(&self) -> &Path {
        &self.spec.root
    }

    async fn update(&mut self, opts: &UpdateOpts) -> Result<()> {
        self.log.record(Call::Update {
            project: self.spec.root.clone(),
            packages: opts.packages.clone(),
            ignore_missing_packages: opts.ignore_missing_packages,
        });

        if !opts.ignore_missing_packages
            && let Some(missing) = opts.packages.iter().find(|p| !self.spec.is_declared(p))
        {
            return Err(ProjectError::not_declared(missing, &self.spec.root).into());
        }

        if let Some(message) = &self.spec.update_failure {
            let path = self.spec.root.join(LOCKFILE_NAME);
            let source = io::Error::other(message.clone());
            return Err(IoError::new(FileOp::Replace, FileRole::Lockfile, &path, source).into());
        }
        Ok(())
    }

    fn lockfile_mut(&mut self) -> &mut MockLockfile {
        &mut self.lockfile
    }
}

/// Mock workspace handing out [`MockProject`]s
#[derive(Debug, Default)]
pub struct MockWorkspace {
    log: CallLog,
    projects: Vec<MockProjectSpec>,
    open_project: Option<MockProjectSpec>,
    open_fails: bool,
    discovery_fails: bool,
    sync_failure: Option<String>,
}

impl MockWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a project to the discovered set, in discovery order
    pub fn with_project(mut self, spec: MockProjectSpec) -> Self {
        self.projects.push(spec);
        self
    }

    /// Add `count` well-behaved projects named `<root>/project-<i>`
    pub fn with_projects(mut self, root: &Path, count: usize) -> Self {
        for i in 0..count {
            self.projects
                .push(MockProjectSpec::new(root.join(format!("project-{i}"))));
        }
        self
    }

    /// Behavior of the project returned by `open`; defaults to a well-behaved one
    pub fn with_open_project(mut self, spec: MockProjectSpec) -> Self {
        self.open_project = Some(spec);
        self
    }

    pub fn failing_open(mut self) -> Self {
        self.open_fails = true;
        self
    }

    pub fn failing_discovery(mut self) -> Self {
        self.discovery_fails = true;
        self
    }

    pub fn failing_sync(mut self, message: &str) -> Self {
        self.sync_failure = Some(message.to_string());
        self
    }

    /// Handle to the shared call log
    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    /// Roots of the configured discovered projects, in order
    pub fn project_roots(&self) -> Vec<PathBuf> {
        self.projects.iter().map(|p| p.root.clone()).collect()
    }
}

#[async_trait]
impl Workspace for MockWorkspace {
    type Project = MockProject;

    async fn open(&self, options: &ProjectOptions) -> Result<MockProject> {
        self.log.record(Call::Open {
            dir: options.dir.clone(),
            environment: options.environment.clone(),
        });
        if self.open_fails {
            return Err(ProjectError::NotFound {
                dir: options.dir.clone(),
            }
            .into());
        }

        let spec = self
            .open_project
            .clone()
            .unwrap_or_else(|| MockProjectSpec::new(&options.dir));
        Ok(MockProject::new(spec, self.log.clone()))
    }

    async fn discover(&self, root: &Path) -> Result<Vec<MockProject>> {
        self.log.record(Call::Discover {
            root: root.to_path_buf(),
        });
        if self.discovery_fails {
            return Err(DiscoveryError::PathNotFound(root.to_path_buf()).into());
        }

        Ok(self
            .projects
            .iter()
            .cloned()
            .map(|spec| MockProject::new(spec, self.log.clone()))
            .collect())
    }

    async fn sync_lockfiles(&self, root: &Path, packages: &[String]) -> Result<()> {
        self.log.record(Call::Sync {
            root: root.to_path_buf(),
            packages: packages.to_vec(),
        });
        if let Some(message) = &self.sync_failure {
            let path = root.join(LOCKFILE_NAME);
            let source = io::Error::other(message.clone());
            return Err(IoError::new(FileOp::Read, FileRole::Lockfile, &path, source).into());
        }
        Ok(())
    }
}
