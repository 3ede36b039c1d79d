//! Update command orchestrator
//!
//! Dispatches a validated [`UpdateRequest`] to exactly one of the four
//! runners. Every runner works through projects sequentially in discovery
//! order and stops at the first failure, returning it with the failing
//! project's root and position.

use super::mode::{UpdateFlags, UpdateMode, UpdateRequest};
use crate::error::UpdateError;
use boxup_core::{LockfileHandle, Project, ProjectOptions, UpdateOpts, Workspace};
use colored::*;
use log::debug;
use std::path::{Path, PathBuf};

/// Ambient inputs of one run, resolved once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    /// Root for discovery in the multi-project modes
    pub working_dir: PathBuf,
    /// Project opened by a targeted update
    pub project: ProjectOptions,
}

impl RunContext {
    pub fn new(working_dir: impl Into<PathBuf>, project: ProjectOptions) -> Self {
        Self {
            working_dir: working_dir.into(),
            project,
        }
    }
}

/// Orchestrator for the update command
pub struct UpdateOrchestrator<W: Workspace> {
    workspace: W,
    context: RunContext,
}

impl<W: Workspace> UpdateOrchestrator<W> {
    pub fn new(workspace: W, context: RunContext) -> Self {
        Self { workspace, context }
    }

    pub fn workspace(&self) -> &W {
        &self.workspace
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// Select a mode from raw flags and run it
    pub async fn run(&self, flags: UpdateFlags) -> Result<(), UpdateError> {
        let request = UpdateRequest::from_flags(flags)?;
        self.execute(&request).await
    }

    /// Run the mode of an already validated request
    pub async fn execute(&self, request: &UpdateRequest) -> Result<(), UpdateError> {
        debug!(
            "Running {:?} update for packages {:?}",
            request.mode(),
            request.packages()
        );

        match request.mode() {
            UpdateMode::AllProjects => self.update_all_projects(request.packages()).await,
            UpdateMode::PathBackfill => self.ensure_store_paths().await,
            UpdateMode::Sync => self.sync_lockfiles(request.packages()).await,
            UpdateMode::Targeted => self.update_single(request.packages()).await,
        }
    }

    /// Update the configured project, failing on undeclared packages
    ///
    /// The environment only names this project, so it is checked here rather
    /// than for every mode.
    pub async fn update_single(&self, packages: &[String]) -> Result<(), UpdateError> {
        let options = &self.context.project;
        options
            .validate()
            .map_err(|e| UpdateError::usage(&e.to_string()))?;
        let mut project =
            self.workspace
                .open(options)
                .await
                .map_err(|source| UpdateError::ProjectOpen {
                    dir: options.dir.clone(),
                    source,
                })?;

        let opts = UpdateOpts {
            packages: packages.to_vec(),
            ignore_missing_packages: false,
        };
        project
            .update(&opts)
            .await
            .map_err(|source| UpdateError::Update {
                project: project.root_dir().to_path_buf(),
                index: 0,
                source,
            })
    }

    /// Update every discovered project, then sync lockfiles once
    pub async fn update_all_projects(&self, packages: &[String]) -> Result<(), UpdateError> {
        let mut projects = self.discover().await?;

        let opts = UpdateOpts {
            packages: packages.to_vec(),
            ignore_missing_packages: true,
        };
        for (index, project) in projects.iter_mut().enumerate() {
            eprintln!(
                "Updating project at {}",
                project.root_dir().display().to_string().cyan()
            );
            project
                .update(&opts)
                .await
                .map_err(|source| UpdateError::Update {
                    project: project.root_dir().to_path_buf(),
                    index,
                    source,
                })?;
        }

        self.sync_lockfiles(packages).await
    }

    /// Reconcile lockfiles across every project under the working directory
    pub async fn sync_lockfiles(&self, packages: &[String]) -> Result<(), UpdateError> {
        self.workspace
            .sync_lockfiles(&self.context.working_dir, packages)
            .await
            .map_err(|source| UpdateError::Sync { source })
    }

    /// Backfill and save the lockfile of every discovered project
    pub async fn ensure_store_paths(&self) -> Result<(), UpdateError> {
        let mut projects = self.discover().await?;

        for (index, project) in projects.iter_mut().enumerate() {
            let root = project.root_dir().to_path_buf();
            eprintln!("Processing project at {}", root.display().to_string().cyan());

            let lockfile = project.lockfile_mut();
            lockfile
                .backfill_store_paths()
                .map_err(|source| UpdateError::Backfill {
                    project: root.clone(),
                    index,
                    source,
                })?;
            lockfile.save().map_err(|source| UpdateError::Save {
                project: root,
                index,
                source,
            })?;
        }
        Ok(())
    }

    async fn discover(&self) -> Result<Vec<W::Project>, UpdateError> {
        let root: &Path = &self.context.working_dir;
        eprintln!("Finding projects under {}", root.display());
        let projects = self
            .workspace
            .discover(root)
            .await
            .map_err(|source| UpdateError::Discovery {
                root: root.to_path_buf(),
                source,
            })?;
        eprintln!("{}", format!("Found {} projects", projects.len()).green());
        Ok(projects)
    }
}
