//! Update mode selection
//!
//! Turns the raw `update` flags into exactly one [`UpdateMode`]. The checks
//! run in a fixed order and the first match wins:
//!
//! 1. packages together with `--sync-lock` is a usage error
//! 2. `--all-projects`
//! 3. `--paths-in-lockfile` (packages are ignored)
//! 4. `--sync-lock`
//! 5. a targeted update of the single configured project

use crate::error::UpdateError;

/// Message for the one invalid flag combination
pub const PACKAGES_WITH_SYNC: &str = "cannot specify both a package and --sync-lock";

/// Raw flags and arguments of the `update` command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateFlags {
    pub packages: Vec<String>,
    pub sync: bool,
    pub all_projects: bool,
    pub paths_in_lockfile: bool,
}

/// The execution path of one `update` invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// Update the configured project
    Targeted,
    /// Reconcile lockfiles across every project under the working directory
    Sync,
    /// Update every project under the working directory, then sync
    AllProjects,
    /// Fill in missing store paths in every lockfile
    PathBackfill,
}

/// A validated `update` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    packages: Vec<String>,
    mode: UpdateMode,
}

impl UpdateRequest {
    /// Select the mode for `flags`
    pub fn from_flags(flags: UpdateFlags) -> Result<Self, UpdateError> {
        let UpdateFlags {
            packages,
            sync,
            all_projects,
            paths_in_lockfile,
        } = flags;

        let mode = if !packages.is_empty() && sync {
            return Err(UpdateError::usage(PACKAGES_WITH_SYNC));
        } else if all_projects {
            UpdateMode::AllProjects
        } else if paths_in_lockfile {
            UpdateMode::PathBackfill
        } else if sync {
            UpdateMode::Sync
        } else {
            UpdateMode::Targeted
        };

        Ok(Self { packages, mode })
    }

    pub fn mode(&self) -> UpdateMode {
        self.mode
    }

    /// Requested packages; empty means all of them
    pub fn packages(&self) -> &[String] {
        &self.packages
    }
}
