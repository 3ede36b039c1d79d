//! Failures of the update orchestrator
//!
//! Every variant except `Usage` wraps the collaborator error that caused it,
//! together with the project it was acting on where there is one.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpdateError {
    /// Invalid combination of flags and arguments, raised before any side effect
    #[error("{0}")]
    Usage(String),

    #[error("Failed to discover projects under {}", root.display())]
    Discovery {
        root: PathBuf,
        #[source]
        source: boxup_core::Error,
    },

    #[error("Failed to open project at {}", dir.display())]
    ProjectOpen {
        dir: PathBuf,
        #[source]
        source: boxup_core::Error,
    },

    #[error("Failed to update project {}", project.display())]
    Update {
        project: PathBuf,
        index: usize,
        #[source]
        source: boxup_core::Error,
    },

    #[error("Failed to backfill store paths for {}", project.display())]
    Backfill {
        project: PathBuf,
        index: usize,
        #[source]
        source: boxup_core::Error,
    },

    #[error("Failed to save lockfile for {}", project.display())]
    Save {
        project: PathBuf,
        index: usize,
        #[source]
        source: boxup_core::Error,
    },

    #[error("Failed to sync lockfiles")]
    Sync {
        #[source]
        source: boxup_core::Error,
    },
}

impl UpdateError {
    pub fn usage(message: &str) -> Self {
        Self::Usage(message.to_string())
    }

    /// Underlying collaborator error, if any
    pub fn cause(&self) -> Option<&boxup_core::Error> {
        match self {
            Self::Usage(_) => None,
            Self::Discovery { source, .. }
            | Self::ProjectOpen { source, .. }
            | Self::Update { source, .. }
            | Self::Backfill { source, .. }
            | Self::Save { source, .. }
            | Self::Sync { source } => Some(source),
        }
    }

    /// Project the failing operation targeted
    pub fn project(&self) -> Option<&Path> {
        match self {
            Self::Update { project, .. }
            | Self::Backfill { project, .. }
            | Self::Save { project, .. } => Some(project),
            Self::ProjectOpen { dir, .. } => Some(dir),
            _ => None,
        }
    }

    /// Position of the failing project in discovery order
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Update { index, .. } | Self::Backfill { index, .. } | Self::Save { index, .. } => {
                Some(*index)
            }
            _ => None,
        }
    }

    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }

    /// Whether the failure stems from the filesystem, discovery or a lockfile
    pub fn is_filesystem(&self) -> bool {
        match self {
            Self::Usage(_) => false,
            Self::Discovery { .. } | Self::Backfill { .. } | Self::Save { .. } => true,
            _ => self.cause().is_some_and(|cause| {
                cause.is_filesystem() || matches!(cause, boxup_core::Error::Lockfile(_))
            }),
        }
    }
}
