//! Boxup Core Library
//!
//! Project manifests, lockfiles, package resolution, project discovery and
//! cross-project lockfile sync. The update orchestrator in `boxup_cli`
//! drives these through the [`Workspace`] and [`Project`] traits.

pub mod discovery;
pub mod error;
pub mod lockfile;
pub mod manifest;
mod persist;
pub mod project;
pub mod resolver;
pub mod sync;
pub mod workspace;

// Re-export main types
pub use discovery::{DiscoveryError, DiscoveryOptions, discover_projects};
pub use error::{Error, Result};
pub use lockfile::{LOCKFILE_NAME, LockedPackage, Lockfile, LockfileHandle, SystemInfo};
pub use manifest::{MANIFEST_FILE_NAME, Manifest, PackageRef};
pub use project::{FsProject, Project, ProjectOptions, UpdateOpts};
pub use resolver::{IndexResolver, OfflineResolver, PackageResolver};
pub use workspace::{FsWorkspace, Workspace};
