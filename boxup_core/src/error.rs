//! Error types for the boxup core library
//!
//! Errors are grouped by the collaborator that raises them so callers can
//! match on the category without string inspection.

use thiserror::Error;

pub mod io;
pub mod lockfile;
pub mod manifest;
pub mod project;

pub use self::io::{FileOp, FileRole, IoError};
pub use self::lockfile::LockfileError;
pub use self::manifest::ManifestError;
pub use self::project::{ProjectError, ResolveError};
pub use crate::discovery::DiscoveryError;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the boxup core library
///
/// - I/O errors: reading and writing manifests, lockfiles and indexes
/// - Manifest errors: malformed `boxup.json`
/// - Lockfile errors: malformed `boxup.lock` and backfill failures
/// - Project errors: opening projects and package selection
/// - Resolve errors: package resolution
/// - Discovery errors: walking a tree for projects
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] IoError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Lockfile(#[from] LockfileError),

    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
}

impl Error {
    /// Whether the error originates from the filesystem rather than project content
    pub fn is_filesystem(&self) -> bool {
        matches!(
            self,
            Error::Io(_) | Error::Discovery(_) | Error::Project(ProjectError::NotFound { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;
    use std::io as std_io;
    use std::path::{Path, PathBuf};

    #[test]
    fn test_io_error_is_transparent_and_keeps_source() {
        let io_err = IoError::new(
            FileOp::Read,
            FileRole::Lockfile,
            Path::new("/work/api/boxup.lock"),
            std_io::Error::new(std_io::ErrorKind::PermissionDenied, "denied"),
        );
        let error: Error = io_err.into();

        assert!(matches!(&error, Error::Io(e) if e.role == FileRole::Lockfile));
        assert!(error.to_string().starts_with("Could not read lockfile"));
        assert!(error.source().is_some());
        assert!(error.is_filesystem());
    }

    #[test]
    fn test_package_not_declared_display() {
        let error = Error::Project(ProjectError::PackageNotDeclared {
            package: "python".to_string(),
            project: PathBuf::from("/work/api"),
        });

        let message = error.to_string();
        assert!(message.contains("python"));
        assert!(message.contains("/work/api"));
        assert!(!error.is_filesystem());
    }

    #[test]
    fn test_discovery_error_is_filesystem() {
        let error = Error::Discovery(DiscoveryError::PathNotFound(
            Path::new("/missing").to_path_buf(),
        ));
        assert!(error.is_filesystem());
        assert!(error.to_string().contains("/missing"));
    }

    #[test]
    fn test_missing_outputs_display() {
        let error = Error::Lockfile(LockfileError::MissingOutputs {
            package: "go@latest".to_string(),
            system: "x86_64-linux".to_string(),
        });
        assert_eq!(
            error.to_string(),
            "No outputs recorded for go@latest on x86_64-linux"
        );
    }
}
