//! Filesystem errors for the project files boxup reads and rewrites

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Which project file an access was for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    Manifest,
    Lockfile,
    Index,
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FileRole::Manifest => "manifest",
            FileRole::Lockfile => "lockfile",
            FileRole::Index => "package index",
        })
    }
}

/// Step of a file access that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOp {
    Read,
    /// Writing the `.tmp` sibling ahead of a replace
    WriteTemp,
    /// Renaming the `.tmp` sibling over the original
    Replace,
}

/// A failed read or rewrite of a manifest, lockfile or package index
#[derive(Error, Debug)]
#[error("{}", describe(self))]
pub struct IoError {
    pub op: FileOp,
    pub role: FileRole,
    /// File the step touched; the `.tmp` sibling for [`FileOp::WriteTemp`]
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl IoError {
    pub fn new(op: FileOp, role: FileRole, path: &Path, source: io::Error) -> Self {
        Self {
            op,
            role,
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.source.kind() == io::ErrorKind::NotFound
    }
}

fn describe(error: &IoError) -> String {
    let path = error.path.display();
    let role = error.role;
    let reason = error.source.kind();
    match error.op {
        FileOp::Read if error.is_not_found() => format!("Missing {role} {path}"),
        FileOp::Read => format!("Could not read {role} {path} ({reason})"),
        FileOp::WriteTemp => format!("Could not write temporary {role} {path} ({reason})"),
        FileOp::Replace => format!("Could not replace {role} {path} ({reason})"),
    }
}
