//! Lockfile related error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, mutating or persisting a lockfile
#[derive(Error, Debug)]
pub enum LockfileError {
    #[error("Failed to parse lockfile {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize lockfile {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported lockfile version '{version}' in {path}")]
    UnsupportedVersion { path: PathBuf, version: String },

    /// A system entry has nothing a store path could be taken from
    #[error("No outputs recorded for {package} on {system}")]
    MissingOutputs { package: String, system: String },
}
