//! Manifest related error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors reading or writing a project manifest
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The manifest is not valid JSON or has the wrong shape
    #[error("Failed to parse manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The manifest could not be serialized back to disk
    #[error("Failed to serialize manifest {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
