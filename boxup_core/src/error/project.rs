//! Project and resolution error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors opening a project or selecting its packages
#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("No boxup.json found in {dir}")]
    NotFound { dir: PathBuf },

    #[error("Invalid environment '{environment}': expected one of dev, prod")]
    InvalidEnvironment { environment: String },

    /// A requested package is not listed in the project manifest
    #[error("Package '{package}' is not declared in {project}")]
    PackageNotDeclared { package: String, project: PathBuf },

    /// Nothing is locked for the package and the resolver knows no version of it
    #[error("Could not resolve '{package}' for {project}")]
    UnresolvedPackage { package: String, project: PathBuf },
}

impl ProjectError {
    pub fn not_declared(package: &str, project: &std::path::Path) -> Self {
        Self::PackageNotDeclared {
            package: package.to_string(),
            project: project.to_path_buf(),
        }
    }
}

/// Errors raised by package resolvers
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Failed to parse package index {path}: {source}")]
    IndexParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid index entry '{key}': expected name@version")]
    InvalidIndexKey { key: String },
}
