//! Project discovery
//!
//! Walks a directory tree and yields every directory holding a project
//! manifest, in a stable order. Excluded directories are pruned before
//! descending into them.

mod filter;
mod walker;

pub use filter::{DirectoryFilter, PatternMatcher};
pub use walker::{DiscoveryOptions, ProjectDiscovery, discover_projects};

use std::path::PathBuf;

/// Directories skipped unless the caller overrides the exclude list
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &["**/.git", "**/node_modules", "**/.boxup"];

/// Error type for discovery operations
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("Invalid glob pattern: {0}")]
    InvalidPattern(String),

    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),
}

/// Result type for discovery operations
pub type Result<T> = std::result::Result<T, DiscoveryError>;
