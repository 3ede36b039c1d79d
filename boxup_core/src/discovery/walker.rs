//! Directory walker for project discovery
//!
//! Streams project directories using walkdir. Entries are visited sorted by
//! file name so that discovery order is the same on every run.

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use super::{DEFAULT_EXCLUDE_PATTERNS, DirectoryFilter, DiscoveryError, Result};
use crate::manifest::MANIFEST_FILE_NAME;

/// Options for project discovery
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Directories to prune (glob patterns relative to the root)
    pub exclude_patterns: Vec<String>,
    /// Follow symbolic links
    pub follow_links: bool,
    /// Maximum depth below the root (None = unlimited)
    pub max_depth: Option<usize>,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            exclude_patterns: DEFAULT_EXCLUDE_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            follow_links: false,
            max_depth: None,
        }
    }
}

impl DiscoveryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exclude_patterns(mut self, patterns: Vec<String>) -> Self {
        self.exclude_patterns = patterns;
        self
    }

    pub fn with_follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }
}

/// Iterator over project directories below a root
pub struct ProjectDiscovery {
    walker: Box<dyn Iterator<Item = walkdir::Result<DirEntry>>>,
}

impl ProjectDiscovery {
    pub fn new(root: &Path, options: &DiscoveryOptions) -> Result<Self> {
        if !root.exists() {
            return Err(DiscoveryError::PathNotFound(root.to_path_buf()));
        }

        let filter = DirectoryFilter::new(&options.exclude_patterns)?;
        let filter_root = root.to_path_buf();

        let mut walker = WalkDir::new(root)
            .follow_links(options.follow_links)
            .sort_by_file_name();

        // A manifest sits one level below the deepest project directory
        if let Some(depth) = options.max_depth {
            walker = walker.max_depth(depth + 1);
        }

        let walker = walker.into_iter().filter_entry(move |entry| {
            !(entry.file_type().is_dir() && filter.is_excluded(&filter_root, entry.path()))
        });

        Ok(Self {
            walker: Box::new(walker),
        })
    }

    fn project_dir(entry: &DirEntry) -> Option<PathBuf> {
        if !entry.file_type().is_file() || entry.file_name() != MANIFEST_FILE_NAME {
            return None;
        }
        entry.path().parent().map(Path::to_path_buf)
    }
}

impl Iterator for ProjectDiscovery {
    type Item = PathBuf;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.walker.next()? {
                Ok(entry) => {
                    if let Some(dir) = Self::project_dir(&entry) {
                        return Some(dir);
                    }
                }
                Err(e) => {
                    // Unreadable subtrees are skipped, not fatal
                    log::warn!("Walk error: {e}");
                    continue;
                }
            }
        }
    }
}

/// Collect every project directory below `root` in discovery order
pub fn discover_projects(root: &Path, options: &DiscoveryOptions) -> Result<Vec<PathBuf>> {
    let projects: Vec<PathBuf> = ProjectDiscovery::new(root, options)?.collect();
    log::debug!(
        "Discovered {} project(s) under {}",
        projects.len(),
        root.display()
    );
    Ok(projects)
}
