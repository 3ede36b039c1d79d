//! Directory filtering using glob patterns

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;

use super::{DiscoveryError, Result};

/// Pattern matcher using GlobSet for efficient matching
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    globset: GlobSet,
    patterns: Vec<String>,
}

impl PatternMatcher {
    /// Create a new pattern matcher from glob patterns
    pub fn new(patterns: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();

        for pattern in patterns {
            let glob = Glob::new(pattern)
                .map_err(|e| DiscoveryError::InvalidPattern(format!("{pattern}: {e}")))?;
            builder.add(glob);
        }

        let globset = builder
            .build()
            .map_err(|e| DiscoveryError::InvalidPattern(e.to_string()))?;

        Ok(Self {
            globset,
            patterns: patterns.to_vec(),
        })
    }

    /// Check if a path matches any of the patterns
    pub fn matches(&self, path: &Path) -> bool {
        self.globset.is_match(path)
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

/// Decides which directories discovery descends into
///
/// Paths are matched relative to the discovery root, so `**/.git` matches
/// both `.git` and `services/api/.git`.
#[derive(Debug, Clone)]
pub struct DirectoryFilter {
    exclude_matcher: Option<PatternMatcher>,
}

impl DirectoryFilter {
    pub fn new(exclude_patterns: &[String]) -> Result<Self> {
        let exclude_matcher = if exclude_patterns.is_empty() {
            None
        } else {
            Some(PatternMatcher::new(exclude_patterns)?)
        };

        Ok(Self { exclude_matcher })
    }

    /// Check whether a directory below `root` should be skipped
    pub fn is_excluded(&self, root: &Path, dir: &Path) -> bool {
        let Some(ref exclude) = self.exclude_matcher else {
            return false;
        };

        match dir.strip_prefix(root) {
            // The root itself is never excluded
            Ok(relative) if relative.as_os_str().is_empty() => false,
            Ok(relative) => exclude.matches(relative),
            Err(_) => exclude.matches(dir),
        }
    }
}
