//! Builders for on-disk test fixtures

mod project_tree;

pub use project_tree::{ProjectTreeBuilder, locked_entry, read_lockfile, read_manifest_packages};
