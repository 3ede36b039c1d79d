//! Test utilities for boxup
//!
//! This crate provides recording mocks of the workspace collaborators and
//! builders for on-disk project trees.

pub mod builders;
pub mod mocks;

// Re-export commonly used types
pub use builders::ProjectTreeBuilder;
pub use mocks::{Call, CallLog, MockLockfile, MockProject, MockProjectSpec, MockWorkspace};
