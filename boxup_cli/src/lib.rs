//! Boxup CLI library
//!
//! Exposes the update orchestrator, configuration and error handling used by
//! the `boxup` binary so they can be exercised from integration tests.

pub mod config;
pub mod error;
pub mod orchestrators;
pub mod terminal;
