//! Command orchestrators
//!
//! Orchestrators coordinate between the CLI layer and the core library
//! collaborators.

pub mod mode;
pub mod update_orchestrator;

pub use mode::{UpdateFlags, UpdateMode, UpdateRequest};
pub use update_orchestrator::{RunContext, UpdateOrchestrator};
