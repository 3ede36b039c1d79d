//! Mock implementations for testing

mod calls;
mod workspace;

pub use calls::{Call, CallLog};
pub use workspace::{MockLockfile, MockProject, MockProjectSpec, MockWorkspace};
