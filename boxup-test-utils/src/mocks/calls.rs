//! Shared record of collaborator calls made through the mocks

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// One collaborator call observed by a mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Open {
        dir: PathBuf,
        environment: String,
    },
    Discover {
        root: PathBuf,
    },
    Update {
        project: PathBuf,
        packages: Vec<String>,
        ignore_missing_packages: bool,
    },
    Backfill {
        project: PathBuf,
    },
    Save {
        project: PathBuf,
    },
    Sync {
        root: PathBuf,
        packages: Vec<String>,
    },
}

impl Call {
    /// Project root the call targeted, for per-project calls
    pub fn project(&self) -> Option<&Path> {
        match self {
            Call::Update { project, .. } | Call::Backfill { project } | Call::Save { project } => {
                Some(project)
            }
            _ => None,
        }
    }
}

/// Ordered, shareable call log
///
/// Clones share the same underlying log so a workspace and every project it
/// hands out record into one sequence.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    /// Snapshot of every call so far, in order
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.lock().unwrap().is_empty()
    }

    /// All update calls, in order
    pub fn updates(&self) -> Vec<Call> {
        self.filtered(|c| matches!(c, Call::Update { .. }))
    }

    /// All sync calls, in order
    pub fn syncs(&self) -> Vec<Call> {
        self.filtered(|c| matches!(c, Call::Sync { .. }))
    }

    /// Roots of projects that saw a backfill call
    pub fn backfilled(&self) -> Vec<PathBuf> {
        self.project_roots(|c| matches!(c, Call::Backfill { .. }))
    }

    /// Roots of projects that saw a save call
    pub fn saved(&self) -> Vec<PathBuf> {
        self.project_roots(|c| matches!(c, Call::Save { .. }))
    }

    /// Roots of projects that saw an update call
    pub fn updated(&self) -> Vec<PathBuf> {
        self.project_roots(|c| matches!(c, Call::Update { .. }))
    }

    fn filtered(&self, predicate: impl Fn(&Call) -> bool) -> Vec<Call> {
        self.calls().into_iter().filter(|c| predicate(c)).collect()
    }

    fn project_roots(&self, predicate: impl Fn(&Call) -> bool) -> Vec<PathBuf> {
        self.calls()
            .iter()
            .filter(|c| predicate(c))
            .filter_map(|c| c.project().map(Path::to_path_buf))
            .collect()
    }
}
