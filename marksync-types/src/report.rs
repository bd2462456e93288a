//! Output contract of a reverse-sync pass.

use serde::{Deserialize, Serialize};

/// Accumulated outcome of one reverse-sync pass.
///
/// Counters only ever grow during a pass; per-item failures append to
/// `errors` without discarding the work already counted. `success` is false
/// only when the pass aborted before per-item processing (export fetch or
/// local traversal failed).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    pub success: bool,
    pub folders_created: usize,
    pub bookmarks_created: usize,
    pub bookmarks_updated: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

impl SyncReport {
    /// A report for a pass that is still in progress / completed normally.
    pub fn new() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    /// A report for a pass that aborted before per-item processing.
    pub fn aborted(error: impl Into<String>) -> Self {
        Self {
            success: false,
            errors: vec![error.into()],
            ..Self::default()
        }
    }

    pub fn record_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }
}
