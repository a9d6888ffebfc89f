/// Messages sent from the background workers to the UI thread.
use crate::model::Group;
use crate::rescan::RescanOutcome;
use std::sync::Arc;
use std::time::Duration;

/// Progress of a full scan.
#[derive(Debug)]
pub enum ScanProgress {
    /// Periodic update while entries are being grouped.
    Update {
        processed: usize,
        total: usize,
        current: String,
    },
    /// Grouping finished; `groups` replaces whatever the UI held before.
    Complete {
        groups: Vec<Arc<Group>>,
        entry_count: usize,
        duration: Duration,
    },
    /// The directory could not be listed. Prior groups stay valid.
    Failed { message: String },
    /// Scan was cancelled by the user.
    Cancelled,
}

/// Result of an incremental rescan worker.
#[derive(Debug)]
pub enum RescanMessage {
    Done {
        outcome: RescanOutcome,
        duration: Duration,
    },
    Failed { message: String },
}
