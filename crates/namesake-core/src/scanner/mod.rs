/// Scanner module -- runs grouping off the UI thread.
///
/// A full scan lists the directory and clusters every entry, reporting
/// progress counters as it goes and handing the finished groups back in a
/// single `Complete` message. An incremental rescan regroups only what a batch
/// of change notifications touched.
///
/// Both run on named `std::thread`s and talk to the UI exclusively through
/// bounded `crossbeam-channel`s; the UI drains them once per frame.
pub mod progress;

use crate::cluster::ClusterEngine;
use crate::listing::list_directory;
use crate::model::Group;
use crate::rescan::rescan;
use progress::{RescanMessage, ScanProgress};

use crossbeam_channel::Receiver;
use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{info, warn};

/// Maximum number of progress messages that may queue up in the channel.
///
/// The UI drains the channel once per frame. If it falls behind, the scanner
/// blocks on `send` instead of growing the queue.
pub const PROGRESS_CHANNEL_CAPACITY: usize = 1_024;

/// Send an `Update` every this many entries (and for the last one).
const UPDATE_EVERY: usize = 16;

/// Handle to a running or completed full scan.
pub struct ScanHandle {
    pub progress_rx: Receiver<ScanProgress>,
    /// Directory being scanned.
    pub directory: PathBuf,
    cancel_flag: Arc<AtomicBool>,
    _thread: Option<thread::JoinHandle<()>>,
}

impl ScanHandle {
    /// Request the scan to stop as soon as possible.
    pub fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_flag.load(Ordering::Relaxed)
    }
}

/// Start a full scan of `directory` on a background thread.
pub fn start_scan(directory: PathBuf, engine: ClusterEngine) -> ScanHandle {
    let (progress_tx, progress_rx) =
        crossbeam_channel::bounded::<ScanProgress>(PROGRESS_CHANNEL_CAPACITY);
    let cancel_flag = Arc::new(AtomicBool::new(false));
    let cancel_clone = cancel_flag.clone();
    let dir = directory.clone();

    let thread = thread::Builder::new()
        .name("namesake-scanner".into())
        .spawn(move || {
            info!("Starting scan of {}", dir.display());
            let start = Instant::now();

            let entries = match list_directory(&dir) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!("Scan failed: {err}");
                    let _ = progress_tx.send(ScanProgress::Failed {
                        message: err.to_string(),
                    });
                    return;
                }
            };

            let total = entries.len();
            let mut groups: Vec<Arc<Group>> = Vec::new();
            let mut cancelled = false;
            let mut claimed = HashSet::new();

            // Seeded one entry at a time so cancellation and progress are
            // observed between seeds; same result as `ClusterEngine::cluster`.
            for (i, entry) in entries.iter().enumerate() {
                if cancel_clone.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
                if i % UPDATE_EVERY == 0 || i + 1 == total {
                    let _ = progress_tx.send(ScanProgress::Update {
                        processed: i + 1,
                        total,
                        current: entry.name.to_string(),
                    });
                }
                if let Some(group) = engine.seed_group(&entries, i, &mut claimed) {
                    groups.push(Arc::new(group));
                }
            }

            if cancelled {
                info!("Scan of {} cancelled", dir.display());
                let _ = progress_tx.send(ScanProgress::Cancelled);
                return;
            }

            let duration = start.elapsed();
            info!(
                "Scan complete: {} entries, {} groups in {:.2?}",
                total,
                groups.len(),
                duration
            );
            let _ = progress_tx.send(ScanProgress::Complete {
                groups,
                entry_count: total,
                duration,
            });
        })
        .expect("failed to spawn scanner thread");

    ScanHandle {
        progress_rx,
        directory,
        cancel_flag,
        _thread: Some(thread),
    }
}

/// Handle to a running incremental rescan. Rescans cannot be cancelled; the
/// caller keeps at most one in flight.
pub struct RescanHandle {
    pub result_rx: Receiver<RescanMessage>,
    _thread: Option<thread::JoinHandle<()>>,
}

/// Regroup the parts of `prior` affected by `changed` on a background thread.
pub fn start_rescan(
    prior: Vec<Arc<Group>>,
    changed: BTreeSet<String>,
    directory: PathBuf,
    engine: ClusterEngine,
) -> RescanHandle {
    let (tx, rx) = crossbeam_channel::bounded::<RescanMessage>(1);

    let thread = thread::Builder::new()
        .name("namesake-rescan".into())
        .spawn(move || {
            info!("Incremental rescan of {} changed names", changed.len());
            let start = Instant::now();
            let message = match rescan(&prior, &changed, &directory, &engine) {
                Ok(outcome) => RescanMessage::Done {
                    outcome,
                    duration: start.elapsed(),
                },
                Err(err) => {
                    warn!("Incremental rescan failed: {err}");
                    RescanMessage::Failed {
                        message: err.to_string(),
                    }
                }
            };
            let _ = tx.send(message);
        })
        .expect("failed to spawn rescan thread");

    RescanHandle {
        result_rx: rx,
        _thread: Some(thread),
    }
}
