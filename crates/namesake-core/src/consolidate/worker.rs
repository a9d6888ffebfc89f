/// Runs a consolidation on a background thread so large copies do not stall
/// the UI.
use super::{consolidate, ConsolidateError, ConsolidateOptions, ConsolidationOutcome, ConsolidationPlan};
use crossbeam_channel::Receiver;
use std::path::PathBuf;
use std::thread;

pub type ConsolidateResult = Result<ConsolidationOutcome, ConsolidateError>;

pub struct ConsolidateHandle {
    pub result_rx: Receiver<ConsolidateResult>,
    /// Number of items in the plan, for "Merging N items…" status text.
    pub item_count: usize,
    _thread: Option<thread::JoinHandle<()>>,
}

pub fn start_consolidation(
    plan: ConsolidationPlan,
    directory: PathBuf,
    options: ConsolidateOptions,
) -> ConsolidateHandle {
    let (tx, rx) = crossbeam_channel::bounded::<ConsolidateResult>(1);
    let item_count = plan.sources.len();

    let thread = thread::Builder::new()
        .name("namesake-merge".into())
        .spawn(move || {
            let _ = tx.send(consolidate(&plan, &directory, &options));
        })
        .expect("failed to spawn merge thread");

    ConsolidateHandle {
        result_rx: rx,
        item_count,
        _thread: Some(thread),
    }
}
