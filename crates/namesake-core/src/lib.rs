/// Namesake Core -- similarity grouping, consolidation, and data model.
///
/// This crate contains all business logic with zero UI dependencies.
/// It is designed to be reusable across different frontends (GUI, CLI, TUI).
///
/// # Modules
///
/// - [`model`]: Directory entries and similarity groups.
/// - [`similarity`]: The multi-heuristic name scorer.
/// - [`cluster`]: Greedy single-link grouping of a directory listing.
/// - [`exclusion`]: Entries opted out of the next consolidation.
/// - [`consolidate`]: Folding a group into one newly created folder.
/// - [`rescan`]: Incremental regrouping after change notifications.
/// - [`listing`]: Non-recursive directory listing primitive.
/// - [`scanner`]: Background full scans and incremental rescans.
/// - [`monitor`]: Filesystem watcher and change debouncer.
/// - [`config`]: User configuration loaded from TOML.
pub mod cluster;
pub mod config;
pub mod consolidate;
pub mod exclusion;
pub mod listing;
pub mod model;
pub mod monitor;
pub mod rescan;
pub mod scanner;
pub mod similarity;
