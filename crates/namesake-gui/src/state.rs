/// Application state management.
///
/// Centralises all mutable state that the UI reads and writes. Panels never
/// touch it directly: they return [`Command`]s which are applied through
/// [`AppState::apply`]. Background workers (scanner, rescanner, merge worker,
/// directory monitor) communicate via channels drained once per frame in
/// [`AppState::update`].
use chrono::{DateTime, Local};
use crossbeam_channel::TryRecvError;
use namesake_core::cluster::ClusterEngine;
use namesake_core::config::Config;
use namesake_core::consolidate::worker::{start_consolidation, ConsolidateHandle};
use namesake_core::consolidate::{ConsolidationOutcome, ConsolidationPlan, RelocateMode};
use namesake_core::exclusion::ExclusionRegistry;
use namesake_core::model::{Entry, Group};
use namesake_core::monitor::{start_monitor, Debouncer, MonitorHandle, MonitorMessage};
use namesake_core::rescan::RescanOutcome;
use namesake_core::scanner::progress::{RescanMessage, ScanProgress};
use namesake_core::scanner::{start_rescan, start_scan, RescanHandle, ScanHandle};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// The current phase of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppPhase {
    /// No directory scanned yet.
    Idle,
    /// A full scan is running.
    Scanning,
    /// Groups are available.
    Results,
    /// A consolidation is running in the background.
    Merging,
}

/// Everything the user can ask for. Produced by panels and widgets.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Switch to a new directory and scan it.
    SetDirectory(PathBuf),
    StartScan,
    CancelScan,
    Exclude(PathBuf),
    Include(PathBuf),
    SelectGroup(usize),
    /// Open the merge dialog for the group at this index.
    OpenMerge(usize),
    SetMergeName(String),
    SetMergeShortcut(bool),
    SetMergeMode(RelocateMode),
    ConfirmMerge,
    CancelMerge,
    ToggleWatch,
    ToggleTheme,
    DismissMergeErrors,
}

/// Severity of the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// The most recent status line.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
    pub at: DateTime<Local>,
}

/// Contents of the open merge dialog.
#[derive(Debug, Clone)]
pub struct MergeDialog {
    pub group: Arc<Group>,
    /// Canonical name the `_merged` folder is derived from. Either a member
    /// name picked from the list or free text.
    pub name: String,
    pub create_shortcut: bool,
    pub mode: RelocateMode,
}

/// Maximum number of scan-progress messages drained from the channel per frame.
const MAX_MESSAGES_PER_FRAME: usize = 300;

/// Maximum monitor messages drained per frame.
const MAX_MONITOR_MESSAGES_PER_FRAME: usize = 200;

/// All application state.
pub struct AppState {
    pub config: Config,
    engine: ClusterEngine,

    // ── Directory ──────────────────────────────────────
    pub directory: Option<PathBuf>,
    /// Text in the toolbar's directory field.
    pub directory_input: String,

    // ── Scan ───────────────────────────────────────────
    pub phase: AppPhase,
    pub scan_handle: Option<ScanHandle>,
    pub scan_processed: usize,
    pub scan_total: usize,
    pub scan_current: String,
    pub scan_duration: Option<Duration>,
    pub entry_count: usize,
    pub last_scan: Option<DateTime<Local>>,
    /// Whether the running scan replaces the status line when it completes.
    announce_scan: bool,

    // ── Results ────────────────────────────────────────
    pub groups: Vec<Arc<Group>>,
    pub selected_group: Option<usize>,
    pub exclusions: ExclusionRegistry,

    // ── Merge ──────────────────────────────────────────
    pub merge_dialog: Option<MergeDialog>,
    merge_handle: Option<ConsolidateHandle>,
    /// Bounded preview of the last merge's item errors.
    pub merge_errors: Vec<String>,
    /// How many errors the preview leaves out.
    pub merge_errors_hidden: usize,

    // ── Directory monitor ──────────────────────────────
    pub monitor_active: bool,
    monitor_handle: Option<MonitorHandle>,
    debouncer: Debouncer,
    rescan_handle: Option<RescanHandle>,
    /// Changes that fired while a rescan was running.
    pending_changes: BTreeSet<String>,
    pub last_rescan: Option<DateTime<Local>>,

    // ── UI state ───────────────────────────────────────
    pub status: Option<StatusMessage>,
    pub dark_mode: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl AppState {
    /// Create initial application state.
    pub fn new(config: Config) -> Self {
        Self {
            engine: config.engine(),
            debouncer: Debouncer::new(config.debounce_window()),
            config,
            directory: None,
            directory_input: String::new(),
            phase: AppPhase::Idle,
            scan_handle: None,
            scan_processed: 0,
            scan_total: 0,
            scan_current: String::new(),
            scan_duration: None,
            entry_count: 0,
            last_scan: None,
            announce_scan: true,
            groups: Vec::new(),
            selected_group: None,
            exclusions: ExclusionRegistry::new(),
            merge_dialog: None,
            merge_handle: None,
            merge_errors: Vec::new(),
            merge_errors_hidden: 0,
            monitor_active: false,
            monitor_handle: None,
            rescan_handle: None,
            pending_changes: BTreeSet::new(),
            last_rescan: None,
            status: None,
            dark_mode: true,
        }
    }

    /// Apply one user command.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::SetDirectory(dir) => {
                self.stop_monitor();
                self.groups.clear();
                self.selected_group = None;
                self.merge_dialog = None;
                self.exclusions.clear();
                self.directory_input = dir.display().to_string();
                self.directory = Some(dir);
                self.start_scan();
            }
            Command::StartScan => self.start_scan(),
            Command::CancelScan => {
                if let Some(handle) = &self.scan_handle {
                    handle.cancel();
                }
            }
            Command::Exclude(path) => {
                self.exclusions.exclude(path);
            }
            Command::Include(path) => {
                self.exclusions.include(&path);
            }
            Command::SelectGroup(index) => {
                if index < self.groups.len() {
                    self.selected_group = Some(index);
                }
            }
            Command::OpenMerge(index) => self.open_merge(index),
            Command::SetMergeName(name) => {
                if let Some(dialog) = &mut self.merge_dialog {
                    dialog.name = name;
                }
            }
            Command::SetMergeShortcut(on) => {
                if let Some(dialog) = &mut self.merge_dialog {
                    dialog.create_shortcut = on;
                }
            }
            Command::SetMergeMode(mode) => {
                if let Some(dialog) = &mut self.merge_dialog {
                    dialog.mode = mode;
                }
            }
            Command::ConfirmMerge => self.confirm_merge(),
            Command::CancelMerge => self.merge_dialog = None,
            Command::ToggleWatch => {
                if self.monitor_active {
                    self.stop_monitor();
                    self.set_status(StatusLevel::Info, "Stopped watching for changes");
                } else {
                    self.start_monitor();
                }
            }
            Command::ToggleTheme => self.dark_mode = !self.dark_mode,
            Command::DismissMergeErrors => {
                self.merge_errors.clear();
                self.merge_errors_hidden = 0;
            }
        }
    }

    /// Drain every background channel and fire the debouncer. Called once per
    /// frame; returns `true` if the UI should repaint.
    pub fn update(&mut self, now: Instant) -> bool {
        let mut repaint = self.process_scan_messages();
        repaint |= self.process_monitor_messages(now);
        repaint |= self.tick(now);
        repaint |= self.process_rescan_messages();
        repaint |= self.process_merge_messages();
        repaint
    }

    /// Whether any background work is in flight.
    pub fn is_busy(&self) -> bool {
        self.scan_handle.is_some()
            || self.rescan_handle.is_some()
            || self.merge_handle.is_some()
            || self.debouncer.is_armed()
    }

    /// Items that would actually be merged for `group`.
    pub fn eligible_members(&self, group: &Group) -> Vec<Entry> {
        self.exclusions.filter(group.members())
    }

    pub fn rescan_in_flight(&self) -> bool {
        self.rescan_handle.is_some()
    }

    // ── Scan ───────────────────────────────────────────

    /// Start a full scan of the current directory.
    ///
    /// Supersedes any pending incremental work.
    pub fn start_scan(&mut self) {
        self.begin_scan(true);
    }

    fn begin_scan(&mut self, announce: bool) {
        let Some(dir) = self.directory.clone() else {
            self.set_status(StatusLevel::Warning, "Choose a directory first");
            return;
        };
        if let Some(handle) = self.scan_handle.take() {
            handle.cancel();
        }
        if self.config.clear_exclusions_on_rescan {
            self.exclusions.clear();
        }
        self.debouncer.reset();
        self.pending_changes.clear();
        self.rescan_handle = None;

        self.phase = AppPhase::Scanning;
        self.scan_processed = 0;
        self.scan_total = 0;
        self.scan_current = String::new();
        self.scan_duration = None;
        self.announce_scan = announce;
        self.scan_handle = Some(start_scan(dir, self.engine));
    }

    /// Process pending scan progress messages.
    ///
    /// Returns `true` if the UI should repaint.
    pub fn process_scan_messages(&mut self) -> bool {
        let Some(handle) = &self.scan_handle else {
            return false;
        };

        let mut repaint = false;
        let mut messages_this_frame = 0usize;
        while messages_this_frame < MAX_MESSAGES_PER_FRAME {
            let msg = match handle.progress_rx.try_recv() {
                Ok(m) => m,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.scan_handle = None;
                    self.phase = self.settled_phase();
                    self.set_status(StatusLevel::Error, "Scan stopped unexpectedly");
                    self.flush_pending_changes();
                    return true;
                }
            };
            messages_this_frame += 1;
            repaint = true;
            match msg {
                ScanProgress::Update {
                    processed,
                    total,
                    current,
                } => {
                    self.scan_processed = processed;
                    self.scan_total = total;
                    self.scan_current = current;
                }
                ScanProgress::Complete {
                    groups,
                    entry_count,
                    duration,
                } => {
                    self.scan_handle = None;
                    self.scan_duration = Some(duration);
                    self.entry_count = entry_count;
                    self.last_scan = Some(Local::now());
                    self.groups = groups;
                    self.selected_group = (!self.groups.is_empty()).then_some(0);
                    self.phase = AppPhase::Results;
                    if self.announce_scan {
                        let summary = self.groups_summary();
                        self.set_status(StatusLevel::Info, summary);
                    }
                    if self.config.watch && !self.monitor_active {
                        self.start_monitor();
                    }
                    self.flush_pending_changes();
                    return true;
                }
                ScanProgress::Failed { message } => {
                    self.scan_handle = None;
                    self.phase = self.settled_phase();
                    self.set_status(StatusLevel::Error, format!("Scan failed: {message}"));
                    self.flush_pending_changes();
                    return true;
                }
                ScanProgress::Cancelled => {
                    self.scan_handle = None;
                    self.phase = self.settled_phase();
                    self.set_status(StatusLevel::Warning, "Scan cancelled");
                    self.flush_pending_changes();
                    return true;
                }
            }
        }
        repaint
    }

    /// "Found N groups with M similar items" or "No similar items found".
    pub fn groups_summary(&self) -> String {
        if self.groups.is_empty() {
            return "No similar items found".to_owned();
        }
        let items: usize = self.groups.iter().map(|g| g.len()).sum();
        format!(
            "Found {} groups with {} similar items",
            self.groups.len(),
            items
        )
    }

    /// Phase to fall back to when background work ends without new groups.
    fn settled_phase(&self) -> AppPhase {
        if self.last_scan.is_some() {
            AppPhase::Results
        } else {
            AppPhase::Idle
        }
    }

    // ── Directory monitor ──────────────────────────────

    pub fn start_monitor(&mut self) {
        let Some(dir) = self.directory.clone() else {
            return;
        };
        self.stop_monitor();
        match start_monitor(dir) {
            Ok(handle) => {
                self.monitor_handle = Some(handle);
                self.monitor_active = true;
            }
            Err(err) => {
                warn!("Could not watch directory: {err}");
                self.set_status(StatusLevel::Warning, format!("Could not watch directory: {err}"));
            }
        }
    }

    pub fn stop_monitor(&mut self) {
        if let Some(handle) = self.monitor_handle.take() {
            handle.stop();
        }
        self.monitor_active = false;
        self.debouncer.reset();
    }

    /// Drain monitor messages into the debouncer.
    pub fn process_monitor_messages(&mut self, now: Instant) -> bool {
        let Some(handle) = &self.monitor_handle else {
            return false;
        };

        let mut names = Vec::new();
        let mut errors = Vec::new();
        let mut messages_this_frame = 0usize;
        while messages_this_frame < MAX_MONITOR_MESSAGES_PER_FRAME {
            let Ok(msg) = handle.receiver.try_recv() else {
                break;
            };
            messages_this_frame += 1;
            match &msg {
                MonitorMessage::Changed { .. } => names.extend(msg.child_names(&handle.directory)),
                MonitorMessage::Error(message) => errors.push(message.clone()),
            }
        }

        for name in names {
            self.record_change(name, now);
        }
        if let Some(message) = errors.pop() {
            self.set_status(StatusLevel::Warning, format!("Watcher error: {message}"));
        }
        messages_this_frame > 0
    }

    /// Note that `name` changed at `now`.
    pub fn record_change(&mut self, name: impl Into<String>, now: Instant) {
        self.debouncer.push(name, now);
    }

    /// Release debounced changes whose quiet period has ended.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.debouncer.poll(now) {
            Some(changed) if !changed.is_empty() => {
                self.request_rescan(changed);
                true
            }
            _ => false,
        }
    }

    /// Start an incremental rescan, or queue the names until it can run.
    ///
    /// Names arriving during a full scan, a merge or another rescan wait in
    /// `pending_changes` and are replayed when that work finishes. Ignored
    /// while idle since there are no groups to update.
    pub fn request_rescan(&mut self, changed: BTreeSet<String>) {
        if self.phase == AppPhase::Idle {
            return;
        }
        let Some(dir) = self.directory.clone() else {
            return;
        };
        if self.rescan_handle.is_some()
            || matches!(self.phase, AppPhase::Scanning | AppPhase::Merging)
        {
            self.pending_changes.extend(changed);
            return;
        }
        self.rescan_handle = Some(start_rescan(self.groups.clone(), changed, dir, self.engine));
    }

    /// Names queued behind a scan, merge or rescan.
    pub fn pending_change_count(&self) -> usize {
        self.pending_changes.len()
    }

    fn flush_pending_changes(&mut self) {
        if !self.pending_changes.is_empty() {
            let pending = std::mem::take(&mut self.pending_changes);
            self.request_rescan(pending);
        }
    }

    pub fn process_rescan_messages(&mut self) -> bool {
        let Some(handle) = &self.rescan_handle else {
            return false;
        };
        let msg = match handle.result_rx.try_recv() {
            Ok(msg) => msg,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => {
                self.rescan_handle = None;
                self.set_status(StatusLevel::Error, "Rescan stopped unexpectedly");
                return true;
            }
        };
        self.rescan_handle = None;

        match msg {
            RescanMessage::Done { outcome, duration } => {
                self.last_rescan = Some(Local::now());
                match outcome {
                    RescanOutcome::Unchanged => {
                        info!("Incremental rescan: no change ({duration:.2?})");
                    }
                    RescanOutcome::Updated(groups) => {
                        info!("Incremental rescan: {} groups ({duration:.2?})", groups.len());
                        self.replace_groups(groups);
                        let summary = self.groups_summary();
                        self.set_status(StatusLevel::Info, summary);
                    }
                }
            }
            RescanMessage::Failed { message } => {
                self.set_status(StatusLevel::Error, format!("Rescan failed: {message}"));
            }
        }

        self.flush_pending_changes();
        true
    }

    /// Swap in new groups, keeping the selection on the same seed if it
    /// survived.
    fn replace_groups(&mut self, groups: Vec<Arc<Group>>) {
        let selected_seed = self
            .selected_group
            .and_then(|i| self.groups.get(i))
            .map(|g| g.seed().name.clone());
        self.groups = groups;
        self.selected_group = selected_seed
            .and_then(|seed| self.groups.iter().position(|g| g.seed().name == seed))
            .or((!self.groups.is_empty()).then_some(0));

        if let Some(dialog) = &self.merge_dialog {
            if !self.groups.iter().any(|g| Arc::ptr_eq(g, &dialog.group)) {
                // The group under the dialog changed; make the user look again.
                self.merge_dialog = None;
            }
        }
    }

    // ── Merge ──────────────────────────────────────────

    fn open_merge(&mut self, index: usize) {
        let Some(group) = self.groups.get(index).cloned() else {
            return;
        };
        self.selected_group = Some(index);
        self.merge_dialog = Some(MergeDialog {
            name: group.seed().name.to_string(),
            group,
            create_shortcut: false,
            mode: self.config.mode,
        });
    }

    fn confirm_merge(&mut self) {
        let Some(dialog) = self.merge_dialog.take() else {
            return;
        };
        let Some(dir) = self.directory.clone() else {
            return;
        };
        if self.merge_handle.is_some() {
            self.set_status(StatusLevel::Warning, "A merge is already running");
            return;
        }

        let plan = ConsolidationPlan::from_group(
            &dialog.group,
            &self.exclusions,
            Some(dialog.name.as_str()),
        )
        .with_shortcut(dialog.create_shortcut)
        .with_mode(dialog.mode);
        if plan.sources.len() < Group::MIN_MEMBERS {
            self.set_status(
                StatusLevel::Warning,
                "Select at least two items to merge (too many are excluded)",
            );
            return;
        }

        if let Some(monitor) = &self.monitor_handle {
            monitor.suppress(plan.sources.iter().map(|e| e.name.to_string()));
        }
        self.debouncer.reset();
        self.pending_changes.clear();
        self.merge_errors.clear();
        self.merge_errors_hidden = 0;

        let handle = start_consolidation(plan, dir, self.config.consolidate_options());
        self.set_status(
            StatusLevel::Info,
            format!("Merging {} items…", handle.item_count),
        );
        self.merge_handle = Some(handle);
        self.phase = AppPhase::Merging;
    }

    pub fn process_merge_messages(&mut self) -> bool {
        let Some(handle) = &self.merge_handle else {
            return false;
        };
        let result = match handle.result_rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => {
                self.merge_handle = None;
                self.phase = self.settled_phase();
                self.set_status(StatusLevel::Error, "Merge stopped unexpectedly");
                return true;
            }
        };
        self.merge_handle = None;
        if let Some(monitor) = &self.monitor_handle {
            monitor.clear_suppressed();
        }

        match result {
            Ok(outcome) => self.report_outcome(&outcome),
            Err(err) => {
                warn!("Merge failed: {err}");
                self.set_status(StatusLevel::Error, format!("Merge failed: {err}"));
            }
        }

        // The directory changed under us; regroup from scratch, keeping the
        // merge summary on screen.
        self.phase = self.settled_phase();
        self.begin_scan(false);
        true
    }

    fn report_outcome(&mut self, outcome: &ConsolidationOutcome) {
        let level = if outcome.is_complete() {
            StatusLevel::Success
        } else {
            StatusLevel::Warning
        };
        let limit = self.config.error_preview;
        self.merge_errors = outcome
            .error_preview(limit)
            .iter()
            .map(ToString::to_string)
            .collect();
        self.merge_errors_hidden = outcome.failed_count().saturating_sub(limit);
        self.set_status(level, outcome.summary());
    }

    // ── Status ─────────────────────────────────────────

    pub fn set_status(&mut self, level: StatusLevel, text: impl Into<String>) {
        let text = text.into();
        match level {
            StatusLevel::Error | StatusLevel::Warning => warn!("{text}"),
            StatusLevel::Info | StatusLevel::Success => info!("{text}"),
        }
        self.status = Some(StatusMessage {
            text,
            level,
            at: Local::now(),
        });
    }

    /// The directory name for window titles and the toolbar.
    pub fn directory_label(&self) -> String {
        self.directory
            .as_deref()
            .map(Path::display)
            .map(|d| d.to_string())
            .unwrap_or_else(|| "No directory selected".to_owned())
    }
}
