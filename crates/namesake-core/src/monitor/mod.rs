/// Directory change monitor -- watches the scanned directory (non-recursively)
/// and forwards relevant changes to the UI thread.
///
/// Uses `notify`'s platform watcher. The watcher callback runs on notify's
/// own thread and does nothing but filter and enqueue; grouping is never
/// touched from there. Filtered out before enqueueing:
/// - transient files (`.tmp`, `.part`, `.crdownload`, `.swp`, `~$*`, `*~`),
/// - *modify* events on directories (their contents changed, not their name),
/// - access events,
/// - paths that are not direct children of the watched directory,
/// - names currently suppressed by the application (see
///   [`MonitorHandle::suppress`]).
///
/// # Usage
///
/// ```ignore
/// let handle = start_monitor(PathBuf::from("/home/me/Downloads"))?;
/// // drain handle.receiver every frame
/// handle.stop();
/// ```
pub mod debounce;

pub use debounce::Debouncer;

use crossbeam_channel::{bounded, Receiver, Sender};
use notify::event::{ModifyKind, RenameMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Capacity of the monitor channel. Events beyond this are dropped with a
/// debug log; the next full scan picks up whatever was missed.
pub const MONITOR_CHANNEL_CAPACITY: usize = 2_048;

/// Extensions of files that only exist while something else is writing.
const TRANSIENT_EXTENSIONS: &[&str] = &["tmp", "part", "crdownload", "swp"];

/// What happened to a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    Create,
    Modify,
    Delete,
    Rename,
}

/// Message sent from the watcher callback to the UI layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MonitorMessage {
    Changed {
        kind: ChangeKind,
        path: PathBuf,
        /// New path for renames that report both ends.
        dest: Option<PathBuf>,
    },
    /// The watcher reported an error; watching continues.
    Error(String),
}

impl MonitorMessage {
    /// Direct-child names affected by this message.
    pub fn child_names(&self, directory: &Path) -> Vec<String> {
        match self {
            Self::Changed { path, dest, .. } => std::iter::once(path)
                .chain(dest.iter())
                .filter_map(|p| child_name(directory, p))
                .collect(),
            Self::Error(_) => Vec::new(),
        }
    }
}

/// Names the watcher should drop, shared between the UI and the callback.
type Suppressed = Arc<Mutex<HashSet<String>>>;

/// Handle to a running directory monitor. Dropping it stops watching.
pub struct MonitorHandle {
    pub receiver: Receiver<MonitorMessage>,
    pub directory: PathBuf,
    suppressed: Suppressed,
    _watcher: RecommendedWatcher,
}

impl MonitorHandle {
    /// Stop watching. Pending messages stay readable until the handle is
    /// dropped.
    pub fn stop(self) {
        info!("Stopped watching {}", self.directory.display());
    }

    /// Ignore changes to `names` until [`MonitorHandle::clear_suppressed`].
    ///
    /// Used while the application itself is moving those entries.
    pub fn suppress<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suppressed
            .lock()
            .extend(names.into_iter().map(Into::into));
    }

    pub fn clear_suppressed(&self) {
        self.suppressed.lock().clear();
    }
}

/// Start watching `directory` for changes to its direct children.
pub fn start_monitor(directory: PathBuf) -> Result<MonitorHandle, notify::Error> {
    let (tx, rx) = bounded::<MonitorMessage>(MONITOR_CHANNEL_CAPACITY);
    let suppressed: Suppressed = Arc::new(Mutex::new(HashSet::new()));

    let callback_dir = directory.clone();
    let callback_suppressed = Arc::clone(&suppressed);
    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| {
            handle_event(res, &callback_dir, &callback_suppressed, &tx);
        },
        Config::default(),
    )?;
    watcher.watch(&directory, RecursiveMode::NonRecursive)?;
    info!("Watching {}", directory.display());

    Ok(MonitorHandle {
        receiver: rx,
        directory,
        suppressed,
        _watcher: watcher,
    })
}

// ─── Watcher callback ───────────────────────────────────────────────────────

fn handle_event(
    res: Result<Event, notify::Error>,
    directory: &Path,
    suppressed: &Mutex<HashSet<String>>,
    tx: &Sender<MonitorMessage>,
) {
    let message = match res {
        Ok(event) => {
            let suppressed = suppressed.lock();
            match translate(&event, directory, &suppressed) {
                Some(message) => message,
                None => return,
            }
        }
        Err(err) => {
            warn!("Monitor: watcher error: {err}");
            MonitorMessage::Error(err.to_string())
        }
    };
    if tx.try_send(message).is_err() {
        debug!("Monitor: channel full or closed, dropping event");
    }
}

/// Turn a raw notify event into a message, or `None` if it is filtered out.
pub fn translate(
    event: &Event,
    directory: &Path,
    suppressed: &HashSet<String>,
) -> Option<MonitorMessage> {
    let kind = match event.kind {
        EventKind::Access(_) => return None,
        EventKind::Create(_) => ChangeKind::Create,
        EventKind::Remove(_) => ChangeKind::Delete,
        EventKind::Modify(ModifyKind::Name(_)) => ChangeKind::Rename,
        EventKind::Modify(_) | EventKind::Any | EventKind::Other => ChangeKind::Modify,
    };

    let (path, dest) = match (event.kind, event.paths.as_slice()) {
        (EventKind::Modify(ModifyKind::Name(RenameMode::Both)), [from, to, ..]) => {
            (from.clone(), Some(to.clone()))
        }
        (_, [path, ..]) => (path.clone(), None),
        (_, []) => return None,
    };

    if kind == ChangeKind::Modify && path.is_dir() {
        return None;
    }

    let relevant = |p: &Path| {
        child_name(directory, p)
            .is_some_and(|name| !is_transient(&name) && !suppressed.contains(&name))
    };
    if !relevant(&path) && !dest.as_deref().is_some_and(relevant) {
        return None;
    }

    Some(MonitorMessage::Changed { kind, path, dest })
}

/// The name of `path` if it is a direct child of `directory`.
pub fn child_name(directory: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(directory).ok()?;
    let mut components = relative.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) => name.to_str().map(str::to_owned),
        _ => None,
    }
}

/// Whether `name` looks like a temporary file that will soon vanish.
pub fn is_transient(name: &str) -> bool {
    if name.starts_with("~$") || name.ends_with('~') {
        return true;
    }
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            TRANSIENT_EXTENSIONS
                .iter()
                .any(|t| ext.eq_ignore_ascii_case(t))
        })
}
