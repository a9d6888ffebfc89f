/// Consolidation -- moves (or copies) the members of a group into one newly
/// created `<name>_merged` folder.
///
/// The transaction is not atomic. Fatal errors ([`ConsolidateError`]) are
/// raised before anything on disk is touched; once the target folder exists,
/// every per-item failure is recorded as an [`ItemError`] and the remaining
/// items are still processed. Items already relocated are never rolled back.
pub mod naming;
pub mod relocate;
pub mod worker;

pub use relocate::RelocateMode;

use crate::exclusion::ExclusionRegistry;
use crate::model::{Entry, Group};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default number of numbered retries when picking the target folder name.
pub const DEFAULT_MAX_NAME_ATTEMPTS: usize = 100;

/// Errors that abort a consolidation before the filesystem is modified.
#[derive(Debug, Error)]
pub enum ConsolidateError {
    #[error("at least two items are needed to consolidate, found {found}")]
    InsufficientMembers { found: usize },

    #[error("invalid target name {0:?}")]
    InvalidTargetName(String),

    #[error("no free folder name after {attempts} attempts starting from {base}")]
    NameSpaceExhausted { base: String, attempts: usize },

    #[error("failed to create {path}: {source}")]
    TargetCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A failure affecting a single item; collected, never fatal.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("{name} no longer exists")]
    ItemMissing { name: String },

    #[error("failed to relocate {name}: {source}")]
    RelocationFailed {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create shortcut {path}: {source}")]
    ShortcutCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What to consolidate and how. Built from the user's selection and consumed
/// by [`consolidate`].
#[derive(Clone, Debug)]
pub struct ConsolidationPlan {
    /// Canonical name the `_merged` folder is derived from.
    pub target_name: String,
    /// Items to relocate, in order.
    pub sources: Vec<Entry>,
    pub create_shortcut: bool,
    pub mode: RelocateMode,
}

impl ConsolidationPlan {
    pub fn new(target_name: impl Into<String>, sources: Vec<Entry>) -> Self {
        Self {
            target_name: target_name.into(),
            sources,
            create_shortcut: false,
            mode: RelocateMode::default(),
        }
    }

    /// Plan for `group` minus excluded members.
    ///
    /// `target_name` defaults to the seed's name.
    pub fn from_group(
        group: &Group,
        exclusions: &ExclusionRegistry,
        target_name: Option<&str>,
    ) -> Self {
        let name = target_name.unwrap_or(group.seed().name.as_str());
        Self::new(name, exclusions.filter(group.members()))
    }

    pub fn with_shortcut(mut self, create_shortcut: bool) -> Self {
        self.create_shortcut = create_shortcut;
        self
    }

    pub fn with_mode(mut self, mode: RelocateMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Tunables for [`consolidate`].
#[derive(Clone, Debug)]
pub struct ConsolidateOptions {
    pub max_name_attempts: usize,
    /// Where shortcuts are placed. `None` disables shortcut creation even when
    /// the plan asks for one.
    pub shortcut_dir: Option<PathBuf>,
}

impl Default for ConsolidateOptions {
    fn default() -> Self {
        Self {
            max_name_attempts: DEFAULT_MAX_NAME_ATTEMPTS,
            shortcut_dir: dirs::desktop_dir(),
        }
    }
}

/// Result of a consolidation that got as far as creating its target folder.
#[derive(Debug)]
pub struct ConsolidationOutcome {
    /// The created `_merged` folder.
    pub target: PathBuf,
    pub moved_count: usize,
    pub total_attempted: usize,
    pub errors: Vec<ItemError>,
    /// The shortcut path, when one was created.
    pub shortcut: Option<PathBuf>,
    pub mode: RelocateMode,
}

impl ConsolidationOutcome {
    /// `true` when every item was relocated and no error was recorded.
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty() && self.moved_count == self.total_attempted
    }

    pub fn failed_count(&self) -> usize {
        self.errors.len()
    }

    /// At most `limit` errors, for display.
    pub fn error_preview(&self, limit: usize) -> &[ItemError] {
        &self.errors[..self.errors.len().min(limit)]
    }

    /// One-line message describing the result.
    pub fn summary(&self) -> String {
        let verb = match self.mode {
            RelocateMode::Move => "Moved",
            RelocateMode::Copy => "Copied",
        };
        let folder = self
            .target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.target.display().to_string());

        if self.is_complete() {
            format!("{verb} {} items into {folder}", self.moved_count)
        } else {
            format!(
                "{verb} {} of {} items into {folder} ({} errors)",
                self.moved_count,
                self.total_attempted,
                self.failed_count()
            )
        }
    }
}

/// Run `plan` against `directory`.
pub fn consolidate(
    plan: &ConsolidationPlan,
    directory: &Path,
    options: &ConsolidateOptions,
) -> Result<ConsolidationOutcome, ConsolidateError> {
    if plan.sources.len() < Group::MIN_MEMBERS {
        return Err(ConsolidateError::InsufficientMembers {
            found: plan.sources.len(),
        });
    }

    let folder_name = naming::target_folder_name(
        &plan.target_name,
        &plan.sources,
        directory,
        options.max_name_attempts,
    )?;
    let target = directory.join(&folder_name);

    std::fs::create_dir(&target).map_err(|source| ConsolidateError::TargetCreationFailed {
        path: target.clone(),
        source,
    })?;
    info!(
        "Consolidating {} items into {} ({})",
        plan.sources.len(),
        target.display(),
        plan.mode.label()
    );

    let mut outcome = ConsolidationOutcome {
        target,
        moved_count: 0,
        total_attempted: plan.sources.len(),
        errors: Vec::new(),
        shortcut: None,
        mode: plan.mode,
    };

    for source in &plan.sources {
        let path = directory.join(source.name.as_str());
        if path.symlink_metadata().is_err() {
            outcome.errors.push(ItemError::ItemMissing {
                name: source.name.to_string(),
            });
            continue;
        }

        let dest_name = naming::unique_name_in(&outcome.target, source);
        let dest = outcome.target.join(&dest_name);
        match relocate::relocate(&path, &dest, plan.mode) {
            Ok(()) => {
                debug!("{} -> {}", path.display(), dest.display());
                outcome.moved_count += 1;
            }
            Err(source_err) => outcome.errors.push(ItemError::RelocationFailed {
                name: source.name.to_string(),
                source: source_err,
            }),
        }
    }

    if plan.create_shortcut {
        match &options.shortcut_dir {
            Some(dir) => match relocate::create_shortcut(&outcome.target, dir) {
                Ok(link) => outcome.shortcut = Some(link),
                Err(source) => outcome.errors.push(ItemError::ShortcutCreationFailed {
                    path: dir.clone(),
                    source,
                }),
            },
            None => warn!("No shortcut directory available, skipping shortcut"),
        }
    }

    if outcome.is_complete() {
        info!("{}", outcome.summary());
    } else {
        warn!("{}", outcome.summary());
        for err in &outcome.errors {
            warn!("  {err}");
        }
    }

    Ok(outcome)
}
